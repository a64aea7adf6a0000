use std::sync::Arc;

use crate::{
    config::ModerationConfig,
    domain::{Capability, UserId},
    error::{AppError, Result},
    repository::UserDirectory,
    service::log_storage_error,
};

/// Every mutation that has to pass the gate before touching storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    MarkFaq,
    UpdateFaq,
    RemoveFaq,
    CreateAnnouncement,
    UpdateAnnouncement,
    DeleteAnnouncement,
}

impl ModerationAction {
    pub fn required_capability(&self) -> Capability {
        match self {
            ModerationAction::MarkFaq
            | ModerationAction::UpdateFaq
            | ModerationAction::RemoveFaq
            | ModerationAction::CreateAnnouncement
            | ModerationAction::UpdateAnnouncement
            | ModerationAction::DeleteAnnouncement => Capability::Moderate,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationAction::MarkFaq => "mark_faq",
            ModerationAction::UpdateFaq => "update_faq",
            ModerationAction::RemoveFaq => "remove_faq",
            ModerationAction::CreateAnnouncement => "create_announcement",
            ModerationAction::UpdateAnnouncement => "update_announcement",
            ModerationAction::DeleteAnnouncement => "delete_announcement",
        }
    }
}

/// Proof that the deployment allows actor-less maintenance removals.
/// Only `AuthorizationGate::grant_maintenance` can construct one.
#[derive(Debug)]
pub struct MaintenanceGrant {
    reason: String,
}

impl MaintenanceGrant {
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

pub struct AuthorizationGate {
    users: Arc<dyn UserDirectory>,
    allow_maintenance: bool,
}

impl AuthorizationGate {
    pub fn new(users: Arc<dyn UserDirectory>, config: &ModerationConfig) -> Self {
        Self {
            users,
            allow_maintenance: config.allow_maintenance_removal,
        }
    }

    /// Whether `acting_user` may perform `action`. Absent actors and users
    /// without a recognised role are refused.
    pub async fn authorize(&self, acting_user: Option<UserId>, action: ModerationAction) -> Result<bool> {
        let user_id = match acting_user {
            Some(id) => id,
            None => return Ok(false),
        };

        let allowed = self
            .users
            .role_of(user_id)
            .await
            .map_err(log_storage_error)?
            .map(|role| role.has_capability(action.required_capability()))
            .unwrap_or(false);

        Ok(allowed)
    }

    /// Like `authorize`, but turns a refusal into `AuthorizationDenied` and
    /// hands back the acting user's id.
    pub async fn require(&self, acting_user: Option<UserId>, action: ModerationAction) -> Result<UserId> {
        let allowed = self.authorize(acting_user, action).await?;

        match acting_user {
            Some(user_id) if allowed => Ok(user_id),
            _ => {
                tracing::warn!(
                    acting_user = ?acting_user,
                    action = action.as_str(),
                    "Moderation action denied"
                );
                Err(AppError::AuthorizationDenied(format!(
                    "{} requires a staff or admin account",
                    action.as_str()
                )))
            }
        }
    }

    pub fn grant_maintenance(&self, reason: &str) -> Result<MaintenanceGrant> {
        if !self.allow_maintenance {
            tracing::warn!(reason, "Maintenance grant refused: disabled by configuration");
            return Err(AppError::AuthorizationDenied(
                "Maintenance operations are disabled".to_string(),
            ));
        }

        tracing::info!(reason, "Maintenance grant issued");
        Ok(MaintenanceGrant {
            reason: reason.to_string(),
        })
    }
}

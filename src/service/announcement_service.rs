use std::collections::HashMap;
use std::sync::Arc;
use chrono::{DateTime, Utc};

use crate::{
    domain::{
        Announcement, AnnouncementDraft, AnnouncementForm, AnnouncementId,
        AnnouncementWithCreator, UserId, VisibilityState,
    },
    error::{AppError, Result},
    repository::{AnnouncementRepository, UserDirectory},
    service::{
        authorization::{AuthorizationGate, ModerationAction},
        log_storage_error,
        read_tracker::ReadTracker,
    },
};

pub struct AnnouncementService {
    repo: Arc<dyn AnnouncementRepository>,
    reads: Arc<ReadTracker>,
    users: Arc<dyn UserDirectory>,
    gate: Arc<AuthorizationGate>,
}

impl AnnouncementService {
    pub fn new(
        repo: Arc<dyn AnnouncementRepository>,
        reads: Arc<ReadTracker>,
        users: Arc<dyn UserDirectory>,
        gate: Arc<AuthorizationGate>,
    ) -> Self {
        Self { repo, reads, users, gate }
    }

    pub async fn create(&self, draft: AnnouncementDraft, acting_user: Option<UserId>) -> Result<Announcement> {
        let staff_id = self.gate.require(acting_user, ModerationAction::CreateAnnouncement).await?;

        draft.validate()?;

        let announcement = self.repo.create(draft, staff_id).await.map_err(log_storage_error)?;
        tracing::info!(
            announcement_id = announcement.id,
            staff_id,
            priority = announcement.priority.as_str(),
            "Announcement created"
        );
        Ok(announcement)
    }

    /// Create from form text. Unparsable dates or enum names fail with
    /// `Validation` before anything is written.
    pub async fn create_from_form(&self, form: AnnouncementForm, acting_user: Option<UserId>) -> Result<Announcement> {
        let draft = form.into_draft()?;
        self.create(draft, acting_user).await
    }

    /// Overwrite every editable field. Expired announcements stay expired;
    /// extending one means creating a new announcement.
    pub async fn update(&self, id: AnnouncementId, draft: AnnouncementDraft, acting_user: Option<UserId>) -> Result<Announcement> {
        let staff_id = self.gate.require(acting_user, ModerationAction::UpdateAnnouncement).await?;

        draft.validate()?;

        let existing = self.repo.find_by_id(id).await.map_err(log_storage_error)?.ok_or_else(|| {
            AppError::NotFound(format!("Announcement {} not found", id))
        })?;

        let now = Utc::now();
        if existing.end_date.map(|end| end < now).unwrap_or(false) {
            return Err(AppError::PreconditionFailed(format!(
                "Announcement {} has expired; create a new announcement instead",
                id
            )));
        }

        let announcement = self.repo.update(id, draft).await.map_err(log_storage_error)?;
        tracing::info!(announcement_id = id, staff_id, "Announcement updated");
        Ok(announcement)
    }

    /// Delete the announcement and its read records. Returns false if it did not exist.
    pub async fn delete(&self, id: AnnouncementId, acting_user: Option<UserId>) -> Result<bool> {
        let staff_id = self.gate.require(acting_user, ModerationAction::DeleteAnnouncement).await?;

        let deleted = self.repo.delete(id).await.map_err(log_storage_error)?;
        if deleted {
            tracing::info!(announcement_id = id, staff_id, "Announcement deleted");
        }
        Ok(deleted)
    }

    pub async fn find_by_id(&self, id: AnnouncementId) -> Result<Option<Announcement>> {
        self.repo.find_by_id(id).await.map_err(log_storage_error)
    }

    /// Every announcement, newest first, with the author's display name.
    pub async fn list_all(&self) -> Result<Vec<AnnouncementWithCreator>> {
        let announcements = self.repo.list().await.map_err(log_storage_error)?;

        let mut names: HashMap<UserId, Option<String>> = HashMap::new();
        let mut listed = Vec::with_capacity(announcements.len());
        for announcement in announcements {
            let creator_id = announcement.created_by_staff_id;
            let creator_name = match names.get(&creator_id) {
                Some(name) => name.clone(),
                None => {
                    let name = self.users.display_name(creator_id).await.map_err(log_storage_error)?;
                    names.insert(creator_id, name.clone());
                    name
                }
            };
            listed.push(AnnouncementWithCreator { announcement, creator_name });
        }

        Ok(listed)
    }

    pub async fn list_active_for_user(&self, user_id: UserId) -> Result<Vec<Announcement>> {
        self.list_active_for_user_at(user_id, Utc::now()).await
    }

    /// Announcements `user_id` should see at `now`: inside their window, and
    /// either SHOW_ALWAYS or not yet read. Most urgent first, then newest.
    pub async fn list_active_for_user_at(&self, user_id: UserId, now: DateTime<Utc>) -> Result<Vec<Announcement>> {
        let mut announcements = self.repo.list_active_for_user(user_id, now).await.map_err(log_storage_error)?;

        // Stable sort keeps the newest-first order within a priority.
        announcements.sort_by_key(|a| a.priority.precedence());
        Ok(announcements)
    }

    pub async fn visibility_for(&self, id: AnnouncementId, user_id: UserId) -> Result<VisibilityState> {
        self.visibility_for_at(id, user_id, Utc::now()).await
    }

    pub async fn visibility_for_at(&self, id: AnnouncementId, user_id: UserId, now: DateTime<Utc>) -> Result<VisibilityState> {
        let announcement = self.repo.find_by_id(id).await.map_err(log_storage_error)?.ok_or_else(|| {
            AppError::NotFound(format!("Announcement {} not found", id))
        })?;
        let has_read = self.reads.has_read(id, user_id).await?;

        Ok(VisibilityState::evaluate(
            announcement.start_date,
            announcement.end_date,
            has_read,
            now,
        ))
    }

    /// Record a read for an existing announcement.
    pub async fn mark_read(&self, id: AnnouncementId, user_id: UserId) -> Result<()> {
        if self.repo.find_by_id(id).await.map_err(log_storage_error)?.is_none() {
            return Err(AppError::NotFound(format!("Announcement {} not found", id)));
        }

        self.reads.mark_read(id, user_id).await
    }
}

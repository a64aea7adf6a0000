pub mod authorization;
pub mod faq_service;
pub mod announcement_service;
pub mod read_tracker;

use std::sync::Arc;
use sqlx::SqlitePool;
use crate::config::ModerationConfig;
use crate::error::AppError;
use crate::repository::*;

pub use authorization::{AuthorizationGate, MaintenanceGrant, ModerationAction};
pub use faq_service::FaqCurationService;
pub use announcement_service::AnnouncementService;
pub use read_tracker::ReadTracker;

/// Everything a caller needs to run moderation operations, passed
/// explicitly instead of living in process-wide state.
pub struct ServiceContext {
    pub user_directory: Arc<dyn UserDirectory>,
    pub solution_lookup: Arc<dyn SolutionLookup>,
    pub gate: Arc<AuthorizationGate>,
    pub faq_service: Arc<FaqCurationService>,
    pub announcement_service: Arc<AnnouncementService>,
    pub read_tracker: Arc<ReadTracker>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(db_pool: SqlitePool, moderation: &ModerationConfig) -> Self {
        let user_directory: Arc<dyn UserDirectory> = Arc::new(SqliteUserDirectory::new(db_pool.clone()));
        let solution_lookup: Arc<dyn SolutionLookup> = Arc::new(SqliteSolutionLookup::new(db_pool.clone()));

        Self::with_collaborators(db_pool, moderation, user_directory, solution_lookup)
    }

    /// Build the context around caller-supplied user and solution lookups.
    pub fn with_collaborators(
        db_pool: SqlitePool,
        moderation: &ModerationConfig,
        user_directory: Arc<dyn UserDirectory>,
        solution_lookup: Arc<dyn SolutionLookup>,
    ) -> Self {
        // Create repositories
        let faq_repo = Arc::new(SqliteFaqRepository::new(db_pool.clone()));
        let announcement_repo = Arc::new(SqliteAnnouncementRepository::new(db_pool.clone()));
        let read_repo = Arc::new(SqliteReadRepository::new(db_pool.clone()));

        // Create services
        let gate = Arc::new(AuthorizationGate::new(user_directory.clone(), moderation));
        let read_tracker = Arc::new(ReadTracker::new(read_repo));
        let faq_service = Arc::new(FaqCurationService::new(
            faq_repo,
            solution_lookup.clone(),
            gate.clone(),
        ));
        let announcement_service = Arc::new(AnnouncementService::new(
            announcement_repo,
            read_tracker.clone(),
            user_directory.clone(),
            gate.clone(),
        ));

        Self {
            user_directory,
            solution_lookup,
            gate,
            faq_service,
            announcement_service,
            read_tracker,
            db_pool,
        }
    }
}

/// Emit an `error!` event for storage failures before handing the error back.
/// Use as `.map_err(log_storage_error)` on repository and collaborator calls.
pub(crate) fn log_storage_error(err: AppError) -> AppError {
    if let AppError::Database(ref msg) = err {
        tracing::error!(error = %msg, "Storage call failed");
    }
    err
}

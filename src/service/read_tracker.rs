use std::sync::Arc;
use chrono::Utc;

use crate::{
    domain::{AnnouncementId, ReadRecord, UserId},
    error::Result,
    repository::ReadRepository,
    service::log_storage_error,
};

/// Per-user read state for announcements.
pub struct ReadTracker {
    repo: Arc<dyn ReadRepository>,
}

impl ReadTracker {
    pub fn new(repo: Arc<dyn ReadRepository>) -> Self {
        Self { repo }
    }

    /// Record that `user_id` has read the announcement. Repeat calls leave
    /// the original record untouched.
    pub async fn mark_read(&self, announcement_id: AnnouncementId, user_id: UserId) -> Result<()> {
        let inserted = self.repo
            .mark_read(announcement_id, user_id, Utc::now())
            .await
            .map_err(log_storage_error)?;

        if inserted {
            tracing::debug!(announcement_id, user_id, "Announcement marked read");
        }

        Ok(())
    }

    pub async fn has_read(&self, announcement_id: AnnouncementId, user_id: UserId) -> Result<bool> {
        Ok(self.repo.find(announcement_id, user_id).await.map_err(log_storage_error)?.is_some())
    }

    pub async fn find(&self, announcement_id: AnnouncementId, user_id: UserId) -> Result<Option<ReadRecord>> {
        self.repo.find(announcement_id, user_id).await.map_err(log_storage_error)
    }

    /// Number of distinct users who have read the announcement.
    pub async fn read_count(&self, announcement_id: AnnouncementId) -> Result<i64> {
        self.repo.count_for_announcement(announcement_id).await.map_err(log_storage_error)
    }
}

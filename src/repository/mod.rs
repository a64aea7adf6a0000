use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crate::domain::*;
use crate::error::Result;

pub mod faq_repository;
pub mod announcement_repository;
pub mod read_repository;
pub mod user_directory;
pub mod solution_lookup;

pub use faq_repository::SqliteFaqRepository;
pub use announcement_repository::SqliteAnnouncementRepository;
pub use read_repository::SqliteReadRepository;
pub use user_directory::SqliteUserDirectory;
pub use solution_lookup::SqliteSolutionLookup;

#[async_trait]
pub trait FaqRepository: Send + Sync {
    async fn create(&self, request: MarkFaqRequest, marked_by: UserId) -> Result<FaqEntry>;
    async fn find_by_id(&self, id: FaqId) -> Result<Option<FaqEntry>>;
    async fn find_by_question(&self, question_id: QuestionId) -> Result<Option<FaqEntry>>;
    async fn exists_for_question(&self, question_id: QuestionId) -> Result<bool>;
    async fn list_all(&self) -> Result<Vec<FaqEntry>>;
    async fn list_by_category(&self, category: &str) -> Result<Vec<FaqEntry>>;
    async fn categories(&self) -> Result<Vec<String>>;
    async fn update(&self, id: FaqId, request: UpdateFaqRequest) -> Result<FaqEntry>;
    async fn delete_by_question(&self, question_id: QuestionId) -> Result<u64>;
}

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    async fn create(&self, draft: AnnouncementDraft, created_by: UserId) -> Result<Announcement>;
    async fn find_by_id(&self, id: AnnouncementId) -> Result<Option<Announcement>>;
    /// Newest first.
    async fn list(&self) -> Result<Vec<Announcement>>;
    async fn list_active_for_user(&self, user_id: UserId, now: DateTime<Utc>) -> Result<Vec<Announcement>>;
    async fn update(&self, id: AnnouncementId, draft: AnnouncementDraft) -> Result<Announcement>;
    async fn delete(&self, id: AnnouncementId) -> Result<bool>;
}

#[async_trait]
pub trait ReadRepository: Send + Sync {
    /// Returns true when this call created the record.
    async fn mark_read(&self, announcement_id: AnnouncementId, user_id: UserId, read_date: DateTime<Utc>) -> Result<bool>;
    async fn find(&self, announcement_id: AnnouncementId, user_id: UserId) -> Result<Option<ReadRecord>>;
    async fn count_for_announcement(&self, announcement_id: AnnouncementId) -> Result<i64>;
}

/// Answers whether a question has an answer accepted as its solution.
#[async_trait]
pub trait SolutionLookup: Send + Sync {
    async fn has_solution(&self, question_id: QuestionId) -> Result<bool>;
}

/// Read-only view of the forum's user accounts.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn display_name(&self, user_id: UserId) -> Result<Option<String>>;
    /// `None` when the user is unknown or the stored role is unrecognised.
    async fn role_of(&self, user_id: UserId) -> Result<Option<Role>>;
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

pub type FaqId = i64;
pub type QuestionId = i64;

/// A moderator-curated pointer from a resolved question to a public summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FaqEntry {
    pub id: FaqId,
    pub question_id: QuestionId,
    pub category: String,
    pub display_title: String,
    pub staff_notes: Option<String>,
    pub date_marked: DateTime<Utc>,
    pub marked_by_staff_id: UserId,
    /// Title of the underlying question, `None` once the question is deleted.
    pub question_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkFaqRequest {
    pub question_id: QuestionId,
    pub category: String,
    pub display_title: String,
    pub staff_notes: Option<String>,
}

/// Editable FAQ fields. The question and the marking staff member never change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateFaqRequest {
    pub category: String,
    pub display_title: String,
    pub staff_notes: Option<String>,
}

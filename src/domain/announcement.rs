use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;
use crate::error::{AppError, Result};

pub type AnnouncementId = i64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub title: String,
    pub content: String,
    pub priority: AnnouncementPriority,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub display_type: DisplayType,
    pub created_by_staff_id: UserId,
    pub created_date: DateTime<Utc>,
    pub last_modified_date: DateTime<Utc>,
}

/// Announcement as shown in the staff listing, with the author's name resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnouncementWithCreator {
    #[serde(flatten)]
    pub announcement: Announcement,
    /// `None` when the creating user no longer exists.
    pub creator_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnnouncementPriority {
    Normal,
    Important,
    Urgent,
}

impl AnnouncementPriority {
    /// Sort key for simultaneously active announcements; lower comes first.
    pub fn precedence(&self) -> i32 {
        match self {
            AnnouncementPriority::Urgent => 1,
            AnnouncementPriority::Important => 2,
            AnnouncementPriority::Normal => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementPriority::Normal => "NORMAL",
            AnnouncementPriority::Important => "IMPORTANT",
            AnnouncementPriority::Urgent => "URGENT",
        }
    }
}

impl FromStr for AnnouncementPriority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "NORMAL" => Ok(AnnouncementPriority::Normal),
            "IMPORTANT" => Ok(AnnouncementPriority::Important),
            "URGENT" => Ok(AnnouncementPriority::Urgent),
            _ => Err(AppError::Validation(format!("Unknown priority: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisplayType {
    /// Hidden from a user once they have read it.
    ShowOnce,
    /// Surfaced for as long as it is active, whatever the read history.
    ShowAlways,
}

impl DisplayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayType::ShowOnce => "SHOW_ONCE",
            DisplayType::ShowAlways => "SHOW_ALWAYS",
        }
    }
}

impl FromStr for DisplayType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "SHOW_ONCE" => Ok(DisplayType::ShowOnce),
            "SHOW_ALWAYS" => Ok(DisplayType::ShowAlways),
            _ => Err(AppError::Validation(format!("Unknown display type: {}", s))),
        }
    }
}

/// Fields supplied by staff when creating or editing an announcement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncementDraft {
    pub title: String,
    pub content: String,
    pub priority: AnnouncementPriority,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub display_type: DisplayType,
}

impl AnnouncementDraft {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        if self.content.trim().is_empty() {
            return Err(AppError::Validation("Content is required".to_string()));
        }
        if let Some(end_date) = self.end_date {
            if end_date < self.start_date {
                return Err(AppError::Validation(format!(
                    "End date {} precedes start date {}",
                    end_date, self.start_date
                )));
            }
        }
        Ok(())
    }
}

/// Announcement fields as typed into the staff form, dates still as text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncementForm {
    pub title: String,
    pub content: String,
    pub priority: String,
    pub start_date: String,
    /// Blank or absent means open-ended.
    pub end_date: Option<String>,
    pub display_type: String,
}

impl AnnouncementForm {
    pub fn into_draft(self) -> Result<AnnouncementDraft> {
        let end_date = match self.end_date.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => Some(parse_local_datetime(text)?),
            _ => None,
        };

        let draft = AnnouncementDraft {
            priority: self.priority.parse()?,
            start_date: parse_local_datetime(&self.start_date)?,
            end_date,
            display_type: self.display_type.parse()?,
            title: self.title,
            content: self.content,
        };
        draft.validate()?;
        Ok(draft)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadRecord {
    pub id: i64,
    pub announcement_id: AnnouncementId,
    pub user_id: UserId,
    pub read_date: DateTime<Utc>,
}

/// Where an announcement stands for one user at a given instant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VisibilityState {
    NotStarted,
    ActiveUnread,
    ActiveRead,
    Expired,
}

impl VisibilityState {
    pub fn evaluate(
        start_date: DateTime<Utc>,
        end_date: Option<DateTime<Utc>>,
        has_read: bool,
        now: DateTime<Utc>,
    ) -> Self {
        if now < start_date {
            return VisibilityState::NotStarted;
        }
        if end_date.map(|end| end < now).unwrap_or(false) {
            return VisibilityState::Expired;
        }
        if has_read {
            VisibilityState::ActiveRead
        } else {
            VisibilityState::ActiveUnread
        }
    }

    pub fn is_visible(&self, display_type: DisplayType) -> bool {
        match self {
            VisibilityState::ActiveUnread => true,
            VisibilityState::ActiveRead => display_type == DisplayType::ShowAlways,
            VisibilityState::NotStarted | VisibilityState::Expired => false,
        }
    }
}

/// Parse ISO local date-time text from a form field (`2025-01-01T00:00:00`,
/// fractional seconds optional, seconds optional). The value is taken as UTC.
pub fn parse_local_datetime(s: &str) -> Result<DateTime<Utc>> {
    let trimmed = s.trim();
    let naive = trimmed
        .parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"))
        .map_err(|_| AppError::Validation(format!("Invalid date-time: '{}'", s)))?;

    Ok(DateTime::from_naive_utc_and_offset(naive, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn draft() -> AnnouncementDraft {
        AnnouncementDraft {
            title: "Downtime".to_string(),
            content: "The forum is offline tonight".to_string(),
            priority: AnnouncementPriority::Urgent,
            start_date: at(2025, 1, 1),
            end_date: None,
            display_type: DisplayType::ShowAlways,
        }
    }

    #[test]
    fn test_priority_precedence() {
        assert_eq!(AnnouncementPriority::Urgent.precedence(), 1);
        assert_eq!(AnnouncementPriority::Important.precedence(), 2);
        assert_eq!(AnnouncementPriority::Normal.precedence(), 3);

        let mut priorities = vec![
            AnnouncementPriority::Normal,
            AnnouncementPriority::Urgent,
            AnnouncementPriority::Important,
        ];
        priorities.sort_by_key(|p| p.precedence());
        assert_eq!(
            priorities,
            vec![
                AnnouncementPriority::Urgent,
                AnnouncementPriority::Important,
                AnnouncementPriority::Normal,
            ]
        );
    }

    #[test]
    fn test_enum_storage_names() {
        assert_eq!("urgent".parse::<AnnouncementPriority>().ok(), Some(AnnouncementPriority::Urgent));
        assert_eq!("LOW".parse::<AnnouncementPriority>().ok(), None);
        assert_eq!("SHOW_ONCE".parse::<DisplayType>().ok(), Some(DisplayType::ShowOnce));
        assert_eq!(DisplayType::ShowAlways.as_str(), "SHOW_ALWAYS");
        assert_eq!("sometimes".parse::<DisplayType>().ok(), None);
    }

    #[test]
    fn test_parse_local_datetime() {
        assert_eq!(parse_local_datetime("2025-01-01T00:00:00").unwrap(), at(2025, 1, 1));
        assert_eq!(parse_local_datetime("2025-01-01T00:00").unwrap(), at(2025, 1, 1));
        assert_eq!(
            parse_local_datetime("2025-01-01T00:00:00.500").unwrap(),
            at(2025, 1, 1) + Duration::milliseconds(500)
        );
        assert!(matches!(
            parse_local_datetime("next tuesday"),
            Err(AppError::Validation(_))
        ));
        assert!(parse_local_datetime("").is_err());
    }

    #[test]
    fn test_draft_validation() {
        assert!(draft().validate().is_ok());

        let blank_title = AnnouncementDraft { title: "   ".to_string(), ..draft() };
        assert!(matches!(blank_title.validate(), Err(AppError::Validation(_))));

        let blank_content = AnnouncementDraft { content: String::new(), ..draft() };
        assert!(matches!(blank_content.validate(), Err(AppError::Validation(_))));

        let inverted = AnnouncementDraft { end_date: Some(at(2024, 12, 31)), ..draft() };
        assert!(matches!(inverted.validate(), Err(AppError::Validation(_))));

        let same_instant = AnnouncementDraft { end_date: Some(at(2025, 1, 1)), ..draft() };
        assert!(same_instant.validate().is_ok());
    }

    #[test]
    fn test_visibility_transitions() {
        let start = at(2025, 1, 1);
        let end = Some(at(2025, 2, 1));

        assert_eq!(
            VisibilityState::evaluate(start, end, false, at(2024, 12, 31)),
            VisibilityState::NotStarted
        );
        assert_eq!(
            VisibilityState::evaluate(start, end, false, at(2025, 1, 15)),
            VisibilityState::ActiveUnread
        );
        assert_eq!(
            VisibilityState::evaluate(start, end, true, at(2025, 1, 15)),
            VisibilityState::ActiveRead
        );
        assert_eq!(
            VisibilityState::evaluate(start, end, true, at(2025, 3, 1)),
            VisibilityState::Expired
        );
        assert_eq!(
            VisibilityState::evaluate(start, None, false, at(2099, 1, 1)),
            VisibilityState::ActiveUnread
        );
    }

    #[test]
    fn test_visibility_membership() {
        assert!(VisibilityState::ActiveUnread.is_visible(DisplayType::ShowOnce));
        assert!(VisibilityState::ActiveUnread.is_visible(DisplayType::ShowAlways));
        assert!(!VisibilityState::ActiveRead.is_visible(DisplayType::ShowOnce));
        assert!(VisibilityState::ActiveRead.is_visible(DisplayType::ShowAlways));
        assert!(!VisibilityState::Expired.is_visible(DisplayType::ShowAlways));
        assert!(!VisibilityState::NotStarted.is_visible(DisplayType::ShowAlways));
    }

    fn form() -> AnnouncementForm {
        AnnouncementForm {
            title: "Downtime".to_string(),
            content: "The forum is offline tonight".to_string(),
            priority: "URGENT".to_string(),
            start_date: "2025-01-01T00:00:00".to_string(),
            end_date: Some("  ".to_string()),
            display_type: "SHOW_ALWAYS".to_string(),
        }
    }

    #[test]
    fn test_form_into_draft() {
        let draft = form().into_draft().unwrap();
        assert_eq!(draft.priority, AnnouncementPriority::Urgent);
        assert_eq!(draft.start_date, at(2025, 1, 1));
        assert_eq!(draft.end_date, None);
        assert_eq!(draft.display_type, DisplayType::ShowAlways);

        let bad_start = AnnouncementForm { start_date: "01/01/2025".to_string(), ..form() };
        assert!(matches!(bad_start.into_draft(), Err(AppError::Validation(_))));

        let bad_priority = AnnouncementForm { priority: "LOW".to_string(), ..form() };
        assert!(matches!(bad_priority.into_draft(), Err(AppError::Validation(_))));

        let inverted = AnnouncementForm { end_date: Some("2024-12-31T23:59".to_string()), ..form() };
        assert!(matches!(inverted.into_draft(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_json_shape_for_ui() {
        let listed = AnnouncementWithCreator {
            announcement: Announcement {
                id: 7,
                title: "Downtime".to_string(),
                content: "Offline tonight".to_string(),
                priority: AnnouncementPriority::Urgent,
                start_date: at(2025, 1, 1),
                end_date: None,
                display_type: DisplayType::ShowOnce,
                created_by_staff_id: 5,
                created_date: at(2024, 12, 20),
                last_modified_date: at(2024, 12, 21),
            },
            creator_name: Some("Dr. Rivera".to_string()),
        };

        let value = serde_json::to_value(&listed).unwrap();
        // Announcement fields sit next to creator_name, not under a nested key.
        assert_eq!(value["id"], 7);
        assert_eq!(value["priority"], "URGENT");
        assert_eq!(value["display_type"], "SHOW_ONCE");
        assert_eq!(value["creator_name"], "Dr. Rivera");
        assert!(value["end_date"].is_null());
        assert!(value.get("announcement").is_none());

        let back: AnnouncementWithCreator = serde_json::from_value(value).unwrap();
        assert_eq!(back, listed);
    }
}

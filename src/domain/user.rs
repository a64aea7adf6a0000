use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub type UserId = i64;

/// Forum roles as stored in `users.role`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Staff,
    Admin,
}

/// Authorization predicates that gate mutations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Curate FAQ entries and manage announcements.
    Moderate,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "STUDENT",
            Role::Staff => "STAFF",
            Role::Admin => "ADMIN",
        }
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        match (self, capability) {
            (Role::Staff, Capability::Moderate) => true,
            (Role::Admin, Capability::Moderate) => true,
            (Role::Student, Capability::Moderate) => false,
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "STUDENT" => Ok(Role::Student),
            "STAFF" => Ok(Role::Staff),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(AppError::Validation(format!("Unknown role: {}", s))),
        }
    }
}

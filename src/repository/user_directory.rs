use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};

use crate::{
    domain::{Role, UserId},
    error::{AppError, Result},
    repository::UserDirectory,
};

#[derive(FromRow)]
struct UserRow {
    display_name: String,
    role: String,
}

/// Looks users up in the forum's `users` table.
pub struct SqliteUserDirectory {
    pool: SqlitePool,
}

impl SqliteUserDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find(&self, user_id: UserId) -> Result<Option<UserRow>> {
        sqlx::query_as::<_, UserRow>(
            "SELECT display_name, role FROM users WHERE user_id = ?"
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl UserDirectory for SqliteUserDirectory {
    async fn display_name(&self, user_id: UserId) -> Result<Option<String>> {
        Ok(self.find(user_id).await?.map(|row| row.display_name))
    }

    async fn role_of(&self, user_id: UserId) -> Result<Option<Role>> {
        let row = match self.find(user_id).await? {
            Some(row) => row,
            None => return Ok(None),
        };

        match row.role.parse::<Role>() {
            Ok(role) => Ok(Some(role)),
            Err(_) => {
                tracing::warn!(user_id, role = %row.role, "Unrecognised role stored for user");
                Ok(None)
            }
        }
    }
}

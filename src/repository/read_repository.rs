use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::{
    domain::{AnnouncementId, ReadRecord, UserId},
    error::{AppError, Result},
    repository::ReadRepository,
};

#[derive(FromRow)]
struct ReadRow {
    read_id: i64,
    announcement_id: i64,
    user_id: i64,
    read_date: NaiveDateTime,
}

pub struct SqliteReadRepository {
    pool: SqlitePool,
}

impl SqliteReadRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: ReadRow) -> ReadRecord {
        ReadRecord {
            id: row.read_id,
            announcement_id: row.announcement_id,
            user_id: row.user_id,
            read_date: DateTime::from_naive_utc_and_offset(row.read_date, Utc),
        }
    }
}

#[async_trait]
impl ReadRepository for SqliteReadRepository {
    async fn mark_read(&self, announcement_id: AnnouncementId, user_id: UserId, read_date: DateTime<Utc>) -> Result<bool> {
        // Single conditional write; the first read date wins.
        let result = sqlx::query(
            r#"
            INSERT INTO announcement_reads (announcement_id, user_id, read_date)
            VALUES (?, ?, ?)
            ON CONFLICT (announcement_id, user_id) DO NOTHING
            "#
        )
        .bind(announcement_id)
        .bind(user_id)
        .bind(read_date.naive_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find(&self, announcement_id: AnnouncementId, user_id: UserId) -> Result<Option<ReadRecord>> {
        let row = sqlx::query_as::<_, ReadRow>(
            r#"
            SELECT read_id, announcement_id, user_id, read_date
            FROM announcement_reads
            WHERE announcement_id = ? AND user_id = ?
            "#
        )
        .bind(announcement_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.map(Self::row_to_record))
    }

    async fn count_for_announcement(&self, announcement_id: AnnouncementId) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM announcement_reads WHERE announcement_id = ?"
        )
        .bind(announcement_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.0)
    }
}

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::{
    domain::{
        Announcement, AnnouncementDraft, AnnouncementId, AnnouncementPriority, DisplayType,
        UserId,
    },
    error::{AppError, Result},
    repository::AnnouncementRepository,
};

#[derive(FromRow)]
struct AnnouncementRow {
    announcement_id: i64,
    title: String,
    content: String,
    priority: String,
    start_date: NaiveDateTime,
    end_date: Option<NaiveDateTime>,
    display_type: String,
    created_by_staff_id: i64,
    created_date: NaiveDateTime,
    last_modified_date: NaiveDateTime,
}

pub struct SqliteAnnouncementRepository {
    pool: SqlitePool,
}

impl SqliteAnnouncementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_announcement(row: AnnouncementRow) -> Result<Announcement> {
        Ok(Announcement {
            id: row.announcement_id,
            title: row.title,
            content: row.content,
            priority: row.priority.parse::<AnnouncementPriority>().map_err(|_| {
                AppError::Database(format!("Invalid announcement priority: {}", row.priority))
            })?,
            start_date: DateTime::from_naive_utc_and_offset(row.start_date, Utc),
            end_date: row.end_date.map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            display_type: row.display_type.parse::<DisplayType>().map_err(|_| {
                AppError::Database(format!("Invalid display type: {}", row.display_type))
            })?,
            created_by_staff_id: row.created_by_staff_id,
            created_date: DateTime::from_naive_utc_and_offset(row.created_date, Utc),
            last_modified_date: DateTime::from_naive_utc_and_offset(row.last_modified_date, Utc),
        })
    }
}

#[async_trait]
impl AnnouncementRepository for SqliteAnnouncementRepository {
    async fn create(&self, draft: AnnouncementDraft, created_by: UserId) -> Result<Announcement> {
        let start_date_naive = draft.start_date.naive_utc();
        let end_date_naive = draft.end_date.map(|dt| dt.naive_utc());
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            INSERT INTO announcements (
                title, content, priority, start_date, end_date, display_type,
                created_by_staff_id, created_date, last_modified_date
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(draft.priority.as_str())
        .bind(start_date_naive)
        .bind(end_date_naive)
        .bind(draft.display_type.as_str())
        .bind(created_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(result.last_insert_rowid()).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created announcement".to_string())
        })
    }

    async fn find_by_id(&self, id: AnnouncementId) -> Result<Option<Announcement>> {
        let row = sqlx::query_as::<_, AnnouncementRow>(
            r#"
            SELECT announcement_id, title, content, priority, start_date, end_date,
                   display_type, created_by_staff_id, created_date, last_modified_date
            FROM announcements
            WHERE announcement_id = ?
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_announcement(r)?)),
            None => Ok(None)
        }
    }

    async fn list(&self) -> Result<Vec<Announcement>> {
        let rows = sqlx::query_as::<_, AnnouncementRow>(
            r#"
            SELECT announcement_id, title, content, priority, start_date, end_date,
                   display_type, created_by_staff_id, created_date, last_modified_date
            FROM announcements
            ORDER BY created_date DESC, announcement_id DESC
            "#
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_announcement)
            .collect()
    }

    async fn list_active_for_user(&self, user_id: UserId, now: DateTime<Utc>) -> Result<Vec<Announcement>> {
        let now_naive = now.naive_utc();

        let rows = sqlx::query_as::<_, AnnouncementRow>(
            r#"
            SELECT a.announcement_id, a.title, a.content, a.priority, a.start_date, a.end_date,
                   a.display_type, a.created_by_staff_id, a.created_date, a.last_modified_date
            FROM announcements a
            WHERE a.start_date <= ?
              AND (a.end_date IS NULL OR a.end_date >= ?)
              AND (
                  a.display_type = 'SHOW_ALWAYS'
                  OR NOT EXISTS (
                      SELECT 1 FROM announcement_reads r
                      WHERE r.announcement_id = a.announcement_id AND r.user_id = ?
                  )
              )
            ORDER BY a.created_date DESC, a.announcement_id DESC
            "#
        )
        .bind(now_naive)
        .bind(now_naive)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_announcement)
            .collect()
    }

    async fn update(&self, id: AnnouncementId, draft: AnnouncementDraft) -> Result<Announcement> {
        let start_date_naive = draft.start_date.naive_utc();
        let end_date_naive = draft.end_date.map(|dt| dt.naive_utc());
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            UPDATE announcements
            SET title = ?, content = ?, priority = ?, start_date = ?, end_date = ?,
                display_type = ?, last_modified_date = ?
            WHERE announcement_id = ?
            "#
        )
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(draft.priority.as_str())
        .bind(start_date_naive)
        .bind(end_date_naive)
        .bind(draft.display_type.as_str())
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Announcement {} not found", id)));
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated announcement".to_string())
        })
    }

    async fn delete(&self, id: AnnouncementId) -> Result<bool> {
        // Reads and the announcement go together or not at all.
        let mut tx = self.pool.begin().await.map_err(|e| AppError::Database(e.to_string()))?;

        sqlx::query("DELETE FROM announcement_reads WHERE announcement_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let result = sqlx::query("DELETE FROM announcements WHERE announcement_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tx.commit().await.map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

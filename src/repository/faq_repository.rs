use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::{
    domain::{FaqEntry, FaqId, MarkFaqRequest, QuestionId, UpdateFaqRequest, UserId},
    error::{is_unique_violation, AppError, Result},
    repository::FaqRepository,
};

#[derive(FromRow)]
struct FaqRow {
    faq_id: i64,
    question_id: i64,
    category: String,
    display_title: String,
    staff_notes: Option<String>,
    date_marked: NaiveDateTime,
    marked_by_staff_id: i64,
    question_title: Option<String>,
}

pub struct SqliteFaqRepository {
    pool: SqlitePool,
}

impl SqliteFaqRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_entry(row: FaqRow) -> FaqEntry {
        FaqEntry {
            id: row.faq_id,
            question_id: row.question_id,
            category: row.category,
            display_title: row.display_title,
            staff_notes: row.staff_notes,
            date_marked: DateTime::from_naive_utc_and_offset(row.date_marked, Utc),
            marked_by_staff_id: row.marked_by_staff_id,
            question_title: row.question_title,
        }
    }
}

#[async_trait]
impl FaqRepository for SqliteFaqRepository {
    async fn create(&self, request: MarkFaqRequest, marked_by: UserId) -> Result<FaqEntry> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            INSERT INTO faqs (
                question_id, category, display_title, staff_notes,
                date_marked, marked_by_staff_id
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(request.question_id)
        .bind(&request.category)
        .bind(&request.display_title)
        .bind(&request.staff_notes)
        .bind(now)
        .bind(marked_by)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!(
                    "Question {} is already marked as FAQ",
                    request.question_id
                ))
            } else {
                AppError::Database(e.to_string())
            }
        })?;

        self.find_by_id(result.last_insert_rowid()).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created FAQ entry".to_string())
        })
    }

    async fn find_by_id(&self, id: FaqId) -> Result<Option<FaqEntry>> {
        let row = sqlx::query_as::<_, FaqRow>(
            r#"
            SELECT f.faq_id, f.question_id, f.category, f.display_title, f.staff_notes,
                   f.date_marked, f.marked_by_staff_id, q.title AS question_title
            FROM faqs f
            LEFT JOIN questions q ON q.question_id = f.question_id
            WHERE f.faq_id = ?
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.map(Self::row_to_entry))
    }

    async fn find_by_question(&self, question_id: QuestionId) -> Result<Option<FaqEntry>> {
        let row = sqlx::query_as::<_, FaqRow>(
            r#"
            SELECT f.faq_id, f.question_id, f.category, f.display_title, f.staff_notes,
                   f.date_marked, f.marked_by_staff_id, q.title AS question_title
            FROM faqs f
            LEFT JOIN questions q ON q.question_id = f.question_id
            WHERE f.question_id = ?
            ORDER BY f.date_marked DESC
            LIMIT 1
            "#
        )
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.map(Self::row_to_entry))
    }

    async fn exists_for_question(&self, question_id: QuestionId) -> Result<bool> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM faqs WHERE question_id = ?"
        )
        .bind(question_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.0 > 0)
    }

    async fn list_all(&self) -> Result<Vec<FaqEntry>> {
        let rows = sqlx::query_as::<_, FaqRow>(
            r#"
            SELECT f.faq_id, f.question_id, f.category, f.display_title, f.staff_notes,
                   f.date_marked, f.marked_by_staff_id, q.title AS question_title
            FROM faqs f
            LEFT JOIN questions q ON q.question_id = f.question_id
            ORDER BY f.category ASC, f.date_marked DESC, f.faq_id DESC
            "#
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Self::row_to_entry).collect())
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<FaqEntry>> {
        let rows = sqlx::query_as::<_, FaqRow>(
            r#"
            SELECT f.faq_id, f.question_id, f.category, f.display_title, f.staff_notes,
                   f.date_marked, f.marked_by_staff_id, q.title AS question_title
            FROM faqs f
            LEFT JOIN questions q ON q.question_id = f.question_id
            WHERE f.category = ?
            ORDER BY f.date_marked DESC, f.faq_id DESC
            "#
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Self::row_to_entry).collect())
    }

    async fn categories(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT category FROM faqs ORDER BY category ASC"
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(|(category,)| category).collect())
    }

    async fn update(&self, id: FaqId, request: UpdateFaqRequest) -> Result<FaqEntry> {
        let result = sqlx::query(
            r#"
            UPDATE faqs
            SET category = ?, display_title = ?, staff_notes = ?
            WHERE faq_id = ?
            "#
        )
        .bind(&request.category)
        .bind(&request.display_title)
        .bind(&request.staff_notes)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("FAQ entry {} not found", id)));
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated FAQ entry".to_string())
        })
    }

    async fn delete_by_question(&self, question_id: QuestionId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM faqs WHERE question_id = ?")
            .bind(question_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::{
    domain::QuestionId,
    error::{AppError, Result},
    repository::SolutionLookup,
};

pub struct SqliteSolutionLookup {
    pool: SqlitePool,
}

impl SqliteSolutionLookup {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SolutionLookup for SqliteSolutionLookup {
    async fn has_solution(&self, question_id: QuestionId) -> Result<bool> {
        let row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) as count
            FROM answers
            WHERE question_id = ? AND is_solution = 1
            "#
        )
        .bind(question_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.0 > 0)
    }
}

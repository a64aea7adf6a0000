#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use lectern::{
    config::ModerationConfig,
    domain::{Role, UserId},
    error::{AppError, Result},
    repository::UserDirectory,
    service::ServiceContext,
};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

pub const STAFF: i64 = 5;
pub const ADMIN: i64 = 6;
pub const STUDENT: i64 = 10;

/// In-memory database with the schema applied. A single connection keeps
/// every query on the same in-memory database.
pub async fn test_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await?;

    insert_user(&pool, STAFF, "Dr. Rivera", "STAFF").await?;
    insert_user(&pool, ADMIN, "Site Admin", "admin").await?;
    insert_user(&pool, STUDENT, "Sam Student", "STUDENT").await?;

    Ok(pool)
}

pub async fn test_context() -> anyhow::Result<ServiceContext> {
    let pool = test_pool().await?;
    Ok(ServiceContext::new(pool, &ModerationConfig::default()))
}

pub async fn insert_user(pool: &SqlitePool, id: i64, name: &str, role: &str) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO users (user_id, display_name, role) VALUES (?, ?, ?)")
        .bind(id)
        .bind(name)
        .bind(role)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn insert_question(pool: &SqlitePool, id: i64, title: &str) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO questions (question_id, title) VALUES (?, ?)")
        .bind(id)
        .bind(title)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn insert_answer(pool: &SqlitePool, question_id: i64, is_solution: bool) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO answers (question_id, is_solution) VALUES (?, ?)")
        .bind(question_id)
        .bind(is_solution)
        .execute(pool)
        .await?;
    Ok(())
}

/// A question with one accepted answer.
pub async fn insert_resolved_question(pool: &SqlitePool, id: i64, title: &str) -> anyhow::Result<()> {
    insert_question(pool, id, title).await?;
    insert_answer(pool, id, false).await?;
    insert_answer(pool, id, true).await?;
    Ok(())
}

/// Directory that never touches the database: every user is staff and
/// shares one display name. Counts `display_name` lookups.
pub struct FixedDirectory {
    pub name: &'static str,
    pub name_lookups: AtomicUsize,
}

impl FixedDirectory {
    pub fn new(name: &'static str) -> Self {
        Self { name, name_lookups: AtomicUsize::new(0) }
    }

    pub fn lookups(&self) -> usize {
        self.name_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserDirectory for FixedDirectory {
    async fn display_name(&self, _user_id: UserId) -> Result<Option<String>> {
        self.name_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(Some(self.name.to_string()))
    }

    async fn role_of(&self, _user_id: UserId) -> Result<Option<Role>> {
        Ok(Some(Role::Staff))
    }
}

/// Directory whose backing store is unreachable.
pub struct UnreachableDirectory;

#[async_trait]
impl UserDirectory for UnreachableDirectory {
    async fn display_name(&self, _user_id: UserId) -> Result<Option<String>> {
        Err(AppError::Database("user directory unreachable".to_string()))
    }

    async fn role_of(&self, _user_id: UserId) -> Result<Option<Role>> {
        Err(AppError::Database("user directory unreachable".to_string()))
    }
}

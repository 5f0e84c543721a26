//! SQLite session history

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use crate::error::{ApiError, Result};
use crate::models::*;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to SQLite and create connection pool
    pub async fn connect(database_url: &str) -> Result<Self> {
        // An in-memory database exists per connection, so keep exactly one.
        let in_memory = database_url.contains(":memory:");
        let mut options = SqlitePoolOptions::new().max_connections(if in_memory { 1 } else { 5 });
        if in_memory {
            options = options.idle_timeout(None).max_lifetime(None);
        }
        let pool = options.connect(database_url).await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // === Session History Repository ===

    /// Record a session
    pub async fn insert_session(&self, session: &LearningSession) -> Result<()> {
        let row = DbSession::from_learning_session(session)?;
        sqlx::query(
            r#"
            INSERT INTO sessions (id, created_at, theme, difficulty, words)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&row.id)
        .bind(row.created_at)
        .bind(&row.theme)
        .bind(&row.difficulty)
        .bind(&row.words)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All sessions, newest first
    pub async fn list_sessions(&self) -> Result<Vec<LearningSession>> {
        let rows = sqlx::query_as::<_, DbSession>(
            r#"
            SELECT id, created_at, theme, difficulty, words
            FROM sessions
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(DbSession::to_learning_session).collect()
    }

    /// Get session by ID
    pub async fn get_session(&self, id: &str) -> Result<Option<LearningSession>> {
        let row = sqlx::query_as::<_, DbSession>(
            r#"
            SELECT id, created_at, theme, difficulty, words
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(DbSession::to_learning_session).transpose()
    }

    /// Delete session by ID. Returns whether a row was removed.
    pub async fn delete_session(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

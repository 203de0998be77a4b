//! Database initialization
//!
//! Opens (or creates) the SQLite database and applies the schema. Schema creation
//! is idempotent and safe to run on every startup.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Busy timeout applied to every connection
const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Initialize database connection pool and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Pragmas go on the connect options so every pooled connection gets them,
    // not just the first one.
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Open a private in-memory database with the full schema
///
/// Limited to one connection that is never recycled: each SQLite `:memory:`
/// connection is its own database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_amendments_table(pool).await?;
    create_feedback_table(pool).await?;
    Ok(())
}

async fn create_amendments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS amendments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL CHECK (length(title) BETWEEN 1 AND 500),
            description TEXT NOT NULL CHECK (length(description) >= 1),
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_amendments_created_at ON amendments(created_at)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Feedback rows belong to their amendment (cascade delete).
///
/// A toxic row never carries analysis results; the CHECK makes that a storage
/// guarantee rather than a convention.
async fn create_feedback_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS feedback (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amendment_id INTEGER NOT NULL REFERENCES amendments(id) ON DELETE CASCADE,
            original_text TEXT NOT NULL CHECK (length(original_text) >= 1),
            summary TEXT,
            sentiment TEXT CHECK (sentiment IN ('positive', 'negative', 'neutral')),
            sentiment_confidence REAL CHECK (sentiment_confidence BETWEEN 0.0 AND 1.0),
            is_toxic INTEGER NOT NULL DEFAULT 0,
            toxicity_score REAL,
            created_at TEXT NOT NULL,
            CHECK (
                is_toxic = 0
                OR (summary IS NULL AND sentiment IS NULL AND sentiment_confidence IS NULL)
            )
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_feedback_amendment ON feedback(amendment_id, created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

//! Amendment queries

use crate::db::models::{Amendment, NewAmendment};
use crate::time::{db_now, to_db_timestamp};
use crate::Result;
use sqlx::SqlitePool;

/// Insert an amendment; id and timestamp are assigned here
pub async fn insert_amendment(pool: &SqlitePool, amendment: &NewAmendment) -> Result<Amendment> {
    let created_at = db_now();

    let result = sqlx::query(
        "INSERT INTO amendments (title, description, created_at) VALUES (?, ?, ?)",
    )
    .bind(&amendment.title)
    .bind(&amendment.description)
    .bind(to_db_timestamp(&created_at))
    .execute(pool)
    .await?;

    Ok(Amendment {
        id: result.last_insert_rowid(),
        title: amendment.title.clone(),
        description: amendment.description.clone(),
        created_at,
    })
}

/// All amendments, newest first
pub async fn list_amendments(pool: &SqlitePool) -> Result<Vec<Amendment>> {
    let amendments = sqlx::query_as::<_, Amendment>(
        "SELECT id, title, description, created_at FROM amendments ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(amendments)
}

pub async fn get_amendment(pool: &SqlitePool, id: i64) -> Result<Option<Amendment>> {
    let amendment = sqlx::query_as::<_, Amendment>(
        "SELECT id, title, description, created_at FROM amendments WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(amendment)
}

pub async fn amendment_exists(pool: &SqlitePool, id: i64) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM amendments WHERE id = ?)")
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(exists)
}

/// Delete an amendment and (by cascade) its feedback
///
/// Returns false if no such amendment existed.
pub async fn delete_amendment(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM amendments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

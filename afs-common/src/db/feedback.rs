//! Feedback queries
//!
//! Feedback is written once and never updated.

use crate::db::models::{Feedback, FeedbackOutcome, NewFeedback};
use crate::time::{db_now, to_db_timestamp};
use crate::{Error, Result};
use sqlx::SqlitePool;

/// Record a feedback submission atomically
///
/// The parent check and the insert share one transaction: either the whole row
/// is committed or nothing is. A transaction dropped before commit (e.g. the
/// request was cancelled) rolls back.
///
/// # Errors
/// - [`Error::NotFound`] if the amendment does not exist; nothing is written
/// - [`Error::Database`] on write failure
pub async fn insert_feedback(pool: &SqlitePool, feedback: &NewFeedback) -> Result<Feedback> {
    let mut tx = pool.begin().await?;

    let parent_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM amendments WHERE id = ?)")
            .bind(feedback.amendment_id)
            .fetch_one(&mut *tx)
            .await?;

    if !parent_exists {
        return Err(Error::NotFound(format!(
            "Amendment {} not found",
            feedback.amendment_id
        )));
    }

    let (summary, sentiment, sentiment_confidence) = match &feedback.outcome {
        FeedbackOutcome::Toxic => (None, None, None),
        FeedbackOutcome::Analyzed {
            summary,
            sentiment,
            sentiment_confidence,
        } => (
            Some(summary.clone()),
            Some(sentiment.clone()),
            Some(*sentiment_confidence),
        ),
    };

    let created_at = db_now();

    let result = sqlx::query(
        r#"
        INSERT INTO feedback (
            amendment_id, original_text, summary, sentiment, sentiment_confidence,
            is_toxic, toxicity_score, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(feedback.amendment_id)
    .bind(&feedback.original_text)
    .bind(&summary)
    .bind(&sentiment)
    .bind(sentiment_confidence)
    .bind(feedback.is_toxic())
    .bind(feedback.toxicity_score)
    .bind(to_db_timestamp(&created_at))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Feedback {
        id: result.last_insert_rowid(),
        amendment_id: feedback.amendment_id,
        original_text: feedback.original_text.clone(),
        summary,
        sentiment,
        sentiment_confidence,
        is_toxic: feedback.is_toxic(),
        toxicity_score: Some(feedback.toxicity_score),
        created_at,
    })
}

/// All feedback for an amendment, newest first
///
/// # Errors
/// - [`Error::NotFound`] if the amendment does not exist
pub async fn list_feedback(pool: &SqlitePool, amendment_id: i64) -> Result<Vec<Feedback>> {
    if !crate::db::amendments::amendment_exists(pool, amendment_id).await? {
        return Err(Error::NotFound(format!("Amendment {} not found", amendment_id)));
    }

    let feedback = sqlx::query_as::<_, Feedback>(
        r#"
        SELECT id, amendment_id, original_text, summary, sentiment, sentiment_confidence,
               is_toxic, toxicity_score, created_at
        FROM feedback
        WHERE amendment_id = ?
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(amendment_id)
    .fetch_all(pool)
    .await?;

    Ok(feedback)
}

/// Number of stored feedback rows for an amendment
pub async fn count_feedback(pool: &SqlitePool, amendment_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM feedback WHERE amendment_id = ?")
        .bind(amendment_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

//! Feedback recorder
//!
//! Final pipeline stage and the only one with a durable side effect.

use crate::analysis::{SentimentResult, ToxicityVerdict};
use afs_common::db::{insert_feedback, Feedback, FeedbackOutcome, NewFeedback};
use afs_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::info;

/// Sentiment and summary for a comment that passed the gate
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub sentiment: SentimentResult,
    pub summary: String,
}

/// Persists pipeline outcomes
#[derive(Clone)]
pub struct FeedbackRecorder {
    db: SqlitePool,
}

impl FeedbackRecorder {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }

    /// Write one feedback row
    ///
    /// A toxic verdict stores null analysis columns regardless of `analysis`.
    ///
    /// # Errors
    /// - `NotFound` if the amendment does not exist (nothing written)
    /// - `Database` if the write fails (nothing written)
    /// - `Internal` if a non-toxic verdict arrives without analysis
    pub async fn record(
        &self,
        amendment_id: i64,
        original_text: &str,
        verdict: ToxicityVerdict,
        analysis: Option<&Analysis>,
    ) -> Result<Feedback> {
        let outcome = match (verdict.is_toxic, analysis) {
            (false, Some(analysis)) => FeedbackOutcome::Analyzed {
                summary: analysis.summary.clone(),
                sentiment: analysis.sentiment.label.as_str().to_string(),
                sentiment_confidence: analysis.sentiment.confidence,
            },
            (true, _) => FeedbackOutcome::Toxic,
            (false, None) => {
                return Err(Error::Internal(format!(
                    "Non-toxic feedback for amendment {} has no analysis",
                    amendment_id
                )))
            }
        };

        let feedback = insert_feedback(
            &self.db,
            &NewFeedback {
                amendment_id,
                original_text: original_text.to_string(),
                toxicity_score: verdict.score,
                outcome,
            },
        )
        .await?;

        info!(
            "Recorded feedback {} for amendment {} (toxic={})",
            feedback.id, amendment_id, feedback.is_toxic
        );

        Ok(feedback)
    }
}

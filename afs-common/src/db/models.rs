//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A government amendment open for public comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Amendment {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating an amendment
#[derive(Debug, Clone)]
pub struct NewAmendment {
    pub title: String,
    pub description: String,
}

/// A stored public comment with its analysis results
///
/// Rows are append-only. When `is_toxic` is true the analysis columns are null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Feedback {
    pub id: i64,
    pub amendment_id: i64,
    pub original_text: String,
    pub summary: Option<String>,
    pub sentiment: Option<String>,
    pub sentiment_confidence: Option<f64>,
    pub is_toxic: bool,
    pub toxicity_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// What the pipeline decided about a comment
#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackOutcome {
    /// Toxicity gate rejected the comment; nothing else was computed
    Toxic,
    /// Comment passed the gate and was classified and summarized
    Analyzed {
        summary: String,
        sentiment: String,
        sentiment_confidence: f64,
    },
}

/// Fields supplied when recording a feedback submission
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub amendment_id: i64,
    pub original_text: String,
    pub toxicity_score: f64,
    pub outcome: FeedbackOutcome,
}

impl NewFeedback {
    pub fn is_toxic(&self) -> bool {
        matches!(self.outcome, FeedbackOutcome::Toxic)
    }
}

//! Feedback endpoints
//!
//! A toxic comment is a normal response with `success: false`, not an HTTP
//! error. Only malformed input (400), an unknown amendment (404) and storage
//! failures (500) are errors.

use super::json_body;
use crate::analysis::SentimentLabel;
use crate::pipeline::{FeedbackSubmission, SubmissionOutcome};
use crate::{ApiResult, AppState};
use afs_common::db::{self, Feedback};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

/// Analysis results for a submission
///
/// Serialized without a tag: a rejected comment carries only the toxicity
/// fields.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SubmissionData {
    Rejected {
        toxic: bool,
        toxic_score: f64,
    },
    Accepted {
        toxic: bool,
        feedback_id: i64,
        sentiment: SentimentLabel,
        confidence: f64,
        summary: String,
        toxic_score: f64,
    },
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub success: bool,
    pub message: String,
    pub data: SubmissionData,
}

impl From<SubmissionOutcome> for SubmissionResponse {
    fn from(outcome: SubmissionOutcome) -> Self {
        match outcome {
            SubmissionOutcome::Rejected { toxicity_score, .. } => Self {
                success: false,
                message: "The comment contains toxicity".to_string(),
                data: SubmissionData::Rejected {
                    toxic: true,
                    toxic_score: toxicity_score,
                },
            },
            SubmissionOutcome::Accepted {
                feedback,
                analysis,
                toxicity_score,
            } => Self {
                success: true,
                message: "Feedback submitted successfully".to_string(),
                data: SubmissionData::Accepted {
                    toxic: false,
                    feedback_id: feedback.id,
                    sentiment: analysis.sentiment.label,
                    confidence: analysis.sentiment.confidence,
                    summary: analysis.summary,
                    toxic_score: toxicity_score,
                },
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeedbackListResponse {
    pub success: bool,
    pub message: String,
    pub feedback: Vec<Feedback>,
}

/// POST /feedback
///
/// **Request:** `{"amendment_id": 1, "original_text": "..."}`
///
/// **Errors:**
/// - 400 Bad Request: non-positive id, empty or over-long text, malformed JSON
/// - 404 Not Found: amendment does not exist (nothing stored)
pub async fn submit_feedback(
    State(state): State<AppState>,
    payload: Result<Json<FeedbackSubmission>, JsonRejection>,
) -> ApiResult<Json<SubmissionResponse>> {
    let submission = json_body(payload)?;
    let outcome = state.pipeline.submit(&submission).await?;
    Ok(Json(outcome.into()))
}

/// GET /feedback/:amendment_id
///
/// Feedback for one amendment, newest first.
pub async fn list_feedback(
    State(state): State<AppState>,
    Path(amendment_id): Path<i64>,
) -> ApiResult<Json<FeedbackListResponse>> {
    let feedback = db::list_feedback(&state.db, amendment_id).await?;

    Ok(Json(FeedbackListResponse {
        success: true,
        message: format!(
            "Retrieved {} feedback entries for amendment {}",
            feedback.len(),
            amendment_id
        ),
        feedback,
    }))
}

/// Build feedback routes
pub fn feedback_routes() -> Router<AppState> {
    Router::new()
        .route("/feedback", post(submit_feedback))
        .route("/feedback/:amendment_id", get(list_feedback))
}

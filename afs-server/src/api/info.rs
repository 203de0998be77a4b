//! Service information endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::analysis::TOXICITY_THRESHOLD;
use crate::analysis::summarizer::SUMMARY_WORD_THRESHOLD;
use crate::pipeline::{StageBackends, MAX_FEEDBACK_CHARS};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
    /// Backend configured for each pipeline stage
    pub backends: StageBackends,
    pub toxicity_threshold: f64,
    pub summary_word_threshold: usize,
    pub max_feedback_chars: usize,
}

/// GET /info
pub async fn get_info(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        name: "Amendment Feedback Service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backends: state.pipeline.backends(),
        toxicity_threshold: TOXICITY_THRESHOLD,
        summary_word_threshold: SUMMARY_WORD_THRESHOLD,
        max_feedback_chars: MAX_FEEDBACK_CHARS,
    })
}

pub fn info_routes() -> Router<AppState> {
    Router::new().route("/info", get(get_info))
}

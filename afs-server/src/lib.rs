//! afs-server library - amendment feedback service
//!
//! Accepts public comments on amendments, screens them for toxicity, classifies
//! sentiment, summarizes long comments and stores the outcome.

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub mod analysis;
pub mod api;
pub mod error;
pub mod pipeline;
pub mod recorder;

pub use error::{ApiError, ApiResult};
pub use pipeline::FeedbackPipeline;

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Analysis stages plus recorder, shared read-only by every request
    pub pipeline: Arc<FeedbackPipeline>,
    /// Requests running longer than this are aborted with 408
    pub request_timeout: Duration,
    /// Service start, for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, pipeline: FeedbackPipeline) -> Self {
        Self {
            db,
            pipeline: Arc::new(pipeline),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            startup_time: afs_common::time::now(),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Build application router
///
/// A timed-out request drops its handler future; an unfinished feedback
/// transaction is rolled back with it.
pub fn build_router(state: AppState) -> Router {
    let timeout = state.request_timeout;

    Router::new()
        .merge(api::amendment_routes())
        .merge(api::feedback_routes())
        .merge(api::analyze_routes())
        .merge(api::health_routes())
        .merge(api::info_routes())
        .layer(TimeoutLayer::new(timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

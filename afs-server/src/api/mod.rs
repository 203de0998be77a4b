//! HTTP API handlers for afs-server

pub mod amendments;
pub mod analyze;
pub mod feedback;
pub mod health;
pub mod info;

pub use amendments::amendment_routes;
pub use analyze::analyze_routes;
pub use feedback::feedback_routes;
pub use health::health_routes;
pub use info::info_routes;

use crate::{ApiError, ApiResult};
use axum::extract::rejection::JsonRejection;
use axum::Json;

/// Unwrap a JSON body, reporting malformed payloads as 400
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

//! Amendment endpoints
//!
//! Amendments are created once and never edited. Deleting one removes its
//! feedback with it.

use super::json_body;
use crate::{ApiError, ApiResult, AppState};
use afs_common::db::{self, Amendment, NewAmendment};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Longest accepted title, in characters
pub const MAX_TITLE_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
pub struct CreateAmendmentRequest {
    pub title: String,
    pub description: String,
}

impl CreateAmendmentRequest {
    /// Blank fields are rejected; accepted text is stored exactly as sent
    fn validate(self) -> ApiResult<NewAmendment> {
        if self.title.trim().is_empty() {
            return Err(ApiError::BadRequest("title must not be empty".to_string()));
        }
        let title_chars = self.title.chars().count();
        if title_chars > MAX_TITLE_CHARS {
            return Err(ApiError::BadRequest(format!(
                "title is {} characters (max {})",
                title_chars, MAX_TITLE_CHARS
            )));
        }

        if self.description.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "description must not be empty".to_string(),
            ));
        }

        Ok(NewAmendment {
            title: self.title,
            description: self.description,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AmendmentResponse {
    pub success: bool,
    pub message: String,
    pub data: Amendment,
}

#[derive(Debug, Serialize)]
pub struct AmendmentListResponse {
    pub success: bool,
    pub message: String,
    pub amendments: Vec<Amendment>,
}

#[derive(Debug, Serialize)]
pub struct DeleteAmendmentResponse {
    pub success: bool,
    pub message: String,
}

/// POST /amendments
///
/// **Request:** `{"title": "...", "description": "..."}`
///
/// **Errors:**
/// - 400 Bad Request: empty title or description, title over 500 characters
pub async fn create_amendment(
    State(state): State<AppState>,
    payload: Result<Json<CreateAmendmentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AmendmentResponse>)> {
    let new_amendment = json_body(payload)?.validate()?;
    let amendment = db::insert_amendment(&state.db, &new_amendment).await?;

    info!("Created amendment {}: {}", amendment.id, amendment.title);

    Ok((
        StatusCode::CREATED,
        Json(AmendmentResponse {
            success: true,
            message: "Amendment created successfully".to_string(),
            data: amendment,
        }),
    ))
}

/// GET /amendments
///
/// All amendments, newest first.
pub async fn list_amendments(
    State(state): State<AppState>,
) -> ApiResult<Json<AmendmentListResponse>> {
    let amendments = db::list_amendments(&state.db).await?;

    Ok(Json(AmendmentListResponse {
        success: true,
        message: format!("Retrieved {} amendments", amendments.len()),
        amendments,
    }))
}

/// GET /amendments/:id
pub async fn get_amendment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<AmendmentResponse>> {
    let amendment = db::get_amendment(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Amendment {} not found", id)))?;

    Ok(Json(AmendmentResponse {
        success: true,
        message: "Amendment retrieved successfully".to_string(),
        data: amendment,
    }))
}

/// DELETE /amendments/:id
///
/// Cascades to every feedback row for the amendment.
pub async fn delete_amendment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeleteAmendmentResponse>> {
    let feedback_count = db::count_feedback(&state.db, id).await?;

    if !db::delete_amendment(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("Amendment {} not found", id)));
    }

    info!(
        "Deleted amendment {} and {} feedback entries",
        id, feedback_count
    );

    Ok(Json(DeleteAmendmentResponse {
        success: true,
        message: format!(
            "Amendment {} deleted along with {} feedback entries",
            id, feedback_count
        ),
    }))
}

/// Build amendment routes
pub fn amendment_routes() -> Router<AppState> {
    Router::new()
        .route("/amendments", get(list_amendments).post(create_amendment))
        .route(
            "/amendments/:id",
            get(get_amendment).delete(delete_amendment),
        )
}

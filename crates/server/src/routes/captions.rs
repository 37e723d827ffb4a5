use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;
use service::{captions::SetCaption, errors::ServiceError};
use tracing::{debug, error};

use crate::errors::ApiError;
use crate::observability::{
    CAPTION_READS_TOTAL, CAPTION_WRITES_TOTAL, STORAGE_ERRORS_TOTAL, VALIDATION_REJECTS_TOTAL,
};
use crate::routes::AppState;

pub const LOAD_FAILED: &str = "failed to load captions";
pub const SAVE_FAILED: &str = "failed to save captions";

/// List every stored caption as `{ key: caption }`.
#[utoipa::path(get, path = "/api/captions", tag = "captions", responses(
    (status = 200, description = "JSON object mapping caption key to caption"),
    (status = 500, description = "Storage failure", body = crate::openapi::ErrorResponse),
))]
pub async fn get_captions(
    State(state): State<AppState>,
) -> Result<Json<HashMap<String, String>>, ApiError> {
    let captions = state
        .captions
        .all()
        .await
        .map_err(|e| storage_failure(e, LOAD_FAILED))?;
    CAPTION_READS_TOTAL.inc();
    Ok(Json(captions))
}

/// Set (overwrite) the caption for one key.
#[utoipa::path(post, path = "/api/captions", tag = "captions",
    request_body = crate::openapi::SetCaptionRequest,
    responses(
        (status = 200, description = "Saved", body = crate::openapi::OkResponse),
        (status = 400, description = "Invalid key or body", body = crate::openapi::ErrorResponse),
        (status = 413, description = "Body too large", body = crate::openapi::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::openapi::ErrorResponse),
    )
)]
pub async fn set_caption(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    let entry = SetCaption::from_json(body).map_err(|e| match e {
        ServiceError::Validation(msg) => {
            VALIDATION_REJECTS_TOTAL.inc();
            debug!(reason = %msg, "caption write rejected");
            ApiError::bad_request(msg)
        }
        other => storage_failure(other, SAVE_FAILED),
    })?;

    let key_len = entry.key.len();
    let caption_len = entry.caption.chars().count();
    state
        .captions
        .set(entry)
        .await
        .map_err(|e| storage_failure(e, SAVE_FAILED))?;
    CAPTION_WRITES_TOTAL.inc();
    debug!(key_len, caption_len, "caption saved");
    Ok(Json(serde_json::json!({"ok": true})))
}

/// Log the cause for operators, answer with a generic message.
fn storage_failure(e: ServiceError, message: &'static str) -> ApiError {
    STORAGE_ERRORS_TOTAL.inc();
    error!(error = %e, "{message}");
    ApiError::internal(message)
}

//! `POST /api/submit`: validate, build one point, enqueue it.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::{json, Value};

use fatigue_core::error::FatigueError;
use fatigue_core::Submission;

use crate::api::ApiError;
use crate::app_state::AppState;

pub async fn submit(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body.map_err(|e| FatigueError::invalid(&["body"], e.body_text()))?;
    let submission = Submission::from_json(&body)?;

    let point = submission.to_point(state.host()).stamped_now();
    if let Err(e) = state.writer().write(&point) {
        tracing::warn!(error = %e, value = submission.value, "submission not enqueued");
        return Err(e.into());
    }

    tracing::debug!(value = submission.value, source = %submission.source(), "submission enqueued");
    Ok(Json(json!({ "success": true })))
}

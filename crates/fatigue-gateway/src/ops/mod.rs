//! Operational HTTP endpoints.
//!
//! - `/health` : liveness only, never touches the backend

use axum::{response::IntoResponse, Json};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

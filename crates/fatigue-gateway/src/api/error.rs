//! HTTP mapping for `FatigueError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use fatigue_core::error::FatigueError;

/// Response wrapper so core errors can leave a handler with `?`.
#[derive(Debug)]
pub struct ApiError(pub FatigueError);

impl From<FatigueError> for ApiError {
    fn from(e: FatigueError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code().as_str();
        let (status, detail) = match &self.0 {
            FatigueError::Validation(fields) => (StatusCode::UNPROCESSABLE_ENTITY, json!(fields)),
            other => (StatusCode::INTERNAL_SERVER_ERROR, json!(other.to_string())),
        };
        (status, Json(json!({ "error": code, "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_is_422_everything_else_500() {
        let res = ApiError(FatigueError::invalid(&["body", "value"], "bad")).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let res = ApiError(FatigueError::StorageWrite("down".into())).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

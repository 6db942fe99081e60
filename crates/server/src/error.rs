//! HTTP mapping for application errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use medquery_core::AppError;
use serde_json::json;

/// Response wrapper turning an [`AppError`] into a JSON error body.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            AppError::Llm(_) => (StatusCode::INTERNAL_SERVER_ERROR, "llm_error"),
            AppError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
            AppError::Http(_) => (StatusCode::BAD_GATEWAY, "http_error"),
            AppError::Prompt(_) => (StatusCode::INTERNAL_SERVER_ERROR, "prompt_error"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::debug!(error = %self.0, "Request rejected");
        }

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.0.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

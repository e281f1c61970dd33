use crate::error::LaunchpadError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

/// HTTP rendering of a `LaunchpadError`.
///
/// Every failure is reported as `{ "success": false, "error": msg, "code": code }`.
#[derive(Debug)]
pub struct ApiError(pub LaunchpadError);

impl From<LaunchpadError> for ApiError {
    fn from(e: LaunchpadError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            LaunchpadError::ValidationError(_)
            | LaunchpadError::InvalidSignature
            | LaunchpadError::OrderMismatch => StatusCode::BAD_REQUEST,
            LaunchpadError::NotFound => StatusCode::NOT_FOUND,
            LaunchpadError::AlreadyFinalized(_) | LaunchpadError::Duplicate(_) => {
                StatusCode::CONFLICT
            }
            LaunchpadError::GatewayError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            LaunchpadError::ValidationError(msg) => msg.clone(),
            LaunchpadError::ConfigurationError(_) => {
                error!(error = %self.0, "request failed");
                self.0.to_string()
            }
            LaunchpadError::GatewayError(detail) => {
                error!(error = %detail, "payment gateway call failed");
                "Payment gateway unavailable".to_string()
            }
            e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                error!(error = %e, "internal error");
                "Internal server error".to_string()
            }
            e => e.to_string(),
        };
        let body = json!({ "success": false, "error": message, "code": self.0.code() });
        (status, Json(body)).into_response()
    }
}

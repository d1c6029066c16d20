// Application error type and its conversion into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::marketplace_api::ApiError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Local, synchronous field validation failure. Blocks the request
    /// before any backend call is made.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// The backend returned a non-200 envelope or the request failed in
    /// transit. Carries the server-provided message or a fallback string.
    #[error("{0}")]
    Upstream(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<ApiError> for AppError {
    fn from(error: ApiError) -> Self {
        match error {
            // An upstream 404 means the id does not exist; every other
            // envelope code is a failed request
            ApiError::Upstream { code: 404, message } => AppError::NotFound(message),
            ApiError::Upstream { message, .. } => AppError::Upstream(message),
            ApiError::Network(e) => {
                AppError::Upstream(format!("Could not reach the server: {}", e))
            }
            ApiError::Decode(e) => AppError::Internal(e),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client. Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Internal(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Unauthorized(message) => {
                tracing::warn!("Unauthorized request: {}", message);
            }
            AppError::Upstream(message) => {
                tracing::warn!("Backend request failed: {}", message);
            }
            AppError::Internal(e) => {
                tracing::error!("Internal server error: {:?}", e);
            }
            _ => {}
        }

        let body = Json(json!({ "success": false, "error": self.public_message() }));
        (self.status_code(), body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(code: u16, message: &str) -> ApiError {
        ApiError::Upstream {
            code,
            message: message.to_string(),
        }
    }

    #[test]
    fn upstream_404_becomes_not_found() {
        let error = AppError::from(upstream(404, "No such car"));
        assert!(matches!(error, AppError::NotFound(_)));
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn other_upstream_codes_stay_bad_gateway() {
        for code in [400, 401, 500, 503] {
            let error = AppError::from(upstream(code, "boom"));
            assert!(matches!(error, AppError::Upstream(_)), "code {}", code);
            assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
        }
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let error = AppError::Internal(anyhow::anyhow!("pool exhausted at worker 3"));
        assert_eq!(error.public_message(), "Internal Server Error");
    }
}

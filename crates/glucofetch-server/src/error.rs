//! Server error types and their HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use glucofetch_provider::ProviderError;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while serving a request.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A vendor operation failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Writing the readings file failed.
    #[error("failed to write readings: {0}")]
    Sink(#[from] std::io::Error),
}

impl ServerError {
    /// The HTTP status to answer with: the vendor's originating status where
    /// one exists, 500 for transport-level and local failures.
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Provider(err) => err
                .status()
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Sink(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

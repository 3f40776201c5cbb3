//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Errors surfaced to HTTP clients as plain text.
#[derive(Debug, Error)]
pub enum ApiError {
    /// `amount` query parameter is not a finite number.
    #[error("Invalid amount")]
    InvalidAmount(String),

    /// No bearer token on a protected route.
    #[error("Unauthorized")]
    Unauthorized,

    /// Anything outside the resolver's own contract.
    #[error("Error getting exchange rate")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            error!(error = %detail, "Error getting exchange rate");
        }
        (self.status(), self.to_string()).into_response()
    }
}

//! Bearer-token presence check.
//!
//! This is a placeholder gate: it only checks that an `Authorization: Bearer`
//! header carries something. Tokens are not verified.

use axum::extract::Request;
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::error::ApiError;

/// Whether the request carries a non-empty bearer token.
pub fn validate_api_request(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| !token.trim().is_empty())
        .unwrap_or(false)
}

/// Middleware rejecting requests without a bearer token.
pub async fn require_bearer(request: Request, next: Next) -> Result<Response, ApiError> {
    if !validate_api_request(request.headers()) {
        debug!(path = %request.uri().path(), "Rejected request without bearer token");
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(auth: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        headers
    }

    #[test]
    fn test_validate_api_request() {
        assert!(validate_api_request(&headers_with("Bearer abc.def")));
        assert!(!validate_api_request(&headers_with("Bearer ")));
        assert!(!validate_api_request(&headers_with("Basic dXNlcjpwYXNz")));
        assert!(!validate_api_request(&HeaderMap::new()));
    }
}

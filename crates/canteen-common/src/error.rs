//! Shared HTTP error taxonomy (spec.md §7).
//!
//! Every service maps its internal failures onto this enum at the HTTP
//! boundary so the client-visible shape (`{"detail": "..."}`, plus
//! `Retry-After` on 429) is identical across the platform.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("rate limit exceeded")]
    RateLimited { retry_after_secs: u64 },

    #[error("upstream timed out")]
    UpstreamTimeout,

    #[error("upstream unavailable")]
    UpstreamUnavailable,

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_seconds: Option<u64>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Human-readable detail. 5xx variants are sanitized: no internal error
    /// text, no stack traces (spec.md §7 propagation policy).
    fn detail(&self) -> String {
        match self {
            ApiError::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(err) = &self {
            tracing::error!(error = %err, "internal error surfaced at HTTP boundary");
        }

        let status = self.status();
        let retry_after_seconds = match &self {
            ApiError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };
        let body = ErrorBody {
            detail: self.detail(),
            retry_after_seconds,
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = retry_after_seconds
            && let Ok(value) = HeaderValue::from_str(&secs.to_string())
        {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        response
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_conflict_to_409() {
        let err = ApiError::Conflict("out of stock".into());
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_errors_are_sanitized() {
        let err = ApiError::Internal(anyhow::anyhow!("leaked connection string: postgres://x"));
        assert_eq!(err.detail(), "internal server error");
    }

    #[test]
    fn rate_limited_carries_retry_after() {
        let err = ApiError::RateLimited {
            retry_after_secs: 60,
        };
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}

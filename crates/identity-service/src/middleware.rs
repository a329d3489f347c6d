//! Sliding-window rate limiting middleware for `POST /auth/login`
//! (spec.md §4.D, §9 "Body re-presentation").
//!
//! The limiter key is the `student_id` from the JSON body; the body must be
//! buffered once and re-presented downstream so the login handler can still
//! deserialize it — we never read the socket twice.

use axum::body::{Body, to_bytes};
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use canteen_common::ApiError;
use serde::Deserialize;
use std::sync::Arc;

use crate::rate_limit::RateLimitDecision;
use crate::state::AppState;

const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Deserialize)]
struct StudentIdPeek {
    student_id: Option<String>,
}

pub async fn login_rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|err| ApiError::Validation(format!("failed to read request body: {err}")))?;

    let tracking_key = serde_json::from_slice::<StudentIdPeek>(&bytes)
        .ok()
        .and_then(|peek| peek.student_id)
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| peer_address_fallback(&parts));

    match state.rate_limiter.check_and_record(&tracking_key).await {
        Ok(RateLimitDecision::Allowed) => {}
        Ok(RateLimitDecision::Denied { retry_after_secs }) => {
            return Err(ApiError::RateLimited {
                retry_after_secs,
            });
        }
        Err(err) => return Err(ApiError::Internal(err)),
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(request).await)
}

fn peer_address_fallback(parts: &axum::http::request::Parts) -> String {
    parts
        .extensions
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|info| info.0.to_string())
        .unwrap_or_else(|| "unknown-peer".to_string())
}

//! Idempotency Cache (spec.md §4.E). Fingerprint -> {status, body}, 24h
//! TTL, captured only on non-5xx responses.
//!
//! The replay check is layered as middleware *outside* (before) bearer
//! auth (spec.md §4.F, §4.E: "skip all downstream logic, no auth check"),
//! so a cached replay never requires a valid token.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use canteen_common::ApiError;
use canteen_common::redis_client::RedisHandle;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;

const KEY_PREFIX: &str = "idempotent:";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResponse {
    pub status_code: u16,
    pub body: serde_json::Value,
}

/// The fingerprint the replay middleware resolved for this request, carried
/// to the handler so it stores the eventual response under the same key.
#[derive(Debug, Clone)]
pub struct Fingerprint(pub String);

#[derive(Clone)]
pub struct IdempotencyCache {
    redis: RedisHandle,
    ttl_secs: u64,
}

impl IdempotencyCache {
    pub fn new(redis: RedisHandle, ttl_secs: u64) -> Self {
        Self { redis, ttl_secs }
    }

    pub async fn lookup(&self, fingerprint: &str) -> Result<Option<CachedResponse>> {
        let key = format!("{KEY_PREFIX}{fingerprint}");
        let raw = self.redis.get_string(&key).await.context("idempotency lookup failed")?;
        match raw {
            Some(raw) => {
                let cached: CachedResponse =
                    serde_json::from_str(&raw).context("malformed cached idempotency entry")?;
                Ok(Some(cached))
            }
            None => Ok(None),
        }
    }

    /// Only called for responses with `status_code < 500` (spec.md §4.E).
    pub async fn store(&self, fingerprint: &str, status_code: u16, body: serde_json::Value) -> Result<()> {
        debug_assert!(status_code < 500, "5xx responses must not be cached");
        let key = format!("{KEY_PREFIX}{fingerprint}");
        let entry = CachedResponse { status_code, body };
        let serialized = serde_json::to_string(&entry).context("failed to serialize idempotency entry")?;
        self.redis.set_ex(&key, &serialized, self.ttl_secs).await
    }
}

pub fn replay_response(cached: CachedResponse) -> Response {
    let status = StatusCode::from_u16(cached.status_code).unwrap_or(StatusCode::OK);
    let mut response = (status, axum::Json(cached.body)).into_response();
    response
        .headers_mut()
        .insert("X-Idempotency-Replay", HeaderValue::from_static("true"));
    response
}

/// Looks up the replay cache for `POST /orders` before auth runs at all.
/// On a cache hit, short-circuits straight to the cached response. On a
/// miss, resolves the fingerprint once (header, falling back to the
/// request body's `order_id`) and hands it to the handler via an
/// extension so the two agree on the same cache key.
pub async fn idempotency_replay(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if request.method() != Method::POST || request.uri().path() != "/orders" {
        return Ok(next.run(request).await);
    }

    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|err| ApiError::Validation(format!("failed to read request body: {err}")))?;

    let order_id_from_body = serde_json::from_slice::<serde_json::Value>(&bytes)
        .ok()
        .and_then(|v| v.get("order_id").and_then(|id| id.as_str()).map(str::to_string))
        .and_then(|s| Uuid::parse_str(&s).ok());

    let fingerprint = parts
        .headers
        .get("Idempotency-Key")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| order_id_from_body.unwrap_or_else(Uuid::new_v4).to_string());

    if let Some(cached) = state.idempotency.lookup(&fingerprint).await.map_err(ApiError::Internal)? {
        return Ok(replay_response(cached));
    }

    let mut request = Request::from_parts(parts, Body::from(bytes));
    request.extensions_mut().insert(Fingerprint(fingerprint));

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_response_round_trips_through_json() {
        let entry = CachedResponse {
            status_code: 202,
            body: serde_json::json!({"order_id": "pre-cached-order", "status": "queued"}),
        };
        let serialized = serde_json::to_string(&entry).unwrap();
        let parsed: CachedResponse = serde_json::from_str(&serialized).unwrap();
        assert_eq!(parsed.status_code, 202);
        assert_eq!(parsed.body["order_id"], "pre-cached-order");
    }

    #[test]
    fn replay_carries_cached_status_and_replay_header() {
        let cached = CachedResponse {
            status_code: 202,
            body: serde_json::json!({"order_id": "pre-cached-order", "status": "queued"}),
        };
        let response = replay_response(cached);
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(
            response.headers().get("X-Idempotency-Replay").unwrap(),
            "true"
        );
    }
}

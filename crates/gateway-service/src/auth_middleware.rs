//! Bearer-token verification (spec.md §4.F, §4.J). Public paths and
//! `OPTIONS` requests bypass auth; everything else needs a valid,
//! non-expired access token.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use canteen_common::{ApiError, TokenType};

use crate::state::AppState;

const PUBLIC_PATHS: &[&str] = &["/", "/health", "/metrics"];

#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal {
    pub user_id: String,
    pub principal_id: String,
    pub is_admin: bool,
}

pub async fn require_bearer_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if request.method() == Method::OPTIONS || PUBLIC_PATHS.contains(&request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let header = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing Authorization header".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Authorization header must be a bearer token".to_string()))?;

    let claims = state
        .tokens
        .decode_expecting(token, TokenType::Access)
        .map_err(|_| ApiError::Unauthorized("invalid or expired access token".to_string()))?;

    let principal = AuthenticatedPrincipal {
        user_id: claims.sub,
        principal_id: claims.principal_id.unwrap_or_default(),
        is_admin: claims.is_admin.unwrap_or(false),
    };
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

//! `/auth/*` handlers (spec.md §4.J, §6).
//!
//! Login and refresh are the only endpoints the spec's external interface
//! names; register and change-password are carried along as thin
//! passthroughs so the login/refresh pair has users and hashes to work
//! against in the end-to-end scenarios (SPEC_FULL.md §2).

use std::sync::Arc;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng};
use argon2::Argon2;
use axum::extract::State;
use axum::Json;
use canteen_common::{ApiError, ApiResult, TokenType};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub student_id: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub student_id: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub student_id: String,
    pub email: String,
    pub full_name: String,
    pub is_admin: bool,
}

impl From<db::User> for UserResponse {
    fn from(user: db::User) -> Self {
        Self {
            id: user.id.to_string(),
            student_id: user.student_id,
            email: user.email,
            full_name: user.full_name,
            is_admin: user.is_admin,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub student_id: String,
    pub old_password: String,
    pub new_password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenPair>> {
    let user = db::find_by_student_id(&state.db, &req.student_id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::Unauthorized("invalid student id or password".to_string()))?;

    if !user.is_active {
        return Err(ApiError::Forbidden("account is disabled".to_string()));
    }

    verify_password(&req.password, &user.hashed_password)?;

    let access_token = state
        .tokens
        .issue_access_token(&user.id.to_string(), &user.student_id, user.is_admin)
        .map_err(ApiError::Internal)?;
    let refresh_token = state
        .tokens
        .issue_refresh_token(&user.id.to_string())
        .map_err(ApiError::Internal)?;

    Ok(Json(TokenPair {
        access_token,
        refresh_token,
        token_type: "bearer",
    }))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<AccessTokenResponse>> {
    let claims = state
        .tokens
        .decode_expecting(&req.refresh_token, TokenType::Refresh)
        .map_err(|_| ApiError::Unauthorized("invalid or expired refresh token".to_string()))?;

    let user_id = uuid::Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::Unauthorized("malformed token subject".to_string()))?;
    let user = db::find_by_id(&state.db, user_id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::Unauthorized("account no longer exists".to_string()))?;

    if !user.is_active {
        return Err(ApiError::Forbidden("account is disabled".to_string()));
    }

    let access_token = state
        .tokens
        .issue_access_token(&user.id.to_string(), &user.student_id, user.is_admin)
        .map_err(ApiError::Internal)?;

    Ok(Json(AccessTokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<UserResponse>> {
    if db::find_by_student_id(&state.db, &req.student_id)
        .await
        .map_err(ApiError::Internal)?
        .is_some()
    {
        return Err(ApiError::Conflict("student id already registered".to_string()));
    }

    let hashed = hash_password(&req.password)?;
    let user = db::insert_user(&state.db, &req.student_id, &req.email, &req.full_name, &hashed, false)
        .await
        .map_err(ApiError::Internal)?;

    Ok(Json(user.into()))
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<()> {
    let user = db::find_by_student_id(&state.db, &req.student_id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::Unauthorized("invalid student id or password".to_string()))?;

    verify_password(&req.old_password, &user.hashed_password)?;
    let hashed = hash_password(&req.new_password)?;
    db::update_password(&state.db, user.id, &hashed)
        .await
        .map_err(ApiError::Internal)?;
    Ok(())
}

fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| ApiError::Internal(anyhow::anyhow!("password hashing failed: {err}")))
}

fn verify_password(password: &str, hashed: &str) -> ApiResult<()> {
    let parsed = PasswordHash::new(hashed)
        .map_err(|err| ApiError::Internal(anyhow::anyhow!("stored hash is malformed: {err}")))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| ApiError::Unauthorized("invalid student id or password".to_string()))
}

//! Token Authority primitives (spec.md §4.J).
//!
//! Shared between identity-service (issues tokens) and gateway-service
//! (verifies them) so both sides agree on claim shape and validation rules
//! without a network round-trip — stateless, no revocation list, per the
//! spec's accepted limitation.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 30;
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub jti: String,
    /// Present on access tokens only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

#[derive(Clone)]
pub struct TokenAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenAuthority {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm: Algorithm::HS256,
        }
    }

    pub fn issue_access_token(&self, user_id: &str, principal_id: &str, is_admin: bool) -> Result<String> {
        let exp = Utc::now() + Duration::minutes(ACCESS_TOKEN_TTL_MINUTES);
        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp.timestamp() as usize,
            token_type: TokenType::Access,
            jti: Uuid::new_v4().to_string(),
            principal_id: Some(principal_id.to_string()),
            is_admin: Some(is_admin),
        };
        self.encode(&claims)
    }

    pub fn issue_refresh_token(&self, user_id: &str) -> Result<String> {
        let exp = Utc::now() + Duration::days(REFRESH_TOKEN_TTL_DAYS);
        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp.timestamp() as usize,
            token_type: TokenType::Refresh,
            jti: Uuid::new_v4().to_string(),
            principal_id: None,
            is_admin: None,
        };
        self.encode(&claims)
    }

    fn encode(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key).context("failed to sign token")
    }

    /// Decode and validate signature + expiry. Does not check `type` —
    /// callers must check `claims.token_type` matches the expected context
    /// (spec.md §4.J: "refresh endpoint rejects access tokens").
    pub fn decode(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(self.algorithm);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .context("invalid or expired token")?;
        Ok(data.claims)
    }

    pub fn decode_expecting(&self, token: &str, expected: TokenType) -> Result<Claims> {
        let claims = self.decode(token)?;
        if claims.token_type != expected {
            anyhow::bail!("wrong token type");
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_access_token() {
        let authority = TokenAuthority::new("test-secret");
        let token = authority
            .issue_access_token("user-1", "STUDENT-1", false)
            .unwrap();
        let claims = authority
            .decode_expecting(&token, TokenType::Access)
            .unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.principal_id.as_deref(), Some("STUDENT-1"));
    }

    #[test]
    fn refresh_endpoint_rejects_access_tokens() {
        let authority = TokenAuthority::new("test-secret");
        let token = authority
            .issue_access_token("user-1", "STUDENT-1", false)
            .unwrap();
        let err = authority.decode_expecting(&token, TokenType::Refresh);
        assert!(err.is_err());
    }

    #[test]
    fn rejects_token_signed_with_different_secret() {
        let a = TokenAuthority::new("secret-a");
        let b = TokenAuthority::new("secret-b");
        let token = a.issue_refresh_token("user-1").unwrap();
        assert!(b.decode(&token).is_err());
    }
}

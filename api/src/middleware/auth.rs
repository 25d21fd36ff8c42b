//! Bearer token authentication

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use formcraft_forms::OwnerId;

use crate::error::ApiError;
use crate::ApiState;

/// Lifetime of issued tokens
pub const TOKEN_TTL_HOURS: i64 = 8;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Owner id
    pub sub: String,
    pub exp: usize,
}

/// HS256 signing material
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn create_token(&self, owner: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let expiration = chrono::Utc::now() + chrono::Duration::hours(TOKEN_TTL_HOURS);
        let claims = Claims {
            sub: owner.to_string(),
            exp: expiration.timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(token_data.claims)
    }
}

/// The authenticated form owner
#[derive(Debug, Clone)]
pub struct AuthUser(pub OwnerId);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<ApiState>) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?;

        let claims = state.keys.verify_token(token.trim()).map_err(|e| {
            debug!(error = %e, "rejected bearer token");
            ApiError::Unauthorized
        })?;
        if claims.sub.is_empty() {
            return Err(ApiError::Unauthorized);
        }
        Ok(AuthUser(OwnerId::new(claims.sub)))
    }
}

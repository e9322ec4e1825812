use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

/// Minimal claims set carried by every bearer token: identity plus role.
/// Nothing else from the submitted user object is embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(email: &str, role: Option<&str>, ttl_secs: i64) -> Self {
        let now = Utc::now();
        Self {
            email: email.to_string(),
            role: role.map(str::to_string),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Expired, malformed, and badly signed tokens all collapse into this
    /// one variant so callers cannot probe validation internals.
    #[error("invalid or expired token")]
    InvalidToken,

    #[error("token generation failed: {0}")]
    TokenGeneration(String),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Issues and verifies signed bearer tokens with a fixed, configured
/// secret. The secret comes from configuration so tokens survive restarts
/// and are valid across instances.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(security: &SecurityConfig) -> Self {
        Self {
            secret: security.jwt_secret.clone(),
            ttl_secs: security.token_ttl_secs,
        }
    }

    /// Sign a token asserting `{email, role}` for the configured TTL.
    pub fn issue(&self, email: &str, role: Option<&str>) -> Result<String, AuthError> {
        let claims = Claims::new(email, role, self.ttl_secs);
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Check signature and expiry; returns the embedded claims on success.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken)
    }
}

/// One-way salted hash for storage comparison only. bcrypt salts per call,
/// so repeated hashes of the same input differ.
pub fn hash_password(plain: &str) -> Result<String, AuthError> {
    bcrypt::hash(plain, bcrypt::DEFAULT_COST).map_err(|e| AuthError::Hash(e.to_string()))
}

pub fn verify_password(plain: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(plain, hash).map_err(|e| AuthError::Hash(e.to_string()))
}

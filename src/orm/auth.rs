//! Password hashing and session-token management.
//!
//! Passwords are stored as salted Argon2 hashes. Session tokens are signed
//! JWTs carrying the user's id and email with a fixed 24-hour expiry; the
//! live token for each user is persisted on the user row, so a fresh login
//! replaces any earlier session regardless of its embedded expiry.

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Signing configuration for session tokens. Built once at startup from the
/// environment and handed to Rocket as managed state; there is no implicit
/// global secret.
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        AuthConfig {
            jwt_secret: jwt_secret.into(),
        }
    }
}

pub const SESSION_TTL_HOURS: i64 = 24;

/// Claims embedded in a session token.
#[derive(Serialize, Deserialize, Debug)]
pub struct SessionClaims {
    /// User id.
    pub sub: i32,
    pub email: String,
    /// Expiry as a Unix timestamp in seconds.
    pub exp: i64,
}

/// Hashes a password using Argon2 with a random salt.
pub fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .expect("Hashing should succeed")
        .to_string()
}

/// Verifies a password against a stored Argon2 hash. An unparseable hash
/// counts as a mismatch rather than an error.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Mints a signed session token for the given user.
pub fn mint_session_token(
    config: &AuthConfig,
    user_id: i32,
    email: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = SessionClaims {
        sub: user_id,
        email: email.to_string(),
        exp: (Utc::now() + Duration::hours(SESSION_TTL_HOURS)).timestamp(),
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
}

/// Decodes and verifies a session token's signature and expiry.
///
/// Authentication itself matches the presented token against the stored
/// `session_token` column; this is the supporting primitive for inspecting
/// a token's embedded claims.
pub fn decode_session_token(
    config: &AuthConfig,
    token: &str,
) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let data = jsonwebtoken::decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/**
 * Session Tokens
 *
 * Bearer JWT verification (HS256). Tokens are issued by the account service;
 * `create_token` mirrors its claim layout for tooling and tests.
 */

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Token lifetime issued by `create_token`
const TOKEN_LIFETIME_SECS: u64 = 30 * 24 * 60 * 60;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Email
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid token: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid subject in token: {0}")]
    InvalidSubject(String),

    #[error("System clock is before the Unix epoch")]
    Clock,
}

/// Create a JWT token for a user
pub fn create_token(user_id: Uuid, email: &str, secret: &str) -> Result<String, TokenError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| TokenError::Clock)?
        .as_secs();

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: now + TOKEN_LIFETIME_SECS,
        iat: now,
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    Ok(encode(&Header::default(), &claims, &key)?)
}

/// Verify and decode a JWT token
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &key, &Validation::default())?;
    Ok(token_data.claims)
}

/// Verify a token and parse its subject into a user id
pub fn user_id_from_token(token: &str, secret: &str) -> Result<(Uuid, Claims), TokenError> {
    let claims = verify_token(token, secret)?;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| TokenError::InvalidSubject(claims.sub.clone()))?;
    Ok((user_id, claims))
}

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ISSUER: &str = "merchant-api";

/// Claim set embedded in every issued token. Self-contained: verification
/// needs only the signing secret and the clock, never external state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub admin_id: i32,
    pub merchant_id: i32,
    pub username: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("signing key is not configured")]
    MissingSecret,
    #[error("failed to sign token: {0}")]
    Signing(String),
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
}

/// Issue a signed HS256 token valid for `ttl_secs` from now.
pub fn issue(
    admin_id: i32,
    merchant_id: i32,
    username: &str,
    role: &str,
    secret: &str,
    ttl_secs: u64,
) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let now = Utc::now();
    let claims = Claims {
        admin_id,
        merchant_id,
        username: username.to_string(),
        role: role.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl_secs as i64)).timestamp(),
        iss: ISSUER.to_string(),
    };

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| TokenError::Signing(e.to_string()))
}

/// Verify a token and return its claims. Distinguishes a bad signature, an
/// expired token, and an undecodable one so callers can report each.
pub fn verify(token: &str, secret: &str) -> Result<Claims, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(data) => Ok(data.claims),
        Err(e) => match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(TokenError::Expired),
            jsonwebtoken::errors::ErrorKind::InvalidSignature => Err(TokenError::InvalidSignature),
            _ => Err(TokenError::Malformed),
        },
    }
}

//! Access token decoding
//!
//! The client never holds the signing secret, so tokens are decoded without
//! signature verification. The payload is still the only source of identity:
//! a token that fails to decode or whose `exp` has passed means "no session".

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Payload embedded in access tokens issued by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub name: String,
    pub email: String,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: u64,
}

/// The signed-in user, derived from token claims
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token decoding failed: {0}")]
    DecodeError(#[from] jsonwebtoken::errors::Error),

    #[error("Token has expired")]
    TokenExpired,
}

impl Claims {
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.exp <= now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(unix_now())
    }

    pub fn identity(&self) -> Identity {
        Identity {
            id: self.user_id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Decode token claims without checking the signature or expiry
pub fn decode_claims(token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(token_data.claims)
}

/// Decode token claims and reject tokens whose expiry has passed
pub fn decode_unexpired(token: &str) -> Result<Claims, AuthError> {
    let claims = decode_claims(token)?;

    if claims.is_expired() {
        return Err(AuthError::TokenExpired);
    }

    Ok(claims)
}

/// Current wall-clock time as a Unix timestamp in seconds
pub fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

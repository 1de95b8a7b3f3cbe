use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{config::AppConfig, models::Role};

/// Claims
///
/// Payload of a session token. Signed with the server secret; the signature makes every
/// field tamper-evident.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user's UUID.
    pub sub: Uuid,
    /// The role the user held when the token was minted.
    pub role: Role,
    /// Issued At (iat), seconds since the epoch.
    pub iat: usize,
    /// Expiration Time (exp), seconds since the epoch.
    pub exp: usize,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signing key is not configured")]
    MissingSigningKey,

    #[error("token lifetime must be positive, got {0} hours")]
    InvalidLifetime(i64),

    #[error("failed to sign token: {0}")]
    Sign(jsonwebtoken::errors::Error),

    #[error("token rejected: {0}")]
    Invalid(jsonwebtoken::errors::Error),
}

/// TokenIssuer
///
/// Mints HS256 session tokens with a fixed lifetime. Pure: no storage or network access.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, TokenError> {
        if secret.trim().is_empty() {
            return Err(TokenError::MissingSigningKey);
        }
        if ttl <= Duration::zero() {
            return Err(TokenError::InvalidLifetime(ttl.num_hours()));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, TokenError> {
        let ttl = Duration::try_hours(config.jwt_ttl_hours)
            .ok_or(TokenError::InvalidLifetime(config.jwt_ttl_hours))?;
        Self::new(&config.jwt_secret, ttl)
    }

    pub fn issue(&self, user_id: Uuid, role: Role) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            role,
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(TokenError::Sign)
    }

    /// Decodes `token`, checking signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::models::Identity;

/// Claims carried by an issued token: the subject (username), issue time and
/// expiry. Expiry is enforced by [`validate`], not at decode time, so that an
/// expired token is an ordinary validation failure rather than a decode error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("malformed credential: {0}")]
    Malformed(String),
    #[error("token signing failed: {0}")]
    Signing(String),
    #[error("JWT secret is not configured")]
    MissingSecret,
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Issues and decodes signed bearer tokens. The symmetric HS256 key is the
/// only shared secret; every instance validating tokens must hold the same
/// key.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    validation: Validation,
}

impl TokenCodec {
    pub fn from_secret(secret: &str, ttl_hours: i64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }

        // Expiry is checked separately against the loaded identity, so the
        // decoder must not reject expired-but-well-signed tokens.
        let mut validation = Validation::default();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
            validation,
        })
    }

    /// Produce a signed token for `username`, valid from now until now + TTL.
    pub fn issue(&self, username: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Parse and verify the signature. Fails on bad structure or signature;
    /// does NOT fail on expiry.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::Malformed(e.to_string()))
    }

    /// Seconds until a freshly issued token expires, for login responses.
    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }
}

/// Credential validator: a presented token is good for `identity` iff the
/// subject matches the identity's username and the token has not expired.
/// Pure function of claims + identity; no I/O.
pub fn validate(claims: &Claims, identity: &Identity) -> bool {
    claims.sub == identity.username && Utc::now().timestamp() < claims.exp
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| AuthError::Hashing(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| AuthError::Hashing(e.to_string()))
}

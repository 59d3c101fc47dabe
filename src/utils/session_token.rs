// src/utils/session_token.rs

use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Signed session state handed to the taker at start and re-asserted on submit.
/// Only the server can mint one, so `started_at` and `deadline` are trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Session id; doubles as the finalize idempotency key.
    pub sid: Uuid,
    pub quiz_id: Uuid,
    pub link: String,
    pub taker_id: String,
    pub taker_name: String,
    pub authenticated: bool,
    /// Unix seconds.
    pub started_at: i64,
    pub deadline: Option<i64>,
    /// Presentation-order seed.
    pub seed: u64,
    pub exp: usize,
}

impl SessionClaims {
    pub fn started_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.started_at, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline.and_then(|d| DateTime::from_timestamp(d, 0))
    }
}

pub fn sign_session(claims: &SessionClaims, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

pub fn verify_session(token: &str, secret: &str) -> Result<SessionClaims, AppError> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::BadRequest("Session token has expired".to_string())
        }
        _ => AppError::BadRequest("Invalid session token".to_string()),
    })
}

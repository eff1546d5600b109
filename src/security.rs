// ==============================================================================
// security.rs - Bearer Token Issuance & Verification (JWT)
// ==============================================================================
// Description: HMAC-signed JWT issuing and allow-listed verification
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// Security: Algorithm allow-list enforced on every verification (no alg=none,
//           no algorithm substitution); rejection reasons never sent to clients
// ==============================================================================

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{
    errors::{Error as JwtError, ErrorKind},
    DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::warn;

use crate::config::AuthConfig;
use crate::models::ErrorResponse;

// ==============================================================================
// CLAIMS
// ==============================================================================

/// Claims carried by verified tokens and attached to authenticated requests.
///
/// Only `exp` matters for verification. Every other claim in the payload is
/// kept, so tokens from other issuers are attached unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Set on tokens issued by this service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Issued at (unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Expiration (unix timestamp); tokens without it never expire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Any further claims, preserved as sent
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    pub fn for_user(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

/// Reasons a bearer credential is refused.
///
/// The variant is only logged; every variant produces the same generic
/// 401 response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer credential")]
    MissingCredential,

    #[error("malformed bearer credential")]
    Malformed,

    #[error("credential signed with an algorithm outside the allow-list")]
    DisallowedAlgorithm,

    #[error("credential signature does not verify")]
    InvalidSignature,

    #[error("credential expired")]
    Expired,

    #[error("credential rejected: {0}")]
    Rejected(String),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err.kind() {
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                AuthError::DisallowedAlgorithm
            }
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => AuthError::Malformed,
            _ => AuthError::Rejected(err.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        warn!(reason = %self, "Bearer credential rejected");

        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Bearer")],
            Json(ErrorResponse::new("Unauthorized")),
        )
            .into_response()
    }
}

// ==============================================================================
// ISSUING
// ==============================================================================

/// Signs tokens with the shared secret using the primary allowed algorithm
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    header: Header,
    ttl_secs: Option<u64>,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret().as_bytes()),
            header: Header::new(config.primary_algorithm()),
            ttl_secs: config.token_ttl_secs(),
        }
    }

    /// Issue a signed token for `username`
    pub fn issue(&self, username: &str) -> Result<String, JwtError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iat: Some(now),
            exp: self
                .ttl_secs
                .map(|ttl| now.saturating_add(i64::try_from(ttl).unwrap_or(i64::MAX))),
            ..Claims::for_user(username)
        };

        jsonwebtoken::encode(&self.header, &claims, &self.encoding_key)
    }
}

// ==============================================================================
// VERIFICATION
// ==============================================================================

/// Verifies bearer tokens against the shared secret and algorithm allow-list
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(config.primary_algorithm());
        validation.algorithms = config.algorithms().to_vec();
        // `exp` is checked when present but not demanded
        validation.required_spec_claims = HashSet::new();
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(config.secret().as_bytes()),
            validation,
        }
    }

    /// Verify signature, algorithm and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

// ==============================================================================
// TESTS
// ==============================================================================

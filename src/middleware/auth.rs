// ==============================================================================
// middleware/auth.rs - Bearer Token Authentication Middleware
// ==============================================================================
// Description: Verify Authorization: Bearer JWTs and expose their claims
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================
//
// Security: Protected routes carry `require_bearer` as a route layer. The
// token must be HMAC-signed with the shared secret using an allow-listed
// algorithm (HS256) and, if it carries `exp`, must not be expired. Any
// failure is answered with a generic 401 before the handler runs; the
// concrete reason is only logged.
//
// ==============================================================================

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejection,
    TypedHeader,
};
use std::sync::Arc;
use tracing::debug;

use crate::security::{AuthError, Claims, TokenVerifier};

/// Middleware that requires a valid bearer token.
///
/// On success the decoded [`Claims`] are stored in request extensions.
pub async fn require_bearer(
    State(verifier): State<Arc<TokenVerifier>>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let TypedHeader(Authorization(bearer)) = bearer.map_err(|rejection| {
        if rejection.is_missing() {
            AuthError::MissingCredential
        } else {
            AuthError::Malformed
        }
    })?;

    let claims = verifier.verify(bearer.token())?;
    debug!(username = ?claims.username, "Bearer credential accepted");

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Authenticated user extracted from verified token claims
///
/// Only available behind [`require_bearer`]; elsewhere the request is
/// rejected with 401 Unauthorized.
///
/// # Example
/// ```rust,ignore
/// async fn my_handler(AuthUser(claims): AuthUser) -> impl IntoResponse {
///     format!("Hello, {}!", claims.username.unwrap_or_default())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or(AuthError::MissingCredential)
    }
}

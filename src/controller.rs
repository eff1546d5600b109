// ==============================================================================
// controller.rs - Auth Controller
// ==============================================================================
// Description: Login credential check, token issuance and protected example action
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================
//
// The route layer only depends on the `AuthController` trait. The built-in
// `StaticCredentials` controller accepts one configured username/password
// pair; swap it for a real user-backed implementation without touching the
// route table or middleware.
//
// ==============================================================================

use async_trait::async_trait;
use rand::Rng;
use tracing::{info, warn};

use crate::config::LoginCredentials;
use crate::error::AppError;
use crate::models::{LoginRequest, LoginResponse, RandomNumberResponse};
use crate::security::{Claims, TokenIssuer};

#[async_trait]
pub trait AuthController: Send + Sync {
    /// Check credentials and issue a bearer token
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError>;

    /// Protected example action; `claims` come from a verified token
    async fn random_number(&self, claims: Claims) -> RandomNumberResponse;
}

/// Controller accepting a single configured credential pair
pub struct StaticCredentials {
    credentials: LoginCredentials,
    issuer: TokenIssuer,
}

impl StaticCredentials {
    pub fn new(credentials: LoginCredentials, issuer: TokenIssuer) -> Self {
        Self {
            credentials,
            issuer,
        }
    }
}

#[async_trait]
impl AuthController for StaticCredentials {
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        if request.username != self.credentials.username
            || request.password != self.credentials.password
        {
            warn!(username = %request.username, "Login rejected: invalid credentials");
            return Err(AppError::InvalidCredentials);
        }

        let token = self
            .issuer
            .issue(&request.username)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))?;

        info!(username = %request.username, "Issued bearer token");

        Ok(LoginResponse {
            token,
            username: request.username,
        })
    }

    async fn random_number(&self, claims: Claims) -> RandomNumberResponse {
        let num = rand::thread_rng().gen_range(0.0..100.0);
        RandomNumberResponse { user: claims, num }
    }
}

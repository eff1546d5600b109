// ==============================================================================
// state.rs - Application State Management
// ==============================================================================
// Description: Shared, read-only application state for the API gateway
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::{AuthConfig, Config, LoginCredentials};
use crate::controller::{AuthController, StaticCredentials};
use crate::schema::SchemaRegistry;
use crate::security::{TokenIssuer, TokenVerifier};
use crate::users::{InMemoryUserStore, UserStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Validation schemas per operation
    schemas: SchemaRegistry,

    /// Bearer token verifier (shared secret + algorithm allow-list)
    verifier: Arc<TokenVerifier>,

    /// Login / protected-action controller
    auth: Arc<dyn AuthController>,

    /// User directory
    users: Arc<dyn UserStore>,
}

impl AppState {
    /// Create application state from parsed configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let auth = config.auth().context("Invalid JWT configuration")?;
        Self::new(auth, config.login())
    }

    /// Create application state with the built-in controller and user store
    pub fn new(auth: AuthConfig, login: LoginCredentials) -> Result<Self> {
        let controller = StaticCredentials::new(login, TokenIssuer::new(&auth));
        Self::with_parts(&auth, Arc::new(controller), Arc::new(InMemoryUserStore::new()))
    }

    /// Create application state with custom collaborators
    pub fn with_parts(
        auth: &AuthConfig,
        controller: Arc<dyn AuthController>,
        users: Arc<dyn UserStore>,
    ) -> Result<Self> {
        let schemas = SchemaRegistry::new().context("Failed to build validation schemas")?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                schemas,
                verifier: Arc::new(TokenVerifier::new(auth)),
                auth: controller,
                users,
            }),
        })
    }

    /// Get validation schemas
    pub fn schemas(&self) -> &SchemaRegistry {
        &self.inner.schemas
    }

    /// Get token verifier
    pub fn verifier(&self) -> Arc<TokenVerifier> {
        Arc::clone(&self.inner.verifier)
    }

    /// Get auth controller
    pub fn auth(&self) -> &dyn AuthController {
        self.inner.auth.as_ref()
    }

    /// Get user directory
    pub fn users(&self) -> &dyn UserStore {
        self.inner.users.as_ref()
    }

    /// Create mock state for testing
    #[cfg(test)]
    pub fn mock() -> Self {
        Self::new(
            AuthConfig::hs256(MOCK_SECRET, Some(3600)).unwrap(),
            LoginCredentials {
                username: "react".to_string(),
                password: "express".to_string(),
            },
        )
        .unwrap()
    }
}

/// Secret used by [`AppState::mock`]
#[cfg(test)]
pub const MOCK_SECRET: &str = "mock-jwt-secret";

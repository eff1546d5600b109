// ==============================================================================
// config.rs - Process Configuration
// ==============================================================================
// Description: CLI/environment configuration, loaded once at startup
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// Security: JWT secret never printed (hidden from --help env values and Debug)
// ==============================================================================

use clap::{Parser, ValueEnum};
use jsonwebtoken::Algorithm;
use std::fmt;
use std::str::FromStr;

/// Default lifetime of issued tokens
const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// Upper bound for token lifetime (ten years)
const MAX_TOKEN_TTL_SECS: u64 = 10 * 365 * 24 * 3600;

/// Default request body limit (1 MiB; bodies are small JSON documents)
const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

/// Command-line / environment configuration
#[derive(Parser, Clone)]
#[command(author, version, about = "Validated, JWT-protected REST API gateway", long_about = None)]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 4040)]
    pub port: u16,

    /// Shared HMAC secret for signing and verifying bearer tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Accepted signing algorithms (comma-separated, HMAC only)
    #[arg(long, env = "JWT_ALGORITHMS", value_delimiter = ',', default_value = "HS256")]
    pub jwt_algorithms: Vec<String>,

    /// Lifetime of issued tokens in seconds (0 = tokens carry no expiry)
    #[arg(
        long,
        env = "JWT_EXPIRE_SECS",
        default_value_t = DEFAULT_TOKEN_TTL_SECS,
        value_parser = clap::value_parser!(u64).range(0..=MAX_TOKEN_TTL_SECS)
    )]
    pub jwt_expire_secs: u64,

    /// Username accepted by the login endpoint
    #[arg(long, env = "LOGIN_USERNAME", default_value = "react")]
    pub login_username: String,

    /// Password accepted by the login endpoint
    #[arg(long, env = "LOGIN_PASSWORD", default_value = "express", hide_env_values = true)]
    pub login_password: String,

    /// Allowed CORS origins (comma-separated)
    #[arg(
        long,
        env = "CORS_ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3000"
    )]
    pub cors_allowed_origins: Vec<String>,

    /// Maximum request body size in bytes
    #[arg(long, env = "BODY_LIMIT_BYTES", default_value_t = DEFAULT_BODY_LIMIT_BYTES)]
    pub body_limit_bytes: usize,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl Config {
    /// Build the token configuration; fails on empty secret or bad algorithm list
    pub fn auth(&self) -> Result<AuthConfig, ConfigError> {
        let algorithms = self
            .jwt_algorithms
            .iter()
            .map(|name| parse_algorithm(name.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        let ttl = (self.jwt_expire_secs > 0).then_some(self.jwt_expire_secs);
        AuthConfig::new(self.jwt_secret.clone(), algorithms, ttl)
    }

    pub fn http(&self) -> HttpConfig {
        HttpConfig {
            cors_allowed_origins: self
                .cors_allowed_origins
                .iter()
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            body_limit_bytes: self.body_limit_bytes,
        }
    }

    pub fn login(&self) -> LoginCredentials {
        LoginCredentials {
            username: self.login_username.clone(),
            password: self.login_password.clone(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_algorithms", &self.jwt_algorithms)
            .field("jwt_expire_secs", &self.jwt_expire_secs)
            .field("login_username", &self.login_username)
            .field("login_password", &"<redacted>")
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("body_limit_bytes", &self.body_limit_bytes)
            .field("log_format", &self.log_format)
            .finish()
    }
}

/// Startup configuration errors (abort startup)
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT secret must not be empty")]
    EmptySecret,

    #[error("at least one JWT algorithm must be allowed")]
    NoAlgorithms,

    #[error("unsupported JWT algorithm '{0}' (expected HS256, HS384 or HS512)")]
    UnsupportedAlgorithm(String),
}

fn parse_algorithm(name: &str) -> Result<Algorithm, ConfigError> {
    match Algorithm::from_str(name) {
        Ok(alg) if is_hmac(alg) => Ok(alg),
        _ => Err(ConfigError::UnsupportedAlgorithm(name.to_string())),
    }
}

// Only shared-secret algorithms can be verified with a single secret
fn is_hmac(alg: Algorithm) -> bool {
    matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

/// Shared secret and accepted algorithms for bearer tokens.
///
/// Immutable once built. The first algorithm is used for issuing.
#[derive(Clone)]
pub struct AuthConfig {
    secret: String,
    algorithms: Vec<Algorithm>,
    token_ttl_secs: Option<u64>,
}

impl AuthConfig {
    pub fn new(
        secret: impl Into<String>,
        algorithms: Vec<Algorithm>,
        token_ttl_secs: Option<u64>,
    ) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if algorithms.is_empty() {
            return Err(ConfigError::NoAlgorithms);
        }
        if let Some(alg) = algorithms.iter().find(|alg| !is_hmac(**alg)) {
            return Err(ConfigError::UnsupportedAlgorithm(format!("{:?}", alg)));
        }

        Ok(Self {
            secret,
            algorithms,
            token_ttl_secs,
        })
    }

    /// Secret + `HS256` only, the standard configuration
    pub fn hs256(secret: impl Into<String>, token_ttl_secs: Option<u64>) -> Result<Self, ConfigError> {
        Self::new(secret, vec![Algorithm::HS256], token_ttl_secs)
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn algorithms(&self) -> &[Algorithm] {
        &self.algorithms
    }

    pub fn primary_algorithm(&self) -> Algorithm {
        self.algorithms[0]
    }

    pub fn token_ttl_secs(&self) -> Option<u64> {
        self.token_ttl_secs
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("algorithms", &self.algorithms)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

/// HTTP layer settings
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub cors_allowed_origins: Vec<String>,
    pub body_limit_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            cors_allowed_origins: vec!["http://localhost:3000".to_string()],
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

/// Credentials accepted by the built-in login controller
#[derive(Clone)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

// ==============================================================================
// middleware/mod.rs - API Gateway Middleware Modules
// ==============================================================================
// Description: Request validation and bearer authentication middleware
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

pub mod auth;
pub mod validation;

pub use auth::{require_bearer, AuthUser};
pub use validation::validate_request;

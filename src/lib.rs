// ==============================================================================
// lib.rs - Auth API Library Root
// ==============================================================================
// Description: Validated, JWT-protected REST API (login, users, protected action)
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

pub mod config;
pub mod controller;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod schema;
pub mod security;
pub mod state;
pub mod users;
pub mod validator;

pub use config::Config;
pub use routes::build_router;
pub use state::AppState;

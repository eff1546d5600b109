// ==============================================================================
// handlers.rs - API Request Handlers
// ==============================================================================
// Description: HTTP request handlers for auth and user endpoints
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================
//
// Handlers run only after their route's middleware chain has passed:
// request shapes are already validated, and protected handlers receive
// verified claims through `AuthUser`.
//
// ==============================================================================

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;

use crate::{
    error::AppError,
    middleware::AuthUser,
    models::*,
    state::AppState,
};

/// Root endpoint - API information
pub async fn root() -> Json<ApiInfoResponse> {
    Json(ApiInfoResponse {
        service: "Auth API Gateway",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: vec![
            "/health - Health check",
            "/api/auth/login - Log in, returns bearer token (POST)",
            "/api/auth/random-number - Protected example (GET, Authorization: Bearer)",
            "/api/users - Create user (POST)",
            "/api/users/{userId} - Get (GET) or update (PUT/PATCH) user",
        ],
    })
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
    })
}

/// POST /api/auth/login - Returns token if correct username and password are provided
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = state.auth().login(body).await?;
    Ok(Json(response))
}

/// GET /api/auth/random-number - Protected, needs `Authorization: Bearer {token}`
pub async fn random_number(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Json<RandomNumberResponse> {
    Json(state.auth().random_number(claims).await)
}

/// POST /api/users - Create user
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<UserRequest>,
) -> (StatusCode, Json<User>) {
    let user = state.users().create(body.username, body.mobile_number).await;
    info!("Created user {}", user.id);

    (StatusCode::CREATED, Json(user))
}

/// GET /api/users/{userId} - Get user
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<User>, AppError> {
    state
        .users()
        .get(&user_id)
        .await
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// PUT|PATCH /api/users/{userId} - Update user
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<UserRequest>,
) -> Result<Json<User>, AppError> {
    let user = state
        .users()
        .update(&user_id, body.username, body.mobile_number)
        .await
        .ok_or(AppError::NotFound)?;
    info!("Updated user {}", user.id);

    Ok(Json(user))
}

/// Fallback for unmatched paths
pub async fn not_found() -> AppError {
    AppError::NotFound
}

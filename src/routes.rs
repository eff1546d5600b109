// ==============================================================================
// routes.rs - Route Table
// ==============================================================================
// Description: Static (method, path) -> middleware chain -> handler mapping
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::{
    config::HttpConfig,
    handlers,
    middleware::{require_bearer, validate_request},
    state::AppState,
};

/// Build the full router. The table is fixed once built.
///
/// | Method    | Path                      | Chain                           |
/// |-----------|---------------------------|---------------------------------|
/// | POST      | /api/auth/login           | validate(login) -> login        |
/// | GET       | /api/auth/random-number   | bearer -> random_number         |
/// | POST      | /api/users                | validate(createUser) -> create  |
/// | GET       | /api/users/{userId}       | validate(getUser) -> get        |
/// | PUT/PATCH | /api/users/{userId}       | validate(updateUser) -> update  |
pub fn build_router(state: AppState, http: &HttpConfig) -> Router {
    let schemas = state.schemas();

    let auth_routes = Router::new()
        .route(
            "/login",
            post(handlers::login)
                .route_layer(from_fn_with_state(schemas.login(), validate_request)),
        )
        .route(
            "/random-number",
            get(handlers::random_number)
                .route_layer(from_fn_with_state(state.verifier(), require_bearer)),
        );

    let user_routes = Router::new()
        .route(
            "/",
            post(handlers::create_user)
                .route_layer(from_fn_with_state(schemas.create_user(), validate_request)),
        )
        .route(
            "/{userId}",
            get(handlers::get_user)
                .route_layer(from_fn_with_state(schemas.get_user(), validate_request)),
        )
        .route(
            "/{userId}",
            put(handlers::update_user)
                .patch(handlers::update_user)
                .route_layer(from_fn_with_state(schemas.update_user(), validate_request)),
        );

    // Origins are configured via CORS_ALLOWED_ORIGINS env var (comma-separated)
    let allowed_origins: Vec<_> = http
        .cors_allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_credentials(false)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                // Request tracing
                .layer(TraceLayer::new_for_http())
                // Body size limit for both streamed reads and extractors
                .layer(RequestBodyLimitLayer::new(http.body_limit_bytes))
                .layer(cors)
                .layer(DefaultBodyLimit::max(http.body_limit_bytes)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, extract::Request, http::StatusCode};
    use jsonwebtoken::{Algorithm, EncodingKey, Header};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::state::MOCK_SECRET;

    fn app() -> Router {
        build_router(AppState::mock(), &HttpConfig::default())
    }

    async fn call(
        router: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_string(&v).unwrap())
            }
            None => Body::empty(),
        };

        let response = router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            json!(null)
        } else {
            serde_json::from_slice(&bytes).unwrap_or(json!(null))
        };
        (status, json)
    }

    async fn login(router: &Router) -> String {
        let (status, body) = call(
            router,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "react", "password": "express" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    async fn send_raw(
        router: &Router,
        uri: &str,
        content_type: Option<&str>,
        body: impl Into<Body>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(Method::POST).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let response = router
            .clone()
            .oneshot(builder.body(body.into()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(json!(null)))
    }

    fn sign(alg: Algorithm, secret: &str, claims: &Value) -> String {
        jsonwebtoken::encode(
            &Header::new(alg),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn forge(alg: Algorithm, secret: &str) -> String {
        sign(alg, secret, &json!({ "username": "react" }))
    }

    // ── Auth ──

    #[tokio::test]
    async fn test_login_success() {
        let router = app();
        let (status, body) = call(
            &router,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "react", "password": "express" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "react");
        assert_eq!(body["token"].as_str().unwrap().split('.').count(), 3);
    }

    #[tokio::test]
    async fn test_login_missing_password_rejected() {
        let (status, body) = call(
            &app(),
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "react" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["part"], "body");
        assert_eq!(body["details"][0]["field"], "password");
    }

    #[tokio::test]
    async fn test_login_wrong_credentials() {
        let (status, body) = call(
            &app(),
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "react", "password": "nope" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Authentication error");
    }

    #[tokio::test]
    async fn test_random_number_with_valid_token() {
        let router = app();
        let token = login(&router).await;

        let (status, body) = call(
            &router,
            Method::GET,
            "/api/auth/random-number",
            Some(&token),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["username"], "react");
        let num = body["num"].as_f64().unwrap();
        assert!((0.0..100.0).contains(&num));
    }

    #[tokio::test]
    async fn test_random_number_without_header() {
        let (status, body) = call(&app(), Method::GET, "/api/auth/random-number", None, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Unauthorized" }));
    }

    #[tokio::test]
    async fn test_random_number_rejects_other_algorithms() {
        let router = app();

        for alg in [Algorithm::HS384, Algorithm::HS512] {
            let token = forge(alg, MOCK_SECRET);
            let (status, body) =
                call(&router, Method::GET, "/api/auth/random-number", Some(&token), None).await;

            assert_eq!(status, StatusCode::UNAUTHORIZED, "{alg:?}");
            // Same generic body whatever the reason
            assert_eq!(body, json!({ "error": "Unauthorized" }));
        }
    }

    #[tokio::test]
    async fn test_random_number_accepts_token_without_expiry() {
        let token = forge(Algorithm::HS256, MOCK_SECRET);
        let (status, body) =
            call(&app(), Method::GET, "/api/auth/random-number", Some(&token), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["username"], "react");
    }

    #[tokio::test]
    async fn test_random_number_accepts_token_without_username() {
        let now = chrono::Utc::now().timestamp();
        let token = sign(
            Algorithm::HS256,
            MOCK_SECRET,
            &json!({ "sub": "42", "role": "admin", "iat": now, "exp": now + 600 }),
        );
        let (status, body) =
            call(&app(), Method::GET, "/api/auth/random-number", Some(&token), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["user"],
            json!({ "sub": "42", "role": "admin", "iat": now, "exp": now + 600 })
        );
    }

    #[tokio::test]
    async fn test_random_number_echoes_extra_claims() {
        let token = sign(
            Algorithm::HS256,
            MOCK_SECRET,
            &json!({ "username": "react", "role": "admin" }),
        );
        let (status, body) =
            call(&app(), Method::GET, "/api/auth/random-number", Some(&token), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"], json!({ "username": "react", "role": "admin" }));
    }

    #[tokio::test]
    async fn test_random_number_rejects_wrong_secret() {
        let token = forge(Algorithm::HS256, "not-the-secret");
        let (status, _) =
            call(&app(), Method::GET, "/api/auth/random-number", Some(&token), None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    // ── Users ──

    #[tokio::test]
    async fn test_create_user() {
        let (status, body) = call(
            &app(),
            Method::POST,
            "/api/users",
            None,
            Some(json!({ "username": "alice", "mobileNumber": "9123456780" })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["username"], "alice");
        assert_eq!(body["mobileNumber"], "9123456780");
        assert!(body["id"].as_str().unwrap().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_create_user_validation_failures() {
        let router = app();
        let bad_bodies = [
            json!({ "mobileNumber": "9123456780" }),
            json!({ "username": "alice" }),
            json!({ "username": "alice", "mobileNumber": "0123456789" }),
            json!({ "username": "alice", "mobileNumber": "12345" }),
        ];

        for body in bad_bodies {
            let (status, _) = call(&router, Method::POST, "/api/users", None, Some(body.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        }
    }

    #[tokio::test]
    async fn test_update_user_flow() {
        let router = app();
        let (_, created) = call(
            &router,
            Method::POST,
            "/api/users",
            None,
            Some(json!({ "username": "alice", "mobileNumber": "9123456780" })),
        )
        .await;
        let id = created["id"].as_str().unwrap();

        for method in [Method::PUT, Method::PATCH] {
            let (status, body) = call(
                &router,
                method,
                &format!("/api/users/{id}"),
                None,
                Some(json!({ "username": "alice2", "mobileNumber": "8123456780" })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["username"], "alice2");
        }

        let (status, body) = call(&router, Method::GET, &format!("/api/users/{id}"), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mobileNumber"], "8123456780");
    }

    #[tokio::test]
    async fn test_update_user_id_must_be_hex() {
        let router = app();
        let body = json!({ "username": "alice", "mobileNumber": "9123456780" });

        let (status, response) =
            call(&router, Method::PUT, "/api/users/xyz123", None, Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["details"][0]["part"], "params");
        assert_eq!(response["details"][0]["field"], "userId");

        // Valid hex id and body pass validation; the id is simply unknown
        let (status, _) = call(&router, Method::PUT, "/api/users/deadbeef01", None, Some(body)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    // ── Body handling ──

    #[tokio::test]
    async fn test_body_without_content_type_rejected_by_validation() {
        let (status, body) = send_raw(
            &app(),
            "/api/auth/login",
            None,
            r#"{"username":"react","password":"express"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["details"][0]["part"], "body");
        assert_eq!(body["details"][0]["kind"], "malformed");
    }

    #[tokio::test]
    async fn test_text_plain_body_rejected_by_validation() {
        let (status, body) = send_raw(
            &app(),
            "/api/users",
            Some("text/plain"),
            r#"{"username":"alice","mobileNumber":"9123456780"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"].as_array().unwrap().len(), 1);
        assert_eq!(body["details"][0]["kind"], "malformed");
    }

    #[tokio::test]
    async fn test_json_content_type_with_charset_accepted() {
        let (status, body) = send_raw(
            &app(),
            "/api/auth/login",
            Some("application/json; charset=utf-8"),
            r#"{"username":"react","password":"express"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "react");
    }

    #[tokio::test]
    async fn test_empty_body_reports_required_fields() {
        let (status, body) = send_raw(&app(), "/api/auth/login", None, Body::empty()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let details = body["details"].as_array().unwrap();
        assert_eq!(details.len(), 2);
        assert!(details.iter().all(|d| d["kind"] == "required"));
    }

    #[tokio::test]
    async fn test_oversized_body_is_payload_too_large() {
        let password = "x".repeat(2 * 1024 * 1024);
        let payload = json!({ "username": "react", "password": password }).to_string();
        let (status, _) = send_raw(
            &app(),
            "/api/auth/login",
            Some("application/json"),
            payload,
        )
        .await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    // ── Route table ──

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let (status, body) = call(&app(), Method::GET, "/api/nothing", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Resource not found");
    }

    #[tokio::test]
    async fn test_wrong_method_not_allowed() {
        let router = app();

        let (status, _) = call(&router, Method::GET, "/api/auth/login", None, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, _) = call(&router, Method::POST, "/api/auth/random-number", None, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, _) = call(&router, Method::DELETE, "/api/users/deadbeef01", None, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_health_and_root() {
        let router = app();

        let (status, body) = call(&router, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, body) = call(&router, Method::GET, "/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "Auth API Gateway");
    }

    #[test]
    fn test_user_id_route_param_matches_schema() {
        use crate::schema::RequestPart;

        let state = AppState::mock();
        for schema in [state.schemas().update_user(), state.schemas().get_user()] {
            let params = schema.rules(RequestPart::Params).unwrap();
            assert!(params.iter().any(|rule| rule.name == "userId"));
        }
    }
}

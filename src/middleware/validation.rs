// ==============================================================================
// middleware/validation.rs - Request Validation Middleware
// ==============================================================================
// Description: Validate body/params/query against a route's schema before dispatch
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

use axum::{
    body::{Body, Bytes},
    extract::{
        rejection::PathRejection, rejection::QueryRejection, FromRequest, Path, Query, Request,
        State,
    },
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::AppError;
use crate::schema::{RequestPart, ValidationSchema};
use crate::validator::{validate, RequestInput, ValidationError, ValidationErrors};

/// Middleware checking the request against a schema.
///
/// The body is buffered only when the schema declares body rules and is
/// re-attached unchanged for the handler. A non-empty body must be sent as
/// JSON. All violations are reported in one 400 response.
pub async fn validate_request(
    State(schema): State<Arc<ValidationSchema>>,
    params: Result<Path<HashMap<String, String>>, PathRejection>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let mut input = RequestInput::new();
    let mut errors = Vec::new();

    if schema.declares(RequestPart::Params) {
        // Routes without path parameters yield an empty map
        let Path(params) = params.unwrap_or_else(|_| Path(HashMap::new()));
        input = input.with_params(params);
    }

    if schema.declares(RequestPart::Query) {
        match query {
            Ok(Query(query)) => input = input.with_query(query),
            Err(rejection) => errors.push(ValidationError::malformed(
                RequestPart::Query,
                rejection.body_text(),
            )),
        }
    }

    let request = if schema.declares(RequestPart::Body) {
        let (parts, body) = request.into_parts();

        // Buffer through the `Bytes` extractor so the configured body limit applies
        let mut buffered = Request::new(body);
        *buffered.extensions_mut() = parts.extensions.clone();
        let bytes = Bytes::from_request(buffered, &()).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::PayloadTooLarge
            } else {
                AppError::BadRequest(rejection.body_text())
            }
        })?;

        if bytes.is_empty() {
            input = input.with_body(Value::Null);
        } else if !has_json_content_type(&parts.headers) {
            errors.push(ValidationError::malformed(
                RequestPart::Body,
                "expected Content-Type: application/json",
            ));
        } else {
            match serde_json::from_slice::<Value>(&bytes) {
                Ok(value) => input = input.with_body(value),
                Err(e) => errors.push(ValidationError::malformed(
                    RequestPart::Body,
                    format!("invalid JSON: {}", e),
                )),
            }
        }

        Request::from_parts(parts, Body::from(bytes))
    } else {
        request
    };

    // A malformed body means its fields cannot be inspected; report that alone
    let body_malformed = errors.iter().any(|e| e.part == RequestPart::Body);
    if let Err(ValidationErrors(violations)) = validate(&schema, &input) {
        errors.extend(
            violations
                .into_iter()
                .filter(|v| !(body_malformed && v.part == RequestPart::Body)),
        );
    }

    if !errors.is_empty() {
        debug!(
            schema = schema.name(),
            violations = errors.len(),
            "Request failed validation"
        );
        return Err(AppError::Validation(ValidationErrors(errors)));
    }

    Ok(next.run(request).await)
}

/// `application/json` or any `application/*+json` type, parameters ignored
fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = value.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();

    match essence.split_once('/') {
        Some(("application", subtype)) => subtype == "json" || subtype.ends_with("+json"),
        _ => false,
    }
}

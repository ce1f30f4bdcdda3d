use auth::IdentityContext;
use auth::PUBLIC_MESSAGE;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use chrono::Utc;

use super::handlers::ApiError;
use crate::inbound::http::router::AppState;

const HEADER_MESSAGE: &str = "Missing or malformed Authorization header";

/// Middleware that validates bearer tokens and attaches the caller's identity
///
/// Every validation failure gets the same response; the specific reason is
/// only logged.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized(HEADER_MESSAGE.to_string()).into_response())
        .and_then(|value| {
            parse_bearer(value)
                .ok_or_else(|| ApiError::Unauthorized(HEADER_MESSAGE.to_string()).into_response())
        })?;

    let identity = state
        .authenticator
        .validate_token(token, Utc::now())
        .map_err(|e| {
            tracing::warn!(reason = e.kind(), error = %e, "Token validation failed");
            ApiError::Unauthorized(PUBLIC_MESSAGE.to_string()).into_response()
        })?;

    tracing::debug!(subject = %identity.subject, kid = %identity.key_id, "Request authenticated");
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Middleware that only lets through callers holding `role`
///
/// Must run after [`authenticate`].
pub async fn require_role(
    State(role): State<&'static str>,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    let allowed = req
        .extensions()
        .get::<IdentityContext>()
        .map(|identity| identity.has_role(role));

    match allowed {
        Some(true) => Ok(next.run(req).await),
        Some(false) => {
            tracing::warn!(required_role = role, "Caller lacks required role");
            Err(ApiError::Forbidden("Insufficient permissions".to_string()).into_response())
        }
        None => Err(ApiError::Unauthorized(PUBLIC_MESSAGE.to_string()).into_response()),
    }
}

/// Auth scheme names are case-insensitive (RFC 7235).
fn parse_bearer(value: &HeaderValue) -> Option<&str> {
    let (scheme, token) = value.to_str().ok()?.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

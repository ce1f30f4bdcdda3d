use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::keys::list_keys;
use super::handlers::login::login;
use super::handlers::session::get_session;
use super::middleware::authenticate;
use super::middleware::require_role;
use crate::domain::credentials::service::LoginService;
use crate::outbound::directory::InMemoryUserDirectory;

/// Role required for the administration routes.
pub const ADMIN_ROLE: &str = "Admin";

#[derive(Clone)]
pub struct AppState {
    pub login_service: Arc<LoginService<InMemoryUserDirectory>>,
    pub authenticator: Arc<Authenticator>,
}

pub fn create_router(
    login_service: Arc<LoginService<InMemoryUserDirectory>>,
    authenticator: Arc<Authenticator>,
) -> Router {
    let state = AppState {
        login_service,
        authenticator,
    };

    let public_routes = Router::new().route("/api/auth/login", post(login));

    let admin_routes = Router::new()
        .route("/api/admin/keys", get(list_keys))
        .route_layer(middleware::from_fn_with_state(ADMIN_ROLE, require_role));

    // Layers run outside-in, so authentication wraps the role check
    let protected_routes = Router::new()
        .route("/api/auth/session", get(get_session))
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    // Authorization headers are left out of the span
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

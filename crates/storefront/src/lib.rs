//! Shopzify storefront API.
//!
//! JSON API for the catalog, wishlists, carts, checkout and navigation menus,
//! with password login, session-cookie refresh and bearer access tokens.
//! Built as a library so the router can be exercised in tests against the
//! in-memory store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Method, Request, header},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tower_sessions::SessionStore;

use state::AppState;

/// Build the full application router.
///
/// `session_store` backs the refresh cookie; `cors_origins` lists the
/// browser origins allowed to call the API with credentials. With
/// `rate_limit_auth` the `/auth` routes are limited per client IP, which
/// needs the server to provide `ConnectInfo` or proxy headers.
pub fn app<S>(
    state: AppState,
    session_store: S,
    secure_cookies: bool,
    cors_origins: &[String],
    rate_limit_auth: bool,
) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = middleware::create_session_layer(session_store, secure_cookies);

    let mut auth = routes::auth_routes();
    if rate_limit_auth {
        auth = auth.layer(middleware::auth_rate_limiter());
    }

    routes::routes()
        .nest("/auth", auth)
        .layer(session_layer)
        .layer(cors_layer(cors_origins))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
                user_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

//! HTTP route handlers for storefront.
//!
//! The process holds one session and one cart. Every client talks to the
//! same stores, so a login or a cart change by one client is seen by all of
//! them and by every open event stream.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                      - Health check
//!
//! # Catalog
//! GET    /catalog                     - Whole catalog
//! GET    /catalog/{category}          - Category in rows (?columns=3)
//!
//! # Auth
//! POST   /auth/login                  - Login ({email, password})
//! POST   /auth/logout                 - Logout (303 to /login)
//! GET    /auth/session                - Session snapshot
//! GET    /auth/session/stream         - Session changes (SSE)
//! POST   /auth/register               - Register a new user
//!
//! # Cart
//! GET    /cart                        - Cart contents
//! POST   /cart/items                  - Add one unit of a product
//! PUT    /cart/items/{name}           - Set quantity ({quantity})
//! DELETE /cart/items/{name}           - Remove a product
//! DELETE /cart                        - Empty the cart
//! GET    /cart/count/stream           - Total quantity changes (SSE)
//! ```

pub mod auth;
pub mod cart;
pub mod catalog;

use std::time::Duration;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::session))
        .route("/session/stream", get(auth::session_stream))
        .route("/register", post(auth::register))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route("/items/{name}", put(cart::update).delete(cart::remove))
        .route("/count/stream", get(cart::count_stream))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .route("/{category}", get(catalog::show))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/catalog", catalog_routes())
        .nest("/auth", auth_routes())
        .nest("/cart", cart_routes())
}

/// The full application: routes, health check, request IDs and tracing.
///
/// Sentry layers are added by the binary, outside this router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|request: &axum::http::Request<_>| {
                            tracing::info_span!(
                                "http_request",
                                method = %request.method(),
                                uri = %request.uri(),
                                request_id = tracing::field::Empty,
                                status = tracing::field::Empty,
                                latency_ms = tracing::field::Empty,
                            )
                        })
                        .on_response(
                            |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                                span.record("status", response.status().as_u16());
                                span.record(
                                    "latency_ms",
                                    u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                                );
                                DefaultOnResponse::default().on_response(response, latency, span);
                            },
                        ),
                )
                .layer(middleware::from_fn(request_id_middleware)),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the data endpoints.
async fn health() -> &'static str {
    "ok"
}

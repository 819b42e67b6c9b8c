//! Route definitions
//!
//! Author: hephaex@gmail.com

use crate::auth::session_guard;
use crate::handlers::{auth, health, pages};
use crate::middleware::{origin_gate, security_headers_middleware};
use crate::openapi::openapi_json;
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Routes reachable without a token
fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(pages::root))
        .route("/login", get(pages::login_page).post(auth::login_handler))
        .route("/signup", get(pages::signup_page).post(auth::signup_handler))
        .route("/logout", post(auth::logout_handler))
        .route("/health", get(health::health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
}

/// Routes behind the session guard
fn protected_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/menu", get(pages::menu_page))
        .route("/admin", get(pages::admin_page))
        .route_layer(middleware::from_fn_with_state(state, session_guard))
}

/// Build the full application router
///
/// Layers, outermost first: tracing, security headers, origin gate, CORS.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = state.origin_gate.cors_layer();

    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .layer(cors)
        .layer(middleware::from_fn_with_state(state.clone(), origin_gate))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

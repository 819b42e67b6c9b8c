//! authgate API - HTTP access-control gateway
//!
//! Serves the login, signup and logout flow, issues identity tokens in an
//! HTTP-only cookie and guards the menu and admin pages behind them.
//! Cross-origin requests are admitted only from an exact allow-list.
//!
//! Author: hephaex@gmail.com

pub mod audit;
pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use routes::create_router;

#[cfg(any(test, feature = "test-utils"))]
mod testing {
    use crate::state::AppState;
    use authgate_core::{AppConfig, MemoryCredentialStore};
    use axum::Router;
    use std::sync::Arc;

    /// Secret used to sign tokens in tests
    pub const TEST_JWT_SECRET: &str = "authgate-test-secret";

    /// Configuration with cheap hashing and a fixed secret
    pub fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = TEST_JWT_SECRET.to_string();
        config.auth.hash_memory_kib = 4096;
        config.auth.hash_iterations = 1;
        config.auth.hash_parallelism = 1;
        config
    }

    /// State backed by an empty in-memory credential store
    pub fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(
            test_config(),
            Arc::new(MemoryCredentialStore::new()),
        ))
    }

    /// Router over a fresh in-memory store
    pub fn create_router_for_testing() -> Router {
        crate::create_router(test_state())
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use testing::{create_router_for_testing, test_config, test_state, TEST_JWT_SECRET};

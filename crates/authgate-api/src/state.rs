//! Application state management
//!
//! Author: hephaex@gmail.com

use crate::auth::{AuthFlow, PasswordConfig, PasswordHasher, TokenService};
use crate::middleware::OriginGate;
use authgate_core::{AppConfig, CredentialStore};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
///
/// Everything here is built once at startup and only read afterwards.
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Login / signup / logout orchestration
    pub flow: AuthFlow,
    /// Token signing and validation keys
    pub tokens: Arc<TokenService>,
    /// Origin allow-list
    pub origin_gate: OriginGate,
    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Create application state from configuration and a credential store
    pub fn new(config: AppConfig, store: Arc<dyn CredentialStore>) -> Self {
        let tokens = Arc::new(TokenService::from_config(&config.auth));
        let hasher = PasswordHasher::new(PasswordConfig::from(&config.auth));
        let flow = AuthFlow::new(store, hasher, tokens.clone());
        let origin_gate = OriginGate::new(config.server.allowed_origins.iter().cloned());

        Self {
            config,
            flow,
            tokens,
            origin_gate,
            start_time: Instant::now(),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

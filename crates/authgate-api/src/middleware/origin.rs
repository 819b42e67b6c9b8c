//! Origin allow-list
//!
//! Requests without an `Origin` header (same-origin navigation, curl) pass.
//! Requests whose `Origin` is byte-for-byte on the allow-list pass and get
//! CORS headers from the wrapped `CorsLayer`. Everything else is refused
//! with 403 before any handler runs.
//!
//! Author: hephaex@gmail.com

use crate::audit::{audit_log, AuditContext, AuditEvent};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Exact-match allow-list of browser origins
#[derive(Debug, Clone, Default)]
pub struct OriginGate {
    allowed: Vec<String>,
}

impl OriginGate {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: origins.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed
    }

    /// Admission decision for a request's `Origin` header
    ///
    /// No normalisation: a trailing slash or another scheme is a different
    /// origin.
    pub fn admits(&self, origin: Option<&HeaderValue>) -> bool {
        match origin {
            None => true,
            Some(value) => self
                .allowed
                .iter()
                .any(|allowed| allowed.as_bytes() == value.as_bytes()),
        }
    }

    /// CORS headers for admitted cross-origin requests
    pub fn cors_layer(&self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .allowed
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring unparsable allowed origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true)
    }
}

/// Middleware enforcing the origin allow-list
pub async fn origin_gate(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let origin = request.headers().get(header::ORIGIN);

    if state.origin_gate.admits(origin) {
        tracing::debug!(origin = ?origin, "Origin admitted");
        return Ok(next.run(request).await);
    }

    let origin = origin
        .map(|o| String::from_utf8_lossy(o.as_bytes()).into_owned())
        .unwrap_or_default();
    tracing::debug!(origin = %origin, "Origin rejected");
    audit_log(&AuditEvent::OriginRejected {
        origin,
        path: request.uri().path().to_string(),
        context: AuditContext::from_headers(request.headers()),
    });

    Err(AppError::AdmissionRejected)
}

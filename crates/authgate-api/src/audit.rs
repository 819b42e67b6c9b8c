//! Security audit logging for authentication events
//!
//! Provides structured audit logging for logins, signups, logouts, rejected
//! tokens and rejected origins. The record shown to operators keeps the
//! real failure reason even where the client only sees a generic message.
//!
//! All audit events are logged at INFO level with the "audit" target,
//! making them easy to filter and route to security monitoring systems.
//!
//! # Example
//!
//! ```ignore
//! use authgate_api::audit::{AuditContext, AuditEvent, audit_log};
//!
//! audit_log(&AuditEvent::LoginSuccess {
//!     user_id: user.id,
//!     email: user.email.clone(),
//!     context: AuditContext::from_headers(&headers),
//! });
//! ```
//!
//! Author: hephaex@gmail.com

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Request metadata attached to every audit event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditContext {
    /// Client IP address (extracted from proxy headers)
    pub ip_address: Option<String>,
    /// User agent string
    pub user_agent: Option<String>,
}

impl AuditContext {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            ip_address: extract_ip_address(headers),
            user_agent: extract_user_agent(headers),
        }
    }
}

/// Security audit events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// Successful login
    LoginSuccess {
        user_id: Uuid,
        email: String,
        #[serde(flatten)]
        context: AuditContext,
    },

    /// Failed login (unknown email or wrong password)
    LoginFailure {
        email: String,
        reason: String,
        #[serde(flatten)]
        context: AuditContext,
    },

    /// New account created
    SignupSuccess {
        user_id: Uuid,
        username: String,
        email: String,
        #[serde(flatten)]
        context: AuditContext,
    },

    /// Signup refused (duplicate or invalid input)
    SignupFailure {
        username: String,
        email: String,
        reason: String,
        #[serde(flatten)]
        context: AuditContext,
    },

    /// Token cookie cleared
    Logout {
        username: Option<String>,
        #[serde(flatten)]
        context: AuditContext,
    },

    /// Missing, invalid or expired token on a protected route
    InvalidToken {
        path: String,
        reason: String,
        #[serde(flatten)]
        context: AuditContext,
    },

    /// Cross-origin request from an origin outside the allow-list
    OriginRejected {
        origin: String,
        path: String,
        #[serde(flatten)]
        context: AuditContext,
    },
}

/// Log a security audit event with structured fields
///
/// The event is also serialized to JSON in the `event` field for log
/// aggregators.
pub fn audit_log(event: &AuditEvent) {
    let timestamp: DateTime<Utc> = Utc::now();

    let event_json = serde_json::to_string(event)
        .unwrap_or_else(|e| format!("{{\"error\":\"Failed to serialize audit event: {e}\"}}"));

    match event {
        AuditEvent::LoginSuccess {
            user_id,
            email,
            context,
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                email = %email,
                ip_address = ?context.ip_address,
                "Login successful"
            );
        }
        AuditEvent::LoginFailure {
            email,
            reason,
            context,
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                email = %email,
                reason = %reason,
                ip_address = ?context.ip_address,
                "Login failed"
            );
        }
        AuditEvent::SignupSuccess {
            user_id,
            username,
            email,
            context,
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                username = %username,
                email = %email,
                ip_address = ?context.ip_address,
                "Signup successful"
            );
        }
        AuditEvent::SignupFailure {
            username,
            email,
            reason,
            context,
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                username = %username,
                email = %email,
                reason = %reason,
                ip_address = ?context.ip_address,
                "Signup failed"
            );
        }
        AuditEvent::Logout { username, context } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                username = ?username,
                ip_address = ?context.ip_address,
                "User logout"
            );
        }
        AuditEvent::InvalidToken {
            path,
            reason,
            context,
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                path = %path,
                reason = %reason,
                ip_address = ?context.ip_address,
                "Invalid token"
            );
        }
        AuditEvent::OriginRejected {
            origin,
            path,
            context,
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                origin = %origin,
                path = %path,
                ip_address = ?context.ip_address,
                "Origin rejected"
            );
        }
    }
}

/// Extract IP address from request headers
///
/// Checks X-Forwarded-For, then X-Real-IP.
pub fn extract_ip_address(headers: &HeaderMap) -> Option<String> {
    // Take the first IP in the chain (client IP)
    if let Some(xff) = headers.get("x-forwarded-for") {
        if let Ok(xff_str) = xff.to_str() {
            if let Some(first_ip) = xff_str.split(',').next() {
                return Some(first_ip.trim().to_string());
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return Some(ip_str.to_string());
        }
    }

    None
}

/// Extract user agent from request headers
pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|ua| ua.to_str().ok())
        .map(|s| s.to_string())
}

//! Request admission and response hardening middleware
//!
//! Author: hephaex@gmail.com

pub mod origin;
pub mod security_headers;

pub use origin::{origin_gate, OriginGate};
pub use security_headers::security_headers_middleware;

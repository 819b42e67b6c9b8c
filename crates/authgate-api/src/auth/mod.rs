//! Authentication module
//!
//! This module provides the gateway's authentication pieces:
//! - Password hashing with Argon2
//! - Token issuance and validation
//! - The session guard protecting routes
//! - The login / signup / logout flow
//! - Request forms and the page-state view model

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;

pub use jwt::{Claims, IdentityClaims, TokenError, TokenService};
pub use middleware::{extract_token, session_guard, AuthError, AuthenticatedUser, TOKEN_COOKIE};
pub use models::{LoginForm, Page, PageState, SignupForm, ANONYMOUS_USERNAME};
pub use password::{PasswordConfig, PasswordError, PasswordHasher};
pub use service::{AuthFlow, AuthFlowError, AuthRejection, Authenticated};

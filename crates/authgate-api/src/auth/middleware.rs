/// Session guard for protected routes
///
/// Extracts the identity token from the `token` cookie or, failing that,
/// from an `Authorization: Bearer` header. On success the authenticated
/// user is added to request extensions; otherwise the visitor is sent back
/// to the login page.
use super::jwt::{Claims, TokenError};
use super::models::{Page, PageState};
use crate::audit::{audit_log, AuditContext, AuditEvent};
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Name of the cookie carrying the identity token
pub const TOKEN_COOKIE: &str = "token";

/// Authenticated user information extracted from the token
///
/// Handlers behind the guard read it with `Extension<AuthenticatedUser>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
}

impl TryFrom<Claims> for AuthenticatedUser {
    type Error = TokenError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let identity = claims.identity()?;
        Ok(Self {
            user_id: identity.user_id,
            username: identity.username,
            email: identity.email,
        })
    }
}

/// Session guard errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No identity token presented")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] TokenError),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken(_) => StatusCode::FORBIDDEN,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Access denied.",
            AuthError::InvalidToken(_) => "Invalid or expired token.",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = PageState::anonymous(Page::Login, self.message());

        (
            status,
            [(header::LOCATION, HeaderValue::from_static("/login"))],
            Json(body),
        )
            .into_response()
    }
}

/// Pull the identity token out of the request headers
///
/// The cookie wins over the bearer header. Empty values count as absent,
/// which is what a cleared cookie looks like.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Middleware that requires a valid identity token
///
/// # Usage
///
/// ```ignore
/// use axum::{Router, routing::get, middleware};
/// use authgate_api::auth::middleware::session_guard;
///
/// let protected = Router::new()
///     .route("/menu", get(menu_page))
///     .route_layer(middleware::from_fn_with_state(state.clone(), session_guard));
/// ```
pub async fn session_guard(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let path = request.uri().path().to_string();

    let Some(token) = extract_token(request.headers()) else {
        tracing::debug!(path = %path, "No token presented");
        return Err(AuthError::MissingToken);
    };

    let user = match state
        .tokens
        .validate(&token)
        .and_then(AuthenticatedUser::try_from)
    {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(path = %path, code = e.code(), "Token rejected");
            audit_log(&AuditEvent::InvalidToken {
                path,
                reason: e.code().to_string(),
                context: AuditContext::from_headers(request.headers()),
            });
            return Err(AuthError::InvalidToken(e));
        }
    };

    tracing::debug!(user_id = %user.user_id, path = %path, "Token accepted");
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

//! Authentication handlers
//!
//! Login and signup set the `token` cookie and send the browser on to the
//! menu; logout clears it and sends the browser back to login. Every
//! response body is the page-state the renderer should show.
//!
//! Author: hephaex@gmail.com

use crate::audit::AuditContext;
use crate::auth::{
    extract_token, AuthRejection, Authenticated, LoginForm, Page, PageState, SignupForm,
    TOKEN_COOKIE,
};
use crate::extract::FormOrJson;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

/// Cookie carrying a freshly issued token
///
/// `Max-Age` matches the token lifetime so the browser drops the cookie
/// when the token stops being accepted.
pub fn token_cookie(token: String, ttl_secs: u64, secure: bool) -> Cookie<'static> {
    let max_age = i64::try_from(ttl_secs).unwrap_or(i64::MAX);

    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(max_age))
        .build()
}

/// Cookie instructing the browser to forget the token
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build((TOKEN_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build();
    cookie.make_removal();
    cookie
}

fn see_other(jar: CookieJar, location: &'static str, page: PageState) -> Response {
    (
        StatusCode::SEE_OTHER,
        jar,
        [(header::LOCATION, location)],
        Json(page),
    )
        .into_response()
}

fn signed_in(state: &AppState, jar: CookieJar, outcome: Authenticated) -> Response {
    let cookie = token_cookie(
        outcome.token,
        state.tokens.ttl_secs(),
        state.config.auth.cookie_secure,
    );
    see_other(jar.add(cookie), Page::Menu.path(), outcome.page)
}

/// Log in with email and password
///
/// # Responses
///
/// * `303 See Other` - Token cookie set, continue to `/menu`
/// * `400 Bad Request` - Missing fields or undecodable body
/// * `404 Not Found` - Unknown email or wrong password (same message)
/// * `500 Internal Server Error` - Store or hashing failure
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Logged in, redirect to /menu", body = PageState),
        (status = 400, description = "Invalid input", body = PageState),
        (status = 404, description = "Invalid email or password", body = PageState),
        (status = 500, description = "Internal server error", body = PageState),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
    FormOrJson(form): FormOrJson<LoginForm>,
) -> Result<Response, AuthRejection> {
    let context = AuditContext::from_headers(&headers);
    let outcome = state
        .flow
        .login(form, &context)
        .await
        .map_err(|e| e.on(Page::Login))?;

    Ok(signed_in(&state, jar, outcome))
}

/// Register a new account
///
/// # Responses
///
/// * `303 See Other` - Account created, token cookie set, continue to `/menu`
/// * `400 Bad Request` - Username or email taken, or missing fields
/// * `500 Internal Server Error` - Store or hashing failure
#[utoipa::path(
    post,
    path = "/signup",
    tag = "auth",
    request_body(content = SignupForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Registered, redirect to /menu", body = PageState),
        (status = 400, description = "Duplicate registration or invalid input", body = PageState),
        (status = 500, description = "Internal server error", body = PageState),
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
    FormOrJson(form): FormOrJson<SignupForm>,
) -> Result<Response, AuthRejection> {
    let context = AuditContext::from_headers(&headers);
    let outcome = state
        .flow
        .signup(form, &context)
        .await
        .map_err(|e| e.on(Page::Signup))?;

    Ok(signed_in(&state, jar, outcome))
}

/// Clear the token cookie
///
/// Succeeds with or without a token, valid or not.
#[utoipa::path(
    post,
    path = "/logout",
    tag = "auth",
    responses(
        (status = 303, description = "Logged out, redirect to /login", body = PageState),
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    let username = extract_token(&headers)
        .and_then(|token| state.tokens.validate(&token).ok())
        .map(|claims| claims.username);

    let page = state
        .flow
        .logout(username, &AuditContext::from_headers(&headers));

    let jar = jar.add(removal_cookie(state.config.auth.cookie_secure));
    see_other(jar, Page::Login.path(), page)
}

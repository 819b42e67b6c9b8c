//! Page handlers
//!
//! Author: hephaex@gmail.com

use crate::auth::{AuthenticatedUser, Page, PageState};
use axum::{
    response::{IntoResponse, Redirect},
    Extension, Json,
};

pub async fn root() -> Redirect {
    Redirect::to(Page::Login.path())
}

/// Login page
#[utoipa::path(
    get,
    path = "/login",
    tag = "pages",
    responses((status = 200, description = "Login page-state", body = PageState))
)]
pub async fn login_page() -> impl IntoResponse {
    Json(PageState::anonymous(
        Page::Login,
        "Please sign up if you don't have a user account yet.",
    ))
}

/// Signup page
#[utoipa::path(
    get,
    path = "/signup",
    tag = "pages",
    responses((status = 200, description = "Signup page-state", body = PageState))
)]
pub async fn signup_page() -> impl IntoResponse {
    Json(PageState::anonymous(
        Page::Signup,
        "Please log in if you already signed up.",
    ))
}

/// Menu of apps reachable by a signed-in user
#[utoipa::path(
    get,
    path = "/menu",
    tag = "pages",
    responses(
        (status = 200, description = "Menu page-state", body = PageState),
        (status = 401, description = "No token, redirect to /login", body = PageState),
        (status = 403, description = "Invalid or expired token, redirect to /login", body = PageState),
    ),
    security(("token_cookie" = []), ("bearer_auth" = []))
)]
pub async fn menu_page(Extension(user): Extension<AuthenticatedUser>) -> impl IntoResponse {
    let message = format!(
        "Welcome, {}! You can access one of apps listed below.",
        user.username
    );
    Json(PageState::authenticated(Page::Menu, user.username, message))
}

/// App administration page
///
/// The app list is always empty; managing it is outside the gateway.
#[utoipa::path(
    get,
    path = "/admin",
    tag = "pages",
    responses(
        (status = 200, description = "Admin page-state", body = PageState),
        (status = 401, description = "No token, redirect to /login", body = PageState),
        (status = 403, description = "Invalid or expired token, redirect to /login", body = PageState),
    ),
    security(("token_cookie" = []), ("bearer_auth" = []))
)]
pub async fn admin_page(Extension(user): Extension<AuthenticatedUser>) -> impl IntoResponse {
    Json(
        PageState::authenticated(
            Page::Admin,
            user.username,
            "You can add or remove the apps where users can access here.",
        )
        .with_app_list(Vec::new()),
    )
}

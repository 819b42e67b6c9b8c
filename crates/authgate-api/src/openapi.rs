//! OpenAPI document
//!
//! Author: hephaex@gmail.com

use crate::auth::{LoginForm, Page, PageState, SignupForm};
use crate::error::ApiError;
use crate::handlers::{auth, health, pages};
use axum::{response::IntoResponse, Json};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login_handler,
        auth::signup_handler,
        auth::logout_handler,
        pages::login_page,
        pages::signup_page,
        pages::menu_page,
        pages::admin_page,
        health::health_check,
    ),
    components(
        schemas(PageState, Page, LoginForm, SignupForm, ApiError, health::HealthResponse)
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Login, signup and logout"),
        (name = "pages", description = "Page-state for the renderer"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("token"))),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

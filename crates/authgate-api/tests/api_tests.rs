//! API Integration Tests
//!
//! Drive the full router (origin gate, session guard, handlers) against the
//! in-memory credential store.
//!
//! Author: hephaex@gmail.com

use async_trait::async_trait;
use authgate_api::auth::{IdentityClaims, TokenService};
use authgate_api::{create_router, create_router_for_testing, state::AppState, test_config};
use authgate_api::TEST_JWT_SECRET;
use authgate_core::{CredentialStore, NewUser, StoreError, StoreResult, UserRecord};
use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;
use uuid::Uuid;

const NO_STORE: &str = "no-store, no-cache, must-revalidate, private";

/// Helper to create a form-encoded POST
fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_cookie(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, format!("token={token}"))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// The `token` value from a response's Set-Cookie header
fn token_from(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|c| c.split(';').next()?.trim().strip_prefix("token="))
        .map(str::to_string)
}

fn set_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Set-Cookie header")
        .to_str()
        .unwrap()
        .to_string()
}

async fn signup(app: &Router, username: &str, email: &str, password: &str) -> Response<Body> {
    app.clone()
        .oneshot(form_request(
            "/signup",
            &format!("username={username}&email={email}&password={password}"),
        ))
        .await
        .unwrap()
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

// =============================================================================
// Health and static pages
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = create_router_for_testing();

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_root_redirects_to_login() {
    let app = create_router_for_testing();

    let response = app.oneshot(get_request("/")).await.unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
}

#[tokio::test]
async fn test_login_page_state() {
    let app = create_router_for_testing();

    let response = app.oneshot(get_request("/login")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["current_page"], "login");
    assert_eq!(json["is_authenticated"], false);
    assert_eq!(json["username"], "---");
    assert_eq!(
        json["message"],
        "Please sign up if you don't have a user account yet."
    );
}

#[tokio::test]
async fn test_signup_page_state() {
    let app = create_router_for_testing();

    let json = body_json(app.oneshot(get_request("/signup")).await.unwrap()).await;
    assert_eq!(json["current_page"], "signup");
    assert_eq!(json["message"], "Please log in if you already signed up.");
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(get_request("/api-docs/openapi.json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["paths"]["/login"].is_object());
}

// =============================================================================
// Signup and login
// =============================================================================

#[tokio::test]
async fn test_signup_then_menu_with_cookie() {
    let app = create_router_for_testing();

    let response = signup(&app, "alice", "a%40x.com", "pw").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/menu");

    let cookie = set_cookie(&response);
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Max-Age=3600"));

    let json = body_json(response).await;
    assert_eq!(json["message"], "Registered your user account successfully.");
    assert_eq!(json["is_authenticated"], true);

    let token = cookie
        .split(';')
        .next()
        .and_then(|c| c.strip_prefix("token="))
        .unwrap()
        .to_string();

    let menu = app
        .clone()
        .oneshot(get_with_cookie("/menu", &token))
        .await
        .unwrap();
    assert_eq!(menu.status(), StatusCode::OK);

    let json = body_json(menu).await;
    assert_eq!(json["current_page"], "menu");
    assert_eq!(json["is_authenticated"], true);
    assert_eq!(json["username"], "alice");
    assert_eq!(
        json["message"],
        "Welcome, alice! You can access one of apps listed below."
    );
}

#[tokio::test]
async fn test_signup_accepts_json_body() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/signup")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"username":"alice","email":"a@x.com","password":"pw"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(token_from(&response).is_some());
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let app = create_router_for_testing();
    signup(&app, "alice", "a%40x.com", "pw").await;

    let response = signup(&app, "bob", "a%40x.com", "pw2").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(token_from(&response).is_none());

    let json = body_json(response).await;
    assert_eq!(json["current_page"], "signup");
    assert_eq!(
        json["message"],
        "Either username or email exists already. Please try with different username and email."
    );
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let app = create_router_for_testing();
    signup(&app, "alice", "a%40x.com", "pw").await;

    let response = signup(&app, "alice", "b%40x.com", "pw").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signup_missing_fields_rejected() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(form_request("/signup", "username=alice&email=a%40x.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(token_from(&response).is_none());
}

#[tokio::test]
async fn test_login_success_sets_cookie() {
    let app = create_router_for_testing();
    signup(&app, "alice", "a%40x.com", "pw").await;

    let response = app
        .clone()
        .oneshot(form_request("/login", "email=a%40x.com&password=pw"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/menu");

    let token = token_from(&response).expect("token cookie");
    let claims = TokenService::new(TEST_JWT_SECRET, "authgate", 3600)
        .validate(&token)
        .unwrap();
    assert_eq!(claims.username, "alice");
    assert_eq!(claims.email, "a@x.com");
    assert_eq!(claims.exp - claims.iat, 3600);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Welcome, alice! You can access the menu now.");
}

#[tokio::test]
async fn test_login_unknown_email_and_wrong_password() {
    let app = create_router_for_testing();
    signup(&app, "alice", "a%40x.com", "pw").await;

    let unknown = app
        .clone()
        .oneshot(form_request("/login", "email=nobody%40x.com&password=pw"))
        .await
        .unwrap();
    let wrong = app
        .clone()
        .oneshot(form_request("/login", "email=a%40x.com&password=nope"))
        .await
        .unwrap();

    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    assert_eq!(wrong.status(), StatusCode::NOT_FOUND);
    assert!(token_from(&unknown).is_none());
    assert!(token_from(&wrong).is_none());

    let unknown = body_json(unknown).await;
    let wrong = body_json(wrong).await;
    assert_eq!(unknown, wrong);
    assert_eq!(
        unknown["message"],
        "Invalid email or password. Please try again."
    );
}

// =============================================================================
// Logout
// =============================================================================

#[tokio::test]
async fn test_logout_twice_is_identical() {
    let app = create_router_for_testing();

    let first = app
        .clone()
        .oneshot(form_request("/logout", ""))
        .await
        .unwrap();
    let second = app
        .clone()
        .oneshot(form_request("/logout", ""))
        .await
        .unwrap();

    assert_eq!(first.status(), StatusCode::SEE_OTHER);
    assert_eq!(second.status(), first.status());
    assert_eq!(first.headers().get(header::LOCATION).unwrap(), "/login");

    // Cookie is cleared either way
    let cookie = set_cookie(&first);
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("Max-Age=0"));

    let first = body_json(first).await;
    let second = body_json(second).await;
    assert_eq!(first, second);
    assert_eq!(first["message"], "Logged out successfully!");
    assert_eq!(first["username"], "");
    assert_eq!(first["is_authenticated"], false);
}

// =============================================================================
// Session guard
// =============================================================================

#[tokio::test]
async fn test_menu_without_token_is_401() {
    let app = create_router_for_testing();

    let response = app.oneshot(get_request("/menu")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");

    let json = body_json(response).await;
    assert_eq!(json["current_page"], "login");
    assert_eq!(json["message"], "Access denied.");
}

#[tokio::test]
async fn test_menu_with_expired_token_is_403() {
    let app = create_router_for_testing();
    let identity = IdentityClaims {
        user_id: Uuid::new_v4(),
        username: "alice".to_string(),
        email: "a@x.com".to_string(),
    };
    let token = TokenService::new(TEST_JWT_SECRET, "authgate", 3600)
        .issue_at(&identity, now() - 3600 - 1)
        .unwrap();

    let response = app
        .oneshot(get_with_cookie("/menu", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");

    let json = body_json(response).await;
    assert_eq!(json["message"], "Invalid or expired token.");
}

#[tokio::test]
async fn test_admin_with_forged_token_is_403() {
    let app = create_router_for_testing();
    let identity = IdentityClaims {
        user_id: Uuid::new_v4(),
        username: "mallory".to_string(),
        email: "m@x.com".to_string(),
    };
    let token = TokenService::new("some-other-secret", "authgate", 3600)
        .issue(&identity)
        .unwrap();

    let response = app
        .oneshot(get_with_cookie("/admin", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_with_bearer_token() {
    let app = create_router_for_testing();
    let response = signup(&app, "alice", "a%40x.com", "pw").await;
    let token = token_from(&response).unwrap();

    let admin = app
        .oneshot(
            Request::builder()
                .uri("/admin")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(admin.status(), StatusCode::OK);

    let json = body_json(admin).await;
    assert_eq!(json["current_page"], "admin");
    assert_eq!(json["username"], "alice");
    assert_eq!(json["app_list"], serde_json::json!([]));
}

// =============================================================================
// Origin gate
// =============================================================================

#[tokio::test]
async fn test_allowed_origin_admitted_with_cors() {
    let app = create_router_for_testing();
    let origin = "https://github-desktop-test-1.onrender.com";

    let response = app
        .oneshot(
            Request::builder()
                .uri("/login")
                .header(header::ORIGIN, origin)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        origin
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_unknown_origin_rejected_without_side_effects() {
    let app = create_router_for_testing();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/signup")
                .header(header::ORIGIN, "https://evil.example")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("username=alice&email=a%40x.com&password=pw"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(token_from(&response).is_none());
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        NO_STORE
    );

    // The signup never ran, so the same account can still register
    let retry = signup(&app, "alice", "a%40x.com", "pw").await;
    assert_eq!(retry.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_missing_origin_admitted() {
    let app = create_router_for_testing();

    let response = app.oneshot(get_request("/signup")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

// =============================================================================
// Response headers
// =============================================================================

#[tokio::test]
async fn test_every_response_is_uncacheable() {
    let app = create_router_for_testing();

    for request in [
        get_request("/login"),
        get_request("/menu"),
        get_request("/health"),
        form_request("/login", "email=nobody%40x.com&password=pw"),
        form_request("/logout", ""),
    ] {
        let response = app.clone().oneshot(request).await.unwrap();
        let headers = response.headers();

        assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), NO_STORE);
        assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
        assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
    }
}

// =============================================================================
// Store failures
// =============================================================================

struct UnavailableStore;

#[async_trait]
impl CredentialStore for UnavailableStore {
    async fn find_by_email(&self, _email: &str) -> StoreResult<Option<UserRecord>> {
        Err(StoreError::Database("pool timed out".to_string()))
    }

    async fn find_by_username_or_email(
        &self,
        _username: &str,
        _email: &str,
    ) -> StoreResult<Option<UserRecord>> {
        Err(StoreError::Database("pool timed out".to_string()))
    }

    async fn insert_if_absent(&self, _user: NewUser) -> StoreResult<UserRecord> {
        Err(StoreError::Database("pool timed out".to_string()))
    }
}

#[tokio::test]
async fn test_store_failure_is_500_without_token() {
    let state = Arc::new(AppState::new(test_config(), Arc::new(UnavailableStore)));
    let app = create_router(state);

    let login = app
        .clone()
        .oneshot(form_request("/login", "email=a%40x.com&password=pw"))
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(token_from(&login).is_none());

    let registered = signup(&app, "alice", "a%40x.com", "pw").await;
    assert_eq!(registered.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(registered).await;
    assert!(!json["message"].as_str().unwrap().contains("pool timed out"));
}

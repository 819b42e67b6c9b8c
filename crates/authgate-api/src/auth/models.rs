//! Request forms and the page-state view model
//!
//! `PageState` is what the rendering layer receives after every auth
//! operation: which page to show, whether the visitor is signed in, the
//! message to display and the name to greet.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Placeholder shown in place of a username for anonymous visitors
pub const ANONYMOUS_USERNAME: &str = "---";

/// Pages the gateway can direct the renderer to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Login,
    Signup,
    Menu,
    Admin,
}

impl Page {
    /// Route serving this page
    pub fn path(&self) -> &'static str {
        match self {
            Page::Login => "/login",
            Page::Signup => "/signup",
            Page::Menu => "/menu",
            Page::Admin => "/admin",
        }
    }
}

/// Transient view model handed to the renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PageState {
    pub is_authenticated: bool,
    pub current_page: Page,
    pub message: String,
    pub username: String,
    /// Apps manageable from the admin page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_list: Option<Vec<String>>,
}

impl PageState {
    /// Page-state for a visitor without a valid token
    pub fn anonymous(page: Page, message: impl Into<String>) -> Self {
        Self {
            is_authenticated: false,
            current_page: page,
            message: message.into(),
            username: ANONYMOUS_USERNAME.to_string(),
            app_list: None,
        }
    }

    /// Page-state for a signed-in user
    pub fn authenticated(page: Page, username: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            is_authenticated: true,
            current_page: page,
            message: message.into(),
            username: username.into(),
            app_list: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_app_list(mut self, apps: Vec<String>) -> Self {
        self.app_list = Some(apps);
        self
    }
}

/// Login form body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Signup form body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

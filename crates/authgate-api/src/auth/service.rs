//! Authentication flow
//!
//! Orchestrates login, signup and logout on top of the credential store,
//! the password hasher and the token service. Each operation either yields
//! a fresh token with the page-state to show, or an `AuthFlowError` that the
//! handler turns into a status code and page-state.

use super::jwt::{IdentityClaims, TokenError, TokenService};
use super::models::{LoginForm, Page, PageState, SignupForm};
use super::password::{PasswordError, PasswordHasher};
use crate::audit::{audit_log, AuditContext, AuditEvent};
use authgate_core::{CredentialStore, NewUser, StoreError, UserRecord};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use thiserror::Error;

const MSG_INVALID_CREDENTIALS: &str = "Invalid email or password. Please try again.";
const MSG_DUPLICATE: &str =
    "Either username or email exists already. Please try with different username and email.";
const MSG_INTERNAL: &str = "Something went wrong. Please try again later.";

/// Plaintext behind the hash verified for unknown emails
const DUMMY_PASSWORD: &str = "authgate-dummy-password";

/// Authentication flow errors
#[derive(Debug, Error)]
pub enum AuthFlowError {
    #[error("Invalid email or password")]
    CredentialsInvalid,

    #[error("Username or email already registered")]
    DuplicateRegistration,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Credential store failure: {0}")]
    Store(StoreError),

    #[error("Password hashing failure: {0}")]
    Hashing(#[from] PasswordError),

    #[error("Token issuance failure: {0}")]
    Token(#[from] TokenError),
}

impl From<StoreError> for AuthFlowError {
    fn from(err: StoreError) -> Self {
        match err {
            // Lost a signup race; same answer as the pre-check
            StoreError::Conflict => AuthFlowError::DuplicateRegistration,
            other => AuthFlowError::Store(other),
        }
    }
}

impl AuthFlowError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthFlowError::CredentialsInvalid => StatusCode::NOT_FOUND,
            AuthFlowError::DuplicateRegistration | AuthFlowError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            AuthFlowError::Store(_) | AuthFlowError::Hashing(_) | AuthFlowError::Token(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the visitor; internal detail never leaks
    pub fn user_message(&self) -> String {
        match self {
            AuthFlowError::CredentialsInvalid => MSG_INVALID_CREDENTIALS.to_string(),
            AuthFlowError::DuplicateRegistration => MSG_DUPLICATE.to_string(),
            AuthFlowError::InvalidInput(msg) => msg.clone(),
            AuthFlowError::Store(_) | AuthFlowError::Hashing(_) | AuthFlowError::Token(_) => {
                MSG_INTERNAL.to_string()
            }
        }
    }

    /// Attach the page the failure should be rendered on
    pub fn on(self, page: Page) -> AuthRejection {
        AuthRejection { page, error: self }
    }
}

/// A failed auth operation bound to the page that reports it
#[derive(Debug)]
pub struct AuthRejection {
    pub page: Page,
    pub error: AuthFlowError,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let status = self.error.status();
        if status.is_server_error() {
            tracing::error!(error = %self.error, page = ?self.page, "Auth flow failed");
        }

        let body = PageState::anonymous(self.page, self.error.user_message());
        (status, Json(body)).into_response()
    }
}

/// Successful login or signup
#[derive(Debug, Clone)]
pub struct Authenticated {
    /// Token to hand back in the `token` cookie
    pub token: String,
    pub page: PageState,
}

/// Login, signup and logout orchestration
#[derive(Clone)]
pub struct AuthFlow {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
    /// Verified in place of a stored hash when the email is unknown, so
    /// both login failures cost one Argon2 verification
    dummy_hash: Option<Arc<str>>,
}

impl AuthFlow {
    /// Build the flow; hashes the dummy password once with `hasher`
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
    ) -> Self {
        let dummy_hash = match hasher.hash(DUMMY_PASSWORD) {
            Ok(hash) => Some(Arc::from(hash)),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to prepare dummy password hash");
                None
            }
        };

        Self {
            store,
            hasher,
            tokens,
            dummy_hash,
        }
    }

    /// Verify credentials and issue a token
    ///
    /// Unknown email and wrong password produce the same
    /// `CredentialsInvalid`; only the audit record tells them apart.
    pub async fn login(
        &self,
        form: LoginForm,
        context: &AuditContext,
    ) -> Result<Authenticated, AuthFlowError> {
        if form.email.trim().is_empty() || form.password.is_empty() {
            self.audit_login_failure(&form.email, "missing fields", context);
            return Err(AuthFlowError::InvalidInput(
                "Please enter your email and password.".to_string(),
            ));
        }

        let Some(user) = self.store.find_by_email(&form.email).await? else {
            self.burn_verification(form.password).await?;
            self.audit_login_failure(&form.email, "unknown email", context);
            return Err(AuthFlowError::CredentialsInvalid);
        };

        if !self.verify_password(form.password, user.password_hash.clone()).await? {
            self.audit_login_failure(&form.email, "wrong password", context);
            return Err(AuthFlowError::CredentialsInvalid);
        }

        let token = self.tokens.issue(&identity_of(&user))?;

        audit_log(&AuditEvent::LoginSuccess {
            user_id: user.id,
            email: user.email.clone(),
            context: context.clone(),
        });

        let message = format!("Welcome, {}! You can access the menu now.", user.username);
        Ok(Authenticated {
            token,
            page: PageState::authenticated(Page::Menu, user.username, message),
        })
    }

    /// Register a new account and sign it in
    pub async fn signup(
        &self,
        form: SignupForm,
        context: &AuditContext,
    ) -> Result<Authenticated, AuthFlowError> {
        if form.username.trim().is_empty()
            || form.email.trim().is_empty()
            || form.password.is_empty()
        {
            self.audit_signup_failure(&form, "missing fields", context);
            return Err(AuthFlowError::InvalidInput(
                "Please fill in username, email and password.".to_string(),
            ));
        }

        if self
            .store
            .find_by_username_or_email(&form.username, &form.email)
            .await?
            .is_some()
        {
            self.audit_signup_failure(&form, "duplicate", context);
            return Err(AuthFlowError::DuplicateRegistration);
        }

        let password_hash = self.hash_password(form.password.clone()).await?;
        let new_user = NewUser::new(form.username.clone(), form.email.clone(), password_hash);

        let user = match self.store.insert_if_absent(new_user).await {
            Ok(user) => user,
            Err(e) => {
                let err = AuthFlowError::from(e);
                if matches!(err, AuthFlowError::DuplicateRegistration) {
                    self.audit_signup_failure(&form, "duplicate (concurrent insert)", context);
                }
                return Err(err);
            }
        };

        let token = self.tokens.issue(&identity_of(&user))?;

        audit_log(&AuditEvent::SignupSuccess {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            context: context.clone(),
        });

        Ok(Authenticated {
            token,
            page: PageState::authenticated(
                Page::Menu,
                user.username,
                "Registered your user account successfully.",
            ),
        })
    }

    /// Page-state after the token cookie has been cleared
    ///
    /// Always succeeds and returns the same state however often it runs.
    pub fn logout(&self, username: Option<String>, context: &AuditContext) -> PageState {
        audit_log(&AuditEvent::Logout {
            username,
            context: context.clone(),
        });

        PageState::anonymous(Page::Login, "Logged out successfully!").with_username("")
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthFlowError> {
        let hasher = self.hasher.clone();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))??;
        Ok(hash)
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AuthFlowError> {
        let hasher = self.hasher.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| PasswordError::VerificationFailed(e.to_string()))??;
        Ok(matches)
    }

    /// Spend the same hashing work as a real verification and discard
    /// the outcome
    async fn burn_verification(&self, password: String) -> Result<(), AuthFlowError> {
        match &self.dummy_hash {
            Some(hash) => {
                self.verify_password(password, hash.to_string()).await?;
            }
            None => {
                self.hash_password(password).await?;
            }
        }
        Ok(())
    }

    fn audit_login_failure(&self, email: &str, reason: &str, context: &AuditContext) {
        audit_log(&AuditEvent::LoginFailure {
            email: email.to_string(),
            reason: reason.to_string(),
            context: context.clone(),
        });
    }

    fn audit_signup_failure(&self, form: &SignupForm, reason: &str, context: &AuditContext) {
        audit_log(&AuditEvent::SignupFailure {
            username: form.username.clone(),
            email: form.email.clone(),
            reason: reason.to_string(),
            context: context.clone(),
        });
    }
}

fn identity_of(user: &UserRecord) -> IdentityClaims {
    IdentityClaims {
        user_id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
    }
}

//! JWT token issuance and validation
//!
//! Implements HS256-signed tokens carrying the user's identity and a fixed
//! lifetime. There is no server-side record of issued tokens: a token is
//! valid exactly while its signature checks out and `exp` has not passed.

use authgate_core::AuthConfig;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

/// Identity fields embedded in every token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
}

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Token issuer
    pub iss: String,
    /// Subject - user ID
    pub sub: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
    /// User's display name
    pub username: String,
    /// User's email address
    pub email: String,
}

impl Claims {
    /// Recover the identity the token was issued for
    pub fn identity(&self) -> Result<IdentityClaims, TokenError> {
        Ok(IdentityClaims {
            user_id: Uuid::parse_str(&self.sub).map_err(|_| TokenError::InvalidToken)?,
            username: self.username.clone(),
            email: self.email.clone(),
        })
    }
}

/// JWT token generation and validation errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Failed to encode JWT: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid token format")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("System time error: {0}")]
    SystemTimeError(#[from] std::time::SystemTimeError),

    #[error("Token lifetime overflows the clock")]
    LifetimeOverflow,
}

impl TokenError {
    /// Stable code for logs
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::ExpiredToken => "TOKEN_EXPIRED",
            TokenError::InvalidToken | TokenError::InvalidSignature => "TOKEN_INVALID",
            TokenError::EncodingError(_)
            | TokenError::SystemTimeError(_)
            | TokenError::LifetimeOverflow => "TOKEN_INTERNAL",
        }
    }
}

/// Signs and verifies identity tokens
///
/// Keys are derived once from the configured secret and shared read-only by
/// every request for the lifetime of the process.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl_secs: u64,
}

impl TokenService {
    pub fn new(secret: &str, issuer: impl Into<String>, ttl_secs: u64) -> Self {
        let issuer = issuer.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        // Expiry is exact
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            issuer,
            ttl_secs,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret, config.issuer.clone(), config.token_ttl_secs)
    }

    /// Token lifetime in seconds
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Issue a token expiring one TTL from now
    pub fn issue(&self, identity: &IdentityClaims) -> Result<String, TokenError> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        self.issue_at(identity, now)
    }

    /// Issue a token as if it had been minted at `issued_at` (Unix seconds)
    pub fn issue_at(&self, identity: &IdentityClaims, issued_at: u64) -> Result<String, TokenError> {
        let exp = issued_at
            .checked_add(self.ttl_secs)
            .ok_or(TokenError::LifetimeOverflow)?;
        let claims = Claims {
            iss: self.issuer.clone(),
            sub: identity.user_id.to_string(),
            iat: issued_at,
            exp,
            username: identity.username.clone(),
            email: identity.email.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a token and extract its claims
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::ExpiredToken,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::InvalidToken,
            },
        )?;

        Ok(token_data.claims)
    }
}

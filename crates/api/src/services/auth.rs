//! Authentication service.
//!
//! Phone-number login with one-time codes: a code is issued per request,
//! verified at most once within its validity window, and a successful
//! verification mints an opaque bearer token. Code delivery (SMS) is an
//! external collaborator; the issued code is emitted on the log as the
//! development stand-in.

use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use fresh_basket_core::{CodeError, OneTimeCode, Phone, PhoneError};

use crate::models::User;
use crate::store::{Store, StoreError};

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed phone number in the request.
    #[error("invalid phone number: {0}")]
    InvalidPhone(#[from] PhoneError),

    /// Malformed login code in the request.
    #[error("invalid login code: {0}")]
    MalformedCode(#[from] CodeError),

    /// Wrong, already-consumed, or superseded login code.
    #[error("invalid login code")]
    InvalidCode,

    /// The login code fell outside its validity window.
    #[error("login code expired")]
    CodeExpired,

    /// Bearer token does not resolve to a user.
    #[error("invalid bearer token")]
    InvalidToken,

    /// Store failure.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidCode => Self::InvalidCode,
            StoreError::CodeExpired => Self::CodeExpired,
            other => Self::Store(other),
        }
    }
}

/// A verified login: the bearer credential plus the user it belongs to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    /// Opaque bearer token for subsequent requests.
    pub access_token: String,
    /// The authenticated user.
    pub user: User,
}

/// Authentication service.
pub struct AuthService<'a, S> {
    store: &'a S,
    code_ttl: Duration,
}

impl<'a, S: Store> AuthService<'a, S> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a S, code_ttl: Duration) -> Self {
        Self { store, code_ttl }
    }

    /// Issue a one-time login code for a phone number.
    ///
    /// Creates the user on their first request. Each call supersedes any
    /// earlier outstanding code for the same phone.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidPhone` if the phone number is malformed.
    pub async fn send_code(&self, phone: &str) -> Result<Phone, AuthError> {
        let phone = Phone::parse(phone)?;
        let code = OneTimeCode::from_number(rand::rng().random_range(0_u32..10_000));

        let user = self.store.begin_login(&phone, &code, Utc::now()).await?;
        tracing::info!(
            user_id = %user.id,
            phone = %phone,
            code = %code,
            "login code issued (SMS delivery is out of band)"
        );
        Ok(phone)
    }

    /// Verify a one-time code and mint a bearer token.
    ///
    /// The code is cleared on success; verifying the same code a second
    /// time fails.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCode` for a wrong or reused code and
    /// `AuthError::CodeExpired` past the validity window.
    pub async fn verify_code(&self, phone: &str, code: &str) -> Result<AuthSession, AuthError> {
        let phone = Phone::parse(phone)?;
        let code = OneTimeCode::parse(code)?;
        let ttl = chrono::Duration::from_std(self.code_ttl)
            .unwrap_or_else(|_| chrono::Duration::seconds(300));

        let user = self
            .store
            .consume_login_code(&phone, &code, Utc::now(), ttl)
            .await?;

        let access_token = Uuid::new_v4().simple().to_string();
        self.store
            .insert_token(user.id, &access_token, Utc::now())
            .await?;

        tracing::info!(user_id = %user.id, "login verified, bearer token issued");
        Ok(AuthSession { access_token, user })
    }

    /// Resolve a bearer token to its user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is unknown.
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        self.store
            .user_for_token(token)
            .await?
            .ok_or(AuthError::InvalidToken)
    }
}

//! Authentication extractor.
//!
//! Provides an extractor for requiring bearer-token authentication in
//! route handlers.

use axum::{extract::FromRequestParts, http::header, http::request::Parts};

use crate::error::AppError;
use crate::models::User;
use crate::services::AuthService;
use crate::state::AppState;
use crate::store::Store;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     CurrentUser(user): CurrentUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.phone)
/// }
/// ```
pub struct CurrentUser(pub User);

impl<S: Store> FromRequestParts<AppState<S>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing authorization header".to_owned()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("expected a bearer token".to_owned()))?
            .trim();
        if token.is_empty() {
            return Err(AppError::Unauthorized("expected a bearer token".to_owned()));
        }

        let auth = AuthService::new(state.store(), state.config().code_ttl);
        let user = auth.authenticate(token).await?;
        Ok(Self(user))
    }
}

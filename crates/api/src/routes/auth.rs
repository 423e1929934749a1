//! Auth routes.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::services::{AuthService, AuthSession};
use crate::state::AppState;
use crate::store::Store;

/// Request body for `POST /api/auth/send-code`.
#[derive(Debug, Deserialize)]
pub struct SendCodeRequest {
    pub phone: String,
}

/// Response from a code request. The code itself travels over SMS, never
/// in this response.
#[derive(Debug, Serialize)]
pub struct SendCodeResponse {
    pub message: &'static str,
}

/// Request body for `POST /api/auth/verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub phone: String,
    pub code: String,
}

/// Issue a one-time login code for a phone number, creating the user on
/// first contact.
///
/// POST /api/auth/send-code
///
/// # Errors
///
/// Returns `AppError` for a malformed phone number.
pub async fn send_code<S: Store>(
    State(state): State<AppState<S>>,
    Json(body): Json<SendCodeRequest>,
) -> Result<Json<SendCodeResponse>> {
    let auth = AuthService::new(state.store(), state.config().code_ttl);
    auth.send_code(&body.phone).await?;
    Ok(Json(SendCodeResponse {
        message: "code sent",
    }))
}

/// Verify a one-time code and return a bearer token with the user.
///
/// POST /api/auth/verify
///
/// # Errors
///
/// Returns `AppError` for a wrong, reused, or expired code.
pub async fn verify<S: Store>(
    State(state): State<AppState<S>>,
    Json(body): Json<VerifyRequest>,
) -> Result<Json<AuthSession>> {
    let auth = AuthService::new(state.store(), state.config().code_ttl);
    let session = auth.verify_code(&body.phone, &body.code).await?;
    Ok(Json(session))
}

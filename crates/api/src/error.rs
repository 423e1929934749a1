//! Unified error handling.
//!
//! Provides a unified `AppError` type that maps domain errors onto HTTP
//! responses. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::{AuthError, CatalogError, OrderError};
use crate::store::StoreError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Catalog operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Order operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Store operation failed outside a service.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if status_for(&self) == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Request error");
        }

        let status = status_for(&self);
        let message = client_message(&self);

        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::Auth(auth) => match auth {
            AuthError::InvalidPhone(_) | AuthError::MalformedCode(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCode | AuthError::CodeExpired | AuthError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
        AppError::Catalog(catalog) => match catalog {
            CatalogError::NegativePrice { .. }
            | CatalogError::NegativeStock { .. }
            | CatalogError::EmptyExternalId => StatusCode::BAD_REQUEST,
            CatalogError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
        AppError::Order(order) => match order {
            OrderError::EmptyItems | OrderError::EmptyAddress | OrderError::ZeroQuantity => {
                StatusCode::BAD_REQUEST
            }
            OrderError::ProductNotFound(_) => StatusCode::NOT_FOUND,
            OrderError::InsufficientStock { .. } => StatusCode::CONFLICT,
            OrderError::Timeout => StatusCode::REQUEST_TIMEOUT,
            OrderError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
        AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
    }
}

/// Client-facing message. Internal details never leave the server.
fn client_message(err: &AppError) -> String {
    match err {
        AppError::Auth(AuthError::Store(_))
        | AppError::Catalog(CatalogError::Store(_))
        | AppError::Order(OrderError::Store(_))
        | AppError::Store(_)
        | AppError::Internal(_) => "Internal server error".to_owned(),
        AppError::Auth(auth) => auth.to_string(),
        AppError::Catalog(catalog) => catalog.to_string(),
        AppError::Order(order) => order.to_string(),
        AppError::Unauthorized(msg) | AppError::BadRequest(msg) => msg.clone(),
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use fresh_basket_core::ProductId;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCode)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::CodeExpired)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidToken)),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_order_error_status_codes() {
        assert_eq!(
            get_status(AppError::Order(OrderError::ProductNotFound(ProductId::new(
                9
            )))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Order(OrderError::InsufficientStock {
                name: "Milk".to_string(),
                available: 2,
            })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Order(OrderError::Timeout)),
            StatusCode::REQUEST_TIMEOUT
        );
        assert_eq!(
            get_status(AppError::Order(OrderError::EmptyItems)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let err = AppError::Internal("pool exhausted at 10.0.0.5".to_string());
        assert_eq!(client_message(&err), "Internal server error");
    }
}

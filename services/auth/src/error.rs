//! Error type for the authentication service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::repositories::StoreError;

/// Custom error type for authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Request body or field failed validation
    #[error("{0}")]
    Validation(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Missing, malformed or expired bearer token
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Too many login attempts, try again later")]
    TooManyAttempts,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal server error")]
    InternalServerError,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            AuthError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
            AuthError::Store(_) | AuthError::InternalServerError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = if status.is_server_error() {
            if let AuthError::Store(e) = &self {
                error!("User store failure: {}", e);
            }
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for authentication results
pub type AuthResult<T> = Result<T, AuthError>;

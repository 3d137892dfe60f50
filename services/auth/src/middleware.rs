//! Middleware for JWT token validation and authentication

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use tracing::warn;
use uuid::Uuid;

use crate::{AppState, error::AuthError};

/// Identity taken from a validated access token
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
}

/// Extract and validate the bearer token, exposing [`AuthUser`] to handlers
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or(AuthError::Unauthorized)?;

    let claims = state.jwt_service.validate_token(token).map_err(|e| {
        warn!("Failed to validate token: {}", e);
        AuthError::Unauthorized
    })?;

    req.extensions_mut().insert(AuthUser {
        id: claims.sub,
        username: claims.username,
    });

    Ok(next.run(req).await)
}

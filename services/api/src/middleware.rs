//! Bearer token extraction for the issue endpoints
//!
//! Reporting an issue does not require an account, so the token is optional;
//! but a token that is sent must be valid.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::warn;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Authenticated user information
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub is_admin: bool,
}

/// Caller identity, present only when an `Authorization` header was sent
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

#[async_trait]
impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(OptionalAuthUser(None));
        }

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|e| {
                    warn!("Malformed Authorization header: {}", e);
                    ApiError::Unauthorized
                })?;

        let claims = state
            .jwt_service
            .validate_token(bearer.token())
            .map_err(|e| {
                warn!("Failed to validate token: {}", e);
                ApiError::Unauthorized
            })?;

        Ok(OptionalAuthUser(Some(AuthUser {
            id: claims.sub,
            username: claims.username,
            is_admin: claims.admin,
        })))
    }
}

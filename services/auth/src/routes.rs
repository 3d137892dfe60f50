//! Authentication service routes

use axum::{
    Extension, Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use common::password;
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::{
    AppState,
    error::{AuthError, AuthResult},
    middleware::{AuthUser, auth_middleware},
    models::{LoginRequest, NewUser, RegisterRequest, UserResponse},
    validation::{validate_email, validate_password, validate_username},
};

/// Response for a successful login
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserResponse,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(current_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// Account registration endpoint
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse> {
    let Json(payload) = payload.map_err(|e| AuthError::Validation(e.body_text()))?;

    validate_username(&payload.username)
        .and_then(|_| validate_email(&payload.email))
        .and_then(|_| validate_password(&payload.password))
        .map_err(|message| {
            warn!("Rejected registration for {}: {}", payload.username, message);
            AuthError::Validation(message)
        })?;

    let new_user = NewUser::new(payload.username, payload.email, &payload.password, false)
        .map_err(|e| {
            error!("Failed to hash password: {}", e);
            AuthError::InternalServerError
        })?;

    let user = state.users.create(&new_user).await?;
    info!("Registered user {} ({})", user.username, user.id);

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse> {
    let Json(payload) = payload.map_err(|e| AuthError::Validation(e.body_text()))?;
    info!("Login attempt for user: {}", payload.username);

    let limiter_key = format!("login:{}", payload.username);
    if !state.rate_limiter.is_allowed(&limiter_key).await {
        warn!("Too many login attempts for {}", payload.username);
        return Err(AuthError::TooManyAttempts);
    }

    let Some(user) = state
        .users
        .find_by_username_or_email(&payload.username)
        .await?
    else {
        password::verify_dummy(&payload.password);
        warn!("Login failed, unknown user: {}", payload.username);
        return Err(AuthError::InvalidCredentials);
    };

    let verified = user.verify_password(&payload.password).map_err(|e| {
        error!("Stored password hash for {} is unusable: {}", user.id, e);
        AuthError::InternalServerError
    })?;
    if !verified {
        warn!("Login failed, wrong password for: {}", payload.username);
        return Err(AuthError::InvalidCredentials);
    }

    state.rate_limiter.reset(&limiter_key).await;

    let access_token = state
        .jwt_service
        .generate_access_token(user.id, &user.username, user.is_admin)
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            AuthError::InternalServerError
        })?;

    let response = TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
        user: UserResponse::from(&user),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Profile of the token holder
pub async fn current_user(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AuthResult<Json<UserResponse>> {
    debug!("Profile lookup for {}", auth_user.username);

    // the account may have been removed after the token was issued
    let user = state
        .users
        .find_by_id(auth_user.id)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    Ok(Json(UserResponse::from(&user)))
}

#[cfg(test)]
mod tests;

//! API service routes

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::{
    broadcast::IssueEvent,
    error::{ApiError, ApiResult},
    middleware::OptionalAuthUser,
    models::{CreateIssueRequest, IssueQuery, IssueValidationError},
    repositories::StoreError,
    state::AppState,
    ws,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/issues", get(list_issues).post(create_issue))
        .route("/ws", get(ws::issue_events))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.issues.ping().await {
        (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "api-service"
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "service": "api-service"
            })),
        )
    }
}

/// Issues within a radius of a point, optionally filtered by status and category
pub async fn list_issues(
    State(state): State<AppState>,
    query: Result<Query<IssueQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query.map_err(|e| {
        warn!("Rejected issue query: {}", e);
        IssueValidationError::InvalidParameters
    })?;

    let filter = query.into_filter().map_err(|e| {
        warn!("Rejected issue query: {}", e);
        e
    })?;

    let issues = state.issues.find_within(&filter).await.map_err(|e| {
        error!("Failed to query issues: {}", e);
        e
    })?;

    Ok(Json(issues))
}

/// Report a new issue and broadcast it to real-time subscribers
pub async fn create_issue(
    State(state): State<AppState>,
    OptionalAuthUser(reporter): OptionalAuthUser,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = payload.map_err(|e| {
        warn!("Rejected issue payload: {}", e);
        json_rejection(&e)
    })?;
    let payload = CreateIssueRequest::from_json(body).map_err(|e| {
        warn!("Rejected issue payload: {}", e);
        e
    })?;

    if let Some(user) = &reporter {
        info!(user = %user.username, admin = user.is_admin, "Authenticated issue report");
    }

    let new_issue = payload
        .into_new_issue(reporter.map(|user| user.id))
        .map_err(|e| {
            warn!("Rejected issue payload: {}", e);
            e
        })?;

    let issue = state.issues.create(&new_issue).await.map_err(|e| {
        match &e {
            StoreError::UnknownUser => warn!("Rejected issue for unknown user {:?}", new_issue.user_id),
            _ => error!("Error creating issue: {}", e),
        }
        e
    })?;

    state.broadcaster.publish(IssueEvent::NewIssue(issue.clone()));

    Ok((StatusCode::CREATED, Json(issue)))
}

/// Client-facing message for a body axum could not read as JSON
fn json_rejection(rejection: &JsonRejection) -> ApiError {
    let message = match rejection {
        JsonRejection::MissingJsonContentType(_) => "Expected Content-Type: application/json",
        JsonRejection::JsonSyntaxError(_) => "Malformed JSON body",
        _ => "Invalid request body",
    };
    ApiError::BadRequest(message.to_string())
}

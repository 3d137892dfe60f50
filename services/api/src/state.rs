//! Application state shared across handlers

use std::sync::Arc;

use common::jwt::JwtService;

use crate::{broadcast::IssueBroadcaster, repositories::IssueStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub issues: Arc<dyn IssueStore>,
    pub broadcaster: IssueBroadcaster,
    pub jwt_service: JwtService,
}

//! Repositories for database operations
//!
//! Handlers talk to storage through [`IssueStore`] so the HTTP layer can be
//! exercised without a database.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Issue, IssueFilter, NewIssue};

pub mod issue;

pub use issue::IssueRepository;

/// Errors surfaced by issue storage
#[derive(Error, Debug)]
pub enum StoreError {
    /// The issue references a user that does not exist
    #[error("Referenced user does not exist")]
    UnknownUser,

    /// A stored row could not be mapped back into an issue
    #[error("Stored issue is invalid: {0}")]
    Corrupt(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Storage operations needed by the issue endpoints
#[async_trait]
pub trait IssueStore: Send + Sync {
    /// Issues within `filter.radius_meters` of `filter.center`, newest first
    async fn find_within(&self, filter: &IssueFilter) -> Result<Vec<Issue>, StoreError>;

    /// Insert an issue, returning it with server-assigned fields
    async fn create(&self, new_issue: &NewIssue) -> Result<Issue, StoreError>;

    /// Whether the backing store is reachable
    async fn ping(&self) -> bool;
}

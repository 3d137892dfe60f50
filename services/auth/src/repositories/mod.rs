//! Data access for the authentication service

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewUser, User};

pub mod user;

pub use user::UserRepository;

/// Errors surfaced by a [`UserStore`]
#[derive(Error, Debug)]
pub enum StoreError {
    /// Username or email is already taken
    #[error("Username or email already registered")]
    Conflict,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence for user accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, new_user: &NewUser) -> Result<User, StoreError>;

    /// Look a user up by username first, then by email
    async fn find_by_username_or_email(&self, identifier: &str)
    -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn count(&self) -> Result<i64, StoreError>;
}

//! User model and related functionality

use chrono::{DateTime, Utc};
use common::password::{self, PasswordError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity
///
/// Not serializable: responses go through [`UserResponse`] so the password
/// hash never leaves the service.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub hash_version: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Check a plaintext password against the stored hash
    pub fn verify_password(&self, password: &str) -> Result<bool, PasswordError> {
        password::verify_password(&self.password_hash, password)
    }
}

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

/// User ready to be inserted, password already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: &str,
        is_admin: bool,
    ) -> Result<Self, PasswordError> {
        Ok(Self {
            username: username.into(),
            email: email.into(),
            password_hash: password::hash_password(password)?,
            is_admin,
        })
    }
}

/// Request body for `POST /auth/register`
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Username or email
    pub username: String,
    pub password: String,
}

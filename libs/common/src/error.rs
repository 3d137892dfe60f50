//! Custom error types for the common library
//!
//! This module defines the database error type shared by both services.

use sqlx::Error as SqlxError;
use sqlx::migrate::MigrateError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(#[from] MigrateError),

    /// The spatial extension is missing or its functions do not evaluate
    #[error("PostGIS unavailable: {0}")]
    Spatial(#[source] SqlxError),

    /// Tables the services rely on are not present
    #[error("Missing tables: {0:?}")]
    MissingTables(Vec<String>),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

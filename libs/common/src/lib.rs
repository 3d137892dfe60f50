//! Common library for the CivicTrack services
//!
//! This crate provides functionality shared by the auth and api services:
//! database connectivity and migrations, token signing, password hashing,
//! listener settings and the optional Redis publisher.
//!
//! ```rust,no_run
//! use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let pool = init_pool(&config).await?;
//!     run_migrations(&pool).await?;
//!     assert!(health_check(&pool).await?);
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod error;
pub mod jwt;
pub mod password;
pub mod pubsub;
pub mod settings;

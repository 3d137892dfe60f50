use anyhow::Result;
use std::{sync::Arc, time::Duration};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod bootstrap;
mod error;
mod middleware;
mod models;
mod rate_limiter;
mod repositories;
mod routes;
#[cfg(test)]
mod test_support;
mod validation;

use common::{
    database::{self, DatabaseConfig},
    jwt::{JwtConfig, JwtService},
    settings::ServerSettings,
};
use tokio::net::TcpListener;

use crate::{
    bootstrap::AdminSettings,
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::{UserRepository, UserStore},
};

/// How often stale login limiter entries are dropped
const LIMITER_PURGE_INTERVAL: Duration = Duration::from_secs(600);

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub jwt_service: JwtService,
    pub rate_limiter: RateLimiter,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("CivicTrack auth service startup");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool).await?;

    let users: Arc<dyn UserStore> = Arc::new(UserRepository::new(pool));
    let admin_settings = AdminSettings::load()?;
    if let Err(e) = bootstrap::seed_admin(users.as_ref(), &admin_settings).await {
        error!("Admin bootstrap failed: {}", e);
        return Err(e);
    }

    let rate_limiter = RateLimiter::new(RateLimiterConfig::default());
    let limits = rate_limiter.config();
    info!(
        "Login limited to {} attempts per {}s, ban {}s",
        limits.max_attempts, limits.window_seconds, limits.ban_duration_seconds
    );
    spawn_limiter_purge(rate_limiter.clone());

    let app_state = AppState {
        users,
        jwt_service: JwtService::new(JwtConfig::from_env()),
        rate_limiter,
    };

    info!("Authentication service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let settings = ServerSettings::load(Some("AUTH"), 3000)?;
    let listener = TcpListener::bind(settings.bind_address()).await?;
    info!("Authentication service listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn spawn_limiter_purge(rate_limiter: RateLimiter) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(LIMITER_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            rate_limiter.purge_expired().await;
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down authentication service");
}

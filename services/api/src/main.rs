use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod broadcast;
mod error;
mod middleware;
mod models;
mod repositories;
mod routes;
mod state;
mod ws;

use common::{
    database::{self, DatabaseConfig},
    jwt::{JwtConfig, JwtService},
    pubsub::{RedisConfig, RedisPublisher},
    settings::ServerSettings,
};
use tokio::net::TcpListener;

use crate::{broadcast::IssueBroadcaster, repositories::IssueRepository, state::AppState};

/// How many events a slow WebSocket client may fall behind before skipping
const BROADCAST_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("CivicTrack API startup");

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
    if let Err(e) = database::verify_database(&pool).await {
        error!("Database check failed: {}", e);
        return Err(e.into());
    }
    info!("Database check passed successfully");

    let broadcaster = IssueBroadcaster::new(BROADCAST_CAPACITY, redis_publisher().await);

    let app_state = AppState {
        issues: Arc::new(IssueRepository::new(pool)),
        broadcaster,
        jwt_service: JwtService::new(JwtConfig::from_env()),
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let settings = ServerSettings::load(None, 0)?;
    let listener = TcpListener::bind(settings.bind_address()).await?;
    info!("API service listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Optional Redis fan-out for `new_issue` events
async fn redis_publisher() -> Option<RedisPublisher> {
    let Some(config) = RedisConfig::from_env() else {
        info!("REDIS_URL not set, issue events stay in-process");
        return None;
    };

    let publisher = match RedisPublisher::new(&config) {
        Ok(publisher) => publisher,
        Err(e) => {
            warn!("Invalid Redis configuration, issue events stay in-process: {}", e);
            return None;
        }
    };

    match publisher.health_check().await {
        Ok(true) => info!("Redis connection successful"),
        Ok(false) | Err(_) => warn!("Redis is not reachable yet; publishing will be retried per event"),
    }

    Some(publisher)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down API service");
}

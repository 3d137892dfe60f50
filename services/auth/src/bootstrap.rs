//! First-run admin account

use anyhow::Result;
use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    models::{NewUser, User},
    repositories::{StoreError, UserStore},
};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@civictrack.org";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Credentials for the seeded admin, read from `ADMIN_USERNAME`,
/// `ADMIN_EMAIL` and `ADMIN_PASSWORD`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AdminSettings {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl AdminSettings {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("username", DEFAULT_ADMIN_USERNAME)?
            .set_default("email", DEFAULT_ADMIN_EMAIL)?
            .set_default("password", DEFAULT_ADMIN_PASSWORD)?
            .add_source(Environment::with_prefix("ADMIN"))
            .build()?
            .try_deserialize()
    }

    pub fn uses_default_password(&self) -> bool {
        self.password == DEFAULT_ADMIN_PASSWORD
    }
}

/// Create the admin account when no user exists yet
///
/// Returns the created admin, or `None` when the store already had users.
pub async fn seed_admin(store: &dyn UserStore, settings: &AdminSettings) -> Result<Option<User>> {
    let existing = store.count().await?;
    if existing > 0 {
        info!("Found {} existing users, skipping admin bootstrap", existing);
        return Ok(None);
    }

    let new_admin = NewUser::new(&settings.username, &settings.email, &settings.password, true)?;
    let admin = match store.create(&new_admin).await {
        Ok(admin) => admin,
        // another instance seeded first
        Err(StoreError::Conflict) => {
            info!("Admin user {} already exists", settings.username);
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    info!("Created admin user: {}", admin.username);
    if settings.uses_default_password() {
        warn!("Admin user is using the default password; set ADMIN_PASSWORD");
    }

    Ok(Some(admin))
}

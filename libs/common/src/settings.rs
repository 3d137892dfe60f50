//! Listener settings loaded through the `config` crate

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Where a service binds its HTTP listener
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    /// `0` asks the OS for any free port
    pub port: u16,
}

impl ServerSettings {
    /// Load settings from the environment
    ///
    /// With a prefix such as `AUTH`, the variables read are `AUTH_HOST` and
    /// `AUTH_PORT`; without one they are plain `HOST` and `PORT`.
    pub fn load(prefix: Option<&str>, default_port: u16) -> Result<Self, ConfigError> {
        let environment = match prefix {
            Some(prefix) => Environment::with_prefix(prefix),
            None => Environment::default(),
        }
        .try_parsing(true);

        Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", i64::from(default_port))?
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    /// `host:port` string accepted by `TcpListener::bind`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

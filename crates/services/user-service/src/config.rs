//! User service configuration.

use std::env;

use common::{DatabaseConfig, ServiceConfig};

/// User service configuration.
#[derive(Debug, Clone)]
pub struct UserServiceConfig {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
}

impl UserServiceConfig {
    /// Load configuration from environment variables, falling back to the
    /// shared defaults.
    pub fn from_env() -> Self {
        let mut service = ServiceConfig {
            service_name: "user-service".to_string(),
            ..ServiceConfig::default()
        };
        if let Ok(host) = env::var("USER_SERVICE_HOST") {
            service.host = host;
        }
        if let Some(port) = env::var("USER_SERVICE_PORT").ok().and_then(|p| p.parse().ok()) {
            service.port = port;
        }
        if let Ok(level) = env::var("RUST_LOG") {
            service.log_level = level;
        }

        let mut database = DatabaseConfig::default();
        if let Ok(url) = env::var("USER_SERVICE_DATABASE_URL").or_else(|_| env::var("DATABASE_URL"))
        {
            database.url = url;
        }

        Self { service, database }
    }
}

impl Default for UserServiceConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                service_name: "user-service".to_string(),
                ..ServiceConfig::default()
            },
            database: DatabaseConfig::default(),
        }
    }
}

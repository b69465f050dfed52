//! Server configuration
//!
//! Every field can be supplied through the environment with an `API_` prefix
//! (`API_PORT`, `API_JWT_SECRET`, ...); unset fields fall back to the defaults
//! below, so a bare `freight-api` starts against a local database.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "defaults::host")]
    pub host: String,
    #[serde(default = "defaults::port")]
    pub port: u16,
    /// Signing secret for bearer tokens. The default is for development only.
    #[serde(default = "defaults::jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "defaults::jwt_expiration_secs")]
    pub jwt_expiration_secs: u64,
    #[serde(default = "defaults::database_url")]
    pub database_url: String,
    #[serde(default = "defaults::log_level")]
    pub log_level: String,
}

mod defaults {
    pub fn host() -> String {
        "0.0.0.0".to_string()
    }

    pub fn port() -> u16 {
        8080
    }

    pub fn jwt_secret() -> String {
        "dev-secret-change-in-production".to_string()
    }

    pub fn jwt_expiration_secs() -> u64 {
        3600
    }

    pub fn database_url() -> String {
        std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/freight".to_string())
    }

    pub fn log_level() -> String {
        "info".to_string()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::port(),
            jwt_secret: defaults::jwt_secret(),
            jwt_expiration_secs: defaults::jwt_expiration_secs(),
            database_url: defaults::database_url(),
            log_level: defaults::log_level(),
        }
    }
}

impl ApiConfig {
    /// Reads `API_`-prefixed environment variables over the defaults.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_local_dev() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.jwt_expiration_secs, 3600);
    }
}

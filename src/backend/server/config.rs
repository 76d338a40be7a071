/**
 * Server Configuration
 *
 * `ServerConfig` is read from environment variables (a `.env` file is loaded
 * by the binary through `dotenv`) and can be overlaid by a TOML file named in
 * `TRIPCOLLAB_CONFIG`. Values set in the file win over the environment.
 *
 * | Variable | Default |
 * |---|---|
 * | `DATABASE_URL` | unset: in-memory storage |
 * | `SERVER_PORT` | 3000 |
 * | `LOCK_TTL_SECS` | 180 |
 * | `JWT_SECRET` | required |
 * | `LEASE_SWEEP_INTERVAL_SECS` | 300 |
 *
 * The database is optional: when it is missing or unreachable the server
 * logs a warning and runs on in-memory storage.
 */

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use crate::backend::lock::DEFAULT_LOCK_TTL;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing value: {0}")]
    MissingValue(&'static str),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_url: Option<String>,
    pub port: u16,
    pub lock_ttl: Duration,
    pub jwt_secret: String,
    pub sweep_interval: Duration,
}

impl ServerConfig {
    /// Create a new ServerConfigBuilder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Load configuration from the environment and the optional TOML overlay
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = ServerConfigBuilder::from_env_vars(|key| std::env::var(key).ok())?;
        if let Ok(path) = std::env::var("TRIPCOLLAB_CONFIG") {
            builder = builder.overlay_file(Path::new(&path))?;
        }
        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lock_ttl.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "LOCK_TTL_SECS",
                value: "0".to_string(),
            });
        }
        if self.sweep_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "LEASE_SWEEP_INTERVAL_SECS",
                value: "0".to_string(),
            });
        }
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingValue("JWT_SECRET"));
        }
        Ok(())
    }
}

/// Values accepted in the TOML overlay
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    database_url: Option<String>,
    port: Option<u16>,
    lock_ttl_secs: Option<u64>,
    jwt_secret: Option<String>,
    sweep_interval_secs: Option<u64>,
}

/// Builder for ServerConfig
#[derive(Debug, Default, Clone)]
pub struct ServerConfigBuilder {
    database_url: Option<String>,
    port: Option<u16>,
    lock_ttl: Option<Duration>,
    jwt_secret: Option<String>,
    sweep_interval: Option<Duration>,
}

fn parse_var<T: std::str::FromStr>(key: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError> {
    value
        .filter(|value| !value.trim().is_empty())
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidValue { key, value })
        })
        .transpose()
}

impl ServerConfigBuilder {
    /// Seed the builder from environment-style lookups
    pub fn from_env_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            port: parse_var("SERVER_PORT", lookup("SERVER_PORT"))?,
            lock_ttl: parse_var::<u64>("LOCK_TTL_SECS", lookup("LOCK_TTL_SECS"))?.map(Duration::from_secs),
            jwt_secret: lookup("JWT_SECRET"),
            sweep_interval: parse_var::<u64>("LEASE_SWEEP_INTERVAL_SECS", lookup("LEASE_SWEEP_INTERVAL_SECS"))?
                .map(Duration::from_secs),
        })
    }

    /// Apply a TOML document on top of the current values
    pub fn overlay_toml(mut self, source: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(source)?;
        if file.database_url.is_some() {
            self.database_url = file.database_url;
        }
        if let Some(port) = file.port {
            self.port = Some(port);
        }
        if let Some(secs) = file.lock_ttl_secs {
            self.lock_ttl = Some(Duration::from_secs(secs));
        }
        if file.jwt_secret.is_some() {
            self.jwt_secret = file.jwt_secret;
        }
        if let Some(secs) = file.sweep_interval_secs {
            self.sweep_interval = Some(Duration::from_secs(secs));
        }
        Ok(self)
    }

    pub fn overlay_file(self, path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!("Loading configuration overlay from {}", path.display());
        self.overlay_toml(&source)
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn lock_ttl(mut self, ttl: Duration) -> Self {
        self.lock_ttl = Some(ttl);
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = Some(interval);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        let config = ServerConfig {
            database_url: self.database_url,
            port: self.port.unwrap_or(DEFAULT_PORT),
            lock_ttl: self.lock_ttl.unwrap_or(DEFAULT_LOCK_TTL),
            jwt_secret: self.jwt_secret.ok_or(ConfigError::MissingValue("JWT_SECRET"))?,
            sweep_interval: self.sweep_interval.unwrap_or(DEFAULT_SWEEP_INTERVAL),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Connect to PostgreSQL and run migrations
///
/// # Returns
///
/// - `Some(PgPool)` if the database is reachable
/// - `None` if no URL is configured or the connection fails
///
/// Failures are logged and never stop the server: it falls back to
/// in-memory storage.
pub async fn load_database(config: &ServerConfig) -> Option<PgPool> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set. Plans and leases will be kept in memory.");
        return None;
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Falling back to in-memory storage.");
            return None;
        }
    };

    tracing::info!("Running database migrations...");
    if let Err(e) = sqlx::migrate!().run(&pool).await {
        tracing::error!("Failed to run database migrations: {}", e);
        tracing::warn!("Continuing without migrations - database might not be up to date");
    } else {
        tracing::info!("Database migrations completed successfully");
    }

    Some(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfigBuilder::from_env_vars(env(&[("JWT_SECRET", "s")]))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.lock_ttl, Duration::from_secs(180));
        assert_eq!(config.sweep_interval, DEFAULT_SWEEP_INTERVAL);
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn test_env_values() {
        let config = ServerConfigBuilder::from_env_vars(env(&[
            ("JWT_SECRET", "s"),
            ("SERVER_PORT", "8080"),
            ("LOCK_TTL_SECS", "30"),
            ("DATABASE_URL", "postgres://localhost/trip"),
        ]))
        .unwrap()
        .build()
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.lock_ttl, Duration::from_secs(30));
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/trip"));
    }

    #[test]
    fn test_invalid_port() {
        assert_matches!(
            ServerConfigBuilder::from_env_vars(env(&[("SERVER_PORT", "http")])),
            Err(ConfigError::InvalidValue { key: "SERVER_PORT", .. })
        );
    }

    #[test]
    fn test_validation() {
        assert_matches!(
            ServerConfig::builder().build(),
            Err(ConfigError::MissingValue("JWT_SECRET"))
        );
        assert_matches!(
            ServerConfig::builder().jwt_secret(" ").build(),
            Err(ConfigError::MissingValue("JWT_SECRET"))
        );
        assert_matches!(
            ServerConfig::builder().jwt_secret("s").lock_ttl(Duration::ZERO).build(),
            Err(ConfigError::InvalidValue { key: "LOCK_TTL_SECS", .. })
        );
    }

    #[test]
    fn test_toml_overlay_wins() {
        let config = ServerConfigBuilder::from_env_vars(env(&[("JWT_SECRET", "env"), ("SERVER_PORT", "1000")]))
            .unwrap()
            .overlay_toml("port = 4000\nlock_ttl_secs = 60\n")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.lock_ttl, Duration::from_secs(60));
        assert_eq!(config.jwt_secret, "env");
    }

    #[test]
    fn test_toml_rejects_unknown_keys() {
        assert_matches!(
            ServerConfig::builder().overlay_toml("lock_ttl = 5"),
            Err(ConfigError::Toml(_))
        );
    }
}

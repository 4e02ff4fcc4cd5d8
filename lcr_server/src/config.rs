//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use lcr::{LobbyConfig, auth::MIN_SECRET_LEN, store::DatabaseConfig};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    str::FromStr,
};

/// Default HTTP listener
pub const DEFAULT_BIND: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000);

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Where game snapshots live
    pub storage: StorageConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Lobby behavior
    pub lobby: LobbyConfig,
    /// Prometheus exporter listener, disabled when unset
    pub metrics_bind: Option<SocketAddr>,
}

/// Snapshot store selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// Process-local store; games are lost on restart
    InMemory,
    /// PostgreSQL `games` table
    Postgres(DatabaseConfig),
}

/// Security-related configuration
#[derive(Clone)]
pub struct SecurityConfig {
    /// JWT signing secret (required)
    pub jwt_secret: String,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(
            |key| std::env::var(key).ok(),
            bind_override,
            database_url_override,
        )
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value.
    pub fn from_lookup<F>(
        lookup: F,
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Bind address
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_var_or(&lookup, "SERVER_BIND", DEFAULT_BIND)?,
        };

        // Storage: PostgreSQL only when a database URL is given
        let storage = match database_url_override.or_else(|| lookup("DATABASE_URL")) {
            Some(database_url) if !database_url.is_empty() => {
                let defaults = DatabaseConfig::new(database_url);
                StorageConfig::Postgres(DatabaseConfig {
                    max_connections: parse_var_or(
                        &lookup,
                        "DB_MAX_CONNECTIONS",
                        defaults.max_connections,
                    )?,
                    min_connections: parse_var_or(
                        &lookup,
                        "DB_MIN_CONNECTIONS",
                        defaults.min_connections,
                    )?,
                    connection_timeout_secs: parse_var_or(
                        &lookup,
                        "DB_CONNECTION_TIMEOUT_SECS",
                        defaults.connection_timeout_secs,
                    )?,
                    idle_timeout_secs: parse_var_or(
                        &lookup,
                        "DB_IDLE_TIMEOUT_SECS",
                        defaults.idle_timeout_secs,
                    )?,
                    max_lifetime_secs: parse_var_or(
                        &lookup,
                        "DB_MAX_LIFETIME_SECS",
                        defaults.max_lifetime_secs,
                    )?,
                    ..defaults
                })
            }
            _ => StorageConfig::InMemory,
        };

        // Security configuration (REQUIRED)
        let jwt_secret = lookup("JWT_SECRET").ok_or_else(|| ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        let defaults = LobbyConfig::default();
        let lobby = LobbyConfig {
            auto_play_on_start: parse_var_or(
                &lookup,
                "AUTO_PLAY_ON_START",
                defaults.auto_play_on_start,
            )?,
            max_auto_turns: parse_var_or(&lookup, "MAX_AUTO_TURNS", defaults.max_auto_turns)?,
            min_bots: parse_var_or(&lookup, "BOTS_MIN", defaults.min_bots)?,
            max_bots: parse_var_or(&lookup, "BOTS_MAX", defaults.max_bots)?,
        };

        let metrics_bind = match lookup("METRICS_BIND") {
            Some(value) if !value.is_empty() => Some(parse_value("METRICS_BIND", &value)?),
            _ => None,
        };

        Ok(ServerConfig {
            bind,
            storage,
            security: SecurityConfig { jwt_secret },
            lobby,
            metrics_bind,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: format!("Must be at least {MIN_SECRET_LEN} characters (128-bit security)"),
            });
        }

        if let StorageConfig::Postgres(database) = &self.storage {
            database.validate().map_err(|reason| ConfigError::Invalid {
                var: "DATABASE_URL".to_string(),
                reason,
            })?;
        }

        if self.lobby.max_auto_turns == 0 {
            return Err(ConfigError::Invalid {
                var: "MAX_AUTO_TURNS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.lobby.min_bots > self.lobby.max_bots {
            return Err(ConfigError::Invalid {
                var: "BOTS_MIN".to_string(),
                reason: format!("Cannot exceed BOTS_MAX ({})", self.lobby.max_bots),
            });
        }

        self.lobby
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                var: "BOTS_MAX".to_string(),
                reason,
            })?;

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server bind address ({})", self.bind),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse variable `key` if set, otherwise fall back to `default`
fn parse_var_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => parse_value(key, &value),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var: key.to_string(),
        reason: format!("Could not parse '{value}'"),
    })
}

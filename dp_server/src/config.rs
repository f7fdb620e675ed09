//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated
//! configuration.

use draw_poker::table::TableConfig;
use std::net::SocketAddr;

/// Complete server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address.
    pub bind: SocketAddr,
    /// Defaults applied to every table created without overrides.
    pub table_defaults: TableDefaultsConfig,
    /// Number of tables to create on startup.
    pub num_tables: usize,
    /// How many chat messages the in-memory log retains.
    pub chat_backlog: usize,
}

/// Default table configuration.
#[derive(Debug, Clone)]
pub struct TableDefaultsConfig {
    /// Maximum players per table.
    pub max_players: usize,
    /// Chips granted to a player joining without an explicit buy-in.
    pub default_buy_in: u32,
    /// Smallest allowed opening bet.
    pub min_open_bet: u32,
    /// Seconds before the active player is auto-folded (0 disables).
    pub turn_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// CLI overrides (when given) win over the environment, which wins
    /// over the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but unparseable, or if
    /// the resulting configuration is inconsistent.
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        num_tables_override: Option<usize>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => match std::env::var("SERVER_BIND") {
                Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                    var: "SERVER_BIND".to_string(),
                    reason: format!("{raw:?} is not a socket address"),
                })?,
                Err(_) => default_bind(),
            },
        };

        let table_defaults = TableDefaultsConfig {
            max_players: parse_env_or("TABLE_MAX_PLAYERS", 8),
            default_buy_in: parse_env_or("TABLE_DEFAULT_BUY_IN", 100),
            min_open_bet: parse_env_or("TABLE_MIN_OPEN_BET", 1),
            turn_timeout_secs: parse_env_or("TABLE_TURN_TIMEOUT_SECS", 0),
        };

        let num_tables = num_tables_override.unwrap_or_else(|| parse_env_or("MAX_TABLES", 1));
        let chat_backlog = parse_env_or("CHAT_BACKLOG", 200);

        let config = ServerConfig {
            bind,
            table_defaults,
            num_tables,
            chat_backlog,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table_defaults.max_players == 0 {
            return Err(ConfigError::Invalid {
                var: "TABLE_MAX_PLAYERS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.table_defaults.default_buy_in == 0 {
            return Err(ConfigError::Invalid {
                var: "TABLE_DEFAULT_BUY_IN".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.table_defaults.min_open_bet == 0
            || self.table_defaults.min_open_bet > self.table_defaults.default_buy_in
        {
            return Err(ConfigError::Invalid {
                var: "TABLE_MIN_OPEN_BET".to_string(),
                reason: format!(
                    "Must be between 1 and the default buy-in ({})",
                    self.table_defaults.default_buy_in
                ),
            });
        }

        if self.chat_backlog == 0 {
            return Err(ConfigError::Invalid {
                var: "CHAT_BACKLOG".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Table config for the `index`-th startup table.
    #[must_use]
    pub fn table_config(&self, index: usize) -> TableConfig {
        TableConfig {
            name: if index == 0 {
                "Main Table".to_string()
            } else {
                format!("Table {}", index + 1)
            },
            max_players: self.table_defaults.max_players,
            default_buy_in: self.table_defaults.default_buy_in,
            min_open_bet: self.table_defaults.min_open_bet,
            turn_timeout_secs: self.table_defaults.turn_timeout_secs,
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8000))
}

/// Helper to parse an environment variable with a default fallback.
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

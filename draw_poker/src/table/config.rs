//! Table configuration models.

use serde::{Deserialize, Serialize};

use crate::game::{Chips, GameSettings, constants};

/// Configuration for one table, fixed at creation.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableConfig {
    /// Table name shown in listings.
    pub name: String,

    /// Maximum number of seats.
    pub max_players: usize,

    /// Chips handed to a joining player when no buy-in is given.
    pub default_buy_in: Chips,

    /// Smallest allowed opening bet.
    pub min_open_bet: Chips,

    /// Seconds the active player gets before being auto-folded.
    /// Zero disables the timeout entirely.
    pub turn_timeout_secs: u64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "Main Table".to_string(),
            max_players: constants::MAX_PLAYERS,
            default_buy_in: constants::DEFAULT_BUY_IN,
            min_open_bet: 1,
            turn_timeout_secs: 0,
        }
    }
}

impl TableConfig {
    /// Validate configuration before spawning a table.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("table name must not be empty".to_string());
        }
        if self.max_players == 0 || self.max_players > constants::MAX_PLAYERS {
            return Err(format!(
                "max players must be between 1 and {}",
                constants::MAX_PLAYERS
            ));
        }
        if self.default_buy_in == 0 {
            return Err("default buy-in must be positive".to_string());
        }
        if self.min_open_bet == 0 || self.min_open_bet > self.default_buy_in {
            return Err("min open bet must be positive and within the buy-in".to_string());
        }
        Ok(())
    }
}

impl From<&TableConfig> for GameSettings {
    fn from(config: &TableConfig) -> Self {
        Self {
            max_players: config.max_players,
            default_buy_in: config.default_buy_in,
            min_open_bet: config.min_open_bet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(TableConfig::default().validate().is_ok());
    }

    #[test]
    fn bad_configs_are_rejected() {
        let mut config = TableConfig {
            max_players: 0,
            ..TableConfig::default()
        };
        assert!(config.validate().is_err());
        config.max_players = 4;
        config.min_open_bet = config.default_buy_in + 1;
        assert!(config.validate().is_err());
        config.min_open_bet = 1;
        config.name.clear();
        assert!(config.validate().is_err());
    }
}

//! Lobby configuration.

use serde::{Deserialize, Serialize};

use crate::game::constants::DEFAULT_MAX_AUTO_TURNS;

/// Lobby configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyConfig {
    /// Play a started game through to its winner immediately
    pub auto_play_on_start: bool,

    /// Turn ceiling for auto-played games
    pub max_auto_turns: usize,

    /// Fewest bots added per `add_bots` call
    pub min_bots: usize,

    /// Most bots added per `add_bots` call
    pub max_bots: usize,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            auto_play_on_start: true,
            max_auto_turns: DEFAULT_MAX_AUTO_TURNS,
            min_bots: 2,
            max_bots: 4,
        }
    }
}

impl LobbyConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_auto_turns == 0 {
            return Err("Max auto turns must be at least 1".to_string());
        }

        if self.min_bots > self.max_bots {
            return Err("Min bots must not exceed max bots".to_string());
        }

        if self.max_bots > 32 {
            return Err("Max bots must be at most 32".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(LobbyConfig::default().validate().is_ok());
    }

    #[test]
    fn test_bot_range_validated() {
        let config = LobbyConfig {
            min_bots: 5,
            max_bots: 2,
            ..LobbyConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_turn_ceiling_rejected() {
        let config = LobbyConfig {
            max_auto_turns: 0,
            ..LobbyConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

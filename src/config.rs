use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::CHARACTER_VARIANTS;
use crate::error::CoupError;

pub const HAND_SIZE: usize = 2;
// an ambassador draws two on top of whatever is dealt
pub const EXCHANGE_DRAW: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub num_players: usize,
    /// Seat names, `Player {idx}` when absent.
    pub player_names: Option<Vec<String>>,
    pub copies_per_character: usize,
    pub starting_coins: u8,
    pub narration_capacity: usize,
    pub max_proposal_attempts: usize,
    /// Turn limit for [`crate::Table::play`].
    pub max_turns: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            num_players: 4,
            player_names: None,
            copies_per_character: 3,
            starting_coins: 2,
            narration_capacity: 16,
            max_proposal_attempts: 8,
            max_turns: 1000,
        }
    }
}

impl TableConfig {
    pub fn with_players(num_players: usize) -> Self {
        Self { num_players, ..Self::default() }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CoupError> {
        let reader = BufReader::new(File::open(path)?);
        let config: TableConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn deck_size(&self) -> usize {
        self.copies_per_character * CHARACTER_VARIANTS.len()
    }

    pub fn player_name(&self, idx: usize) -> String {
        self.player_names
            .as_ref()
            .and_then(|names| names.get(idx).cloned())
            .unwrap_or_else(|| format!("Player {idx}"))
    }

    pub fn validate(&self) -> Result<(), CoupError> {
        if self.num_players < 2 {
            return Err(CoupError::InvalidConfig(format!("need at least 2 players, got {}", self.num_players)));
        }

        let needed = self.num_players * HAND_SIZE + EXCHANGE_DRAW;
        if self.deck_size() < needed {
            return Err(CoupError::InvalidConfig(format!(
                "{} cards can't deal {} players and an exchange ({needed} needed)",
                self.deck_size(),
                self.num_players,
            )));
        }

        if let Some(names) = &self.player_names {
            if names.len() != self.num_players {
                return Err(CoupError::InvalidConfig(format!("{} names for {} players", names.len(), self.num_players)));
            }
        }

        if self.narration_capacity == 0 {
            return Err(CoupError::InvalidConfig("narration capacity must be positive".to_string()));
        }

        if self.max_proposal_attempts == 0 {
            return Err(CoupError::InvalidConfig("at least one proposal attempt is required".to_string()));
        }

        Ok(())
    }
}

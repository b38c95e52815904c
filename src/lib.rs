pub mod action;
pub mod agent;
pub mod config;
pub mod deck;
pub mod error;
pub mod history;
pub mod phase;
pub mod player;
pub mod table;
pub mod view;

pub use action::{Action, ActionKind};
pub use agent::{Agent, ChallengeResponse, CounterResponse, RandomAgent};
pub use config::TableConfig;
pub use error::CoupError;
pub use history::{Event, History, Narration, Visibility};
pub use phase::Phase;
pub use player::Player;
pub use table::Table;
pub use view::{PlayerView, PublicView};

use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use crate::Character::{Ambassador, Assassin, Captain, Contessa, Duke};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Character {
    Duke,
    Assassin,
    Captain,
    Ambassador,
    Contessa,
}

pub static CHARACTER_VARIANTS: [Character; 5] = [
    Duke,
    Assassin,
    Captain,
    Ambassador,
    Contessa,
];

/// One influence card. A revealed card stays in its owner's hand face up and
/// no longer counts as influence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub character: Character,
    pub is_revealed: bool,
}

impl Card {
    pub fn new(character: Character) -> Self {
        Self { character, is_revealed: false }
    }

    pub fn reveal(&mut self) {
        self.is_revealed = true;
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_revealed {
            f.write_fmt(format_args!("({:?})", self.character))
        } else {
            f.write_fmt(format_args!("{:?}", self.character))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Card, CHARACTER_VARIANTS};
    use crate::Character::{Contessa, Duke};

    #[test]
    fn cards_start_face_down() {
        for character in CHARACTER_VARIANTS {
            assert!(!Card::new(character).is_revealed);
        }

        let mut card = Card::new(Contessa);
        assert_eq!(card.to_string(), "Contessa");
        card.reveal();
        assert!(card.is_revealed);
        assert_eq!(card.to_string(), "(Contessa)");
        assert_ne!(card, Card::new(Contessa));
        assert_eq!(Card::new(Duke), Card::new(Duke));
    }
}

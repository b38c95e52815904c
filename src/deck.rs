use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use crate::{Card, CHARACTER_VARIANTS};
use crate::error::CoupError;

/// The shared pool of undealt cards. The top of the deck is the end of the vec.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn new(copies_per_character: usize) -> Self {
        let cards = CHARACTER_VARIANTS.iter()
            .flat_map(|&character| std::iter::repeat(Card::new(character)).take(copies_per_character))
            .collect();

        Self { cards }
    }

    pub fn shuffle<R: Rng + Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn draw(&mut self, n: usize) -> Result<Vec<Card>, CoupError> {
        if n > self.cards.len() {
            return Err(CoupError::DeckExhausted { requested: n, remaining: self.cards.len() });
        }

        let mut drawn = self.cards.split_off(self.cards.len() - n);
        // first card off the top comes first
        drawn.reverse();
        Ok(drawn)
    }

    pub fn draw_one(&mut self) -> Result<Card, CoupError> {
        self.cards.pop().ok_or(CoupError::DeckExhausted { requested: 1, remaining: 0 })
    }

    /// Puts a card back on top. The table reshuffles after every return.
    pub fn add_card(&mut self, card: Card) -> Result<(), CoupError> {
        if card.is_revealed {
            return Err(CoupError::invariant(format!("tried to return a revealed {:?} to the deck", card.character)));
        }

        self.cards.push(card);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    #[cfg(test)]
    pub(crate) fn take_character(&mut self, character: crate::Character) -> Option<Card> {
        let idx = self.cards.iter().position(|card| card.character == character)?;
        Some(self.cards.remove(idx))
    }
}

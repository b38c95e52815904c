use serde::{Deserialize, Serialize};
use crate::action::ActionKind;
use crate::{Card, Character};
use crate::error::CoupError;

pub const COUP_COST: u8 = 7;
pub const ASSASSINATE_COST: u8 = 3;
pub const MUST_COUP_THRESHOLD: u8 = 10;
pub const STEAL_AMOUNT: u8 = 2;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: usize,
    pub name: String,
    pub(crate) hand: Vec<Card>,
    pub(crate) coins: u8,
    pub(crate) is_alive: bool,
    pub(crate) can_coup: bool,
    pub(crate) must_coup: bool,
}

impl Player {
    pub fn new(id: usize, name: impl Into<String>, hand: Vec<Card>, coins: u8) -> Self {
        let mut player = Self {
            id,
            name: name.into(),
            hand,
            coins,
            is_alive: true,
            can_coup: false,
            must_coup: false,
        };
        player.refresh();
        player
    }

    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    pub fn coins(&self) -> u8 {
        self.coins
    }

    pub fn is_alive(&self) -> bool {
        self.is_alive
    }

    pub fn can_coup(&self) -> bool {
        self.can_coup
    }

    pub fn must_coup(&self) -> bool {
        self.must_coup
    }

    /// Indexes of the cards still face down.
    pub fn influence(&self) -> impl Iterator<Item=usize> + '_ {
        self.hand
            .iter()
            .enumerate()
            .filter_map(|(idx, card)| if card.is_revealed { None } else { Some(idx) })
    }

    pub fn influence_count(&self) -> usize {
        self.influence().count()
    }

    pub fn revealed(&self) -> impl Iterator<Item=Character> + '_ {
        self.hand.iter().filter(|card| card.is_revealed).map(|card| card.character)
    }

    /// Position of a face down card of the given character.
    pub fn find_active_character(&self, character: Character) -> Option<usize> {
        self.hand.iter().position(|card| !card.is_revealed && card.character == character)
    }

    /// Whether the player lacks the character the given kind claims. The card
    /// that backs the claim is returned when there is one.
    pub fn is_bluffing(&self, kind: ActionKind) -> (bool, Option<Card>) {
        match kind.claimed_character() {
            None => (false, None),
            Some(character) => match self.find_active_character(character) {
                Some(idx) => (false, Some(self.hand[idx])),
                None => (true, None),
            }
        }
    }

    /// Recomputes alive status and the coup flags. A player without influence
    /// holds no coins.
    pub fn refresh(&mut self) {
        self.is_alive = self.hand.iter().any(|card| !card.is_revealed);
        if !self.is_alive {
            self.coins = 0;
        }
        self.can_coup = self.coins >= COUP_COST;
        self.must_coup = self.coins >= MUST_COUP_THRESHOLD;
    }

    /// 'Losing' an influence means the card is flipped face up and no longer counts.
    pub fn lose_one_influence(&mut self, card_idx: usize) -> Result<Card, CoupError> {
        if self.influence_count() == 0 {
            return Err(CoupError::NoInfluenceToLose(self.id));
        }

        match self.hand.get_mut(card_idx) {
            Some(card) if !card.is_revealed => {
                card.reveal();
                let card = *card;
                self.refresh();
                Ok(card)
            }
            Some(_) => Err(CoupError::invariant(format!("player {} card {card_idx} is already revealed", self.id))),
            None => Err(CoupError::invariant(format!("player {} has no card {card_idx}", self.id))),
        }
    }

    pub fn gain_coins(&mut self, n: u8) {
        self.coins = self.coins.saturating_add(n);
        self.refresh();
    }

    pub fn lose_coins(&mut self, n: u8) -> Result<(), CoupError> {
        self.coins = self.coins.checked_sub(n).ok_or_else(|| {
            CoupError::invariant(format!("player {} can't pay {n} with {} coins", self.id, self.coins))
        })?;
        self.refresh();
        Ok(())
    }

    pub fn action_revenue(&mut self) {
        self.gain_coins(1);
    }

    pub fn action_foreign_aid(&mut self) {
        self.gain_coins(2);
    }

    pub fn action_duke(&mut self) {
        self.gain_coins(3);
    }

    /// Influence loss on the target is routed by the table to the target's agent.
    pub fn pay_coup(&mut self) -> Result<(), CoupError> {
        self.lose_coins(COUP_COST)
    }

    pub fn pay_assassin(&mut self) -> Result<(), CoupError> {
        self.lose_coins(ASSASSINATE_COST)
    }

    /// Gives up to `max` coins to a thief, returning how many were taken.
    pub fn surrender_coins(&mut self, max: u8) -> u8 {
        let n = self.coins.min(max);
        self.coins -= n;
        self.refresh();
        n
    }

    pub fn action_captain(&mut self, victim: &mut Player) -> u8 {
        let stolen = victim.surrender_coins(STEAL_AMOUNT);
        self.gain_coins(stolen);
        stolen
    }

    /// Swaps the face down cards for a selection out of `face down ∪ drawn`.
    /// `keep` indexes that pool (face down cards first, in hand order) and must
    /// name as many distinct cards as there are face down cards. Revealed
    /// cards stay where they are. The cards not kept are returned.
    pub fn exchange(&mut self, drawn: Vec<Card>, keep: &[usize]) -> Result<Vec<Card>, CoupError> {
        let slots: Vec<usize> = self.influence().collect();
        let pool_len = slots.len() + drawn.len();
        if !is_valid_selection(keep, slots.len(), pool_len) {
            return Err(CoupError::invariant(format!("player {} kept {keep:?} out of {pool_len} cards", self.id)));
        }

        let mut pool: Vec<Option<Card>> = slots.iter()
            .map(|&idx| Some(self.hand[idx]))
            .chain(drawn.into_iter().map(Some))
            .collect();

        for (&slot, &pick) in slots.iter().zip(keep) {
            self.hand[slot] = pool[pick].take().ok_or_else(|| CoupError::invariant("card picked twice"))?;
        }

        Ok(pool.into_iter().flatten().collect())
    }

    pub(crate) fn remove_card(&mut self, card_idx: usize) -> Result<Card, CoupError> {
        if card_idx >= self.hand.len() {
            return Err(CoupError::invariant(format!("player {} has no card {card_idx}", self.id)));
        }
        Ok(self.hand.remove(card_idx))
    }

    pub(crate) fn insert_card(&mut self, card_idx: usize, card: Card) {
        let card_idx = card_idx.min(self.hand.len());
        self.hand.insert(card_idx, card);
    }
}

/// `keep` picks exactly `n` distinct indexes below `pool_len`.
pub fn is_valid_selection(keep: &[usize], n: usize, pool_len: usize) -> bool {
    if keep.len() != n || keep.iter().any(|&idx| idx >= pool_len) {
        return false;
    }

    let mut sorted = keep.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len() == n
}

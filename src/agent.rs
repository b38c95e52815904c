// decision making for a seat at the table

use rand::Rng;
use rand::seq::{index, SliceRandom};
use crate::action::{Action, ActionKind};
use crate::Card;
use crate::error::CoupError;
use crate::player::Player;
use crate::view::PublicView;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChallengeResponse {
    Challenge,
    Decline,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CounterResponse {
    Counter(ActionKind),
    Decline,
}

/// The table asks these questions of whoever controls a seat. Every call is
/// made from the table's thread and it waits for the answer before moving on.
/// Answers that don't fit the question are treated as declining.
pub trait Agent {
    fn propose_action(&mut self, me: &Player, view: &PublicView) -> Action;

    fn respond_to_challenge_opportunity(&mut self, me: &Player, action: &Action) -> ChallengeResponse;

    fn respond_to_counter_opportunity(&mut self, me: &Player, action: &Action) -> CounterResponse;

    /// Asked of the original actor once their action has been countered.
    fn respond_to_counter_challenge_opportunity(&mut self, me: &Player, counter: &Action) -> ChallengeResponse;

    /// Index into `hand` of the face down card to flip.
    fn choose_card_to_reveal(&mut self, hand: &[Card]) -> usize;

    /// Indexes into `hand ++ drawn`, as many as `hand` has cards. `hand` holds
    /// only the face down cards.
    fn choose_cards_to_keep(&mut self, hand: &[Card], drawn: &[Card]) -> Vec<usize>;

    fn on_rejected(&mut self, _action: &Action, _error: &CoupError) {}
}

/// Picks uniformly among whatever it is allowed to do.
pub struct RandomAgent<R: Rng> {
    rng: R,
    challenge_probability: f64,
    counter_probability: f64,
}

impl<R: Rng> RandomAgent<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, challenge_probability: 0.5, counter_probability: 0.5 }
    }

    pub fn with_probabilities(rng: R, challenge_probability: f64, counter_probability: f64) -> Self {
        Self {
            rng,
            challenge_probability: challenge_probability.clamp(0.0, 1.0),
            counter_probability: counter_probability.clamp(0.0, 1.0),
        }
    }

    fn maybe_challenge(&mut self) -> ChallengeResponse {
        if self.rng.gen_bool(self.challenge_probability) {
            ChallengeResponse::Challenge
        } else {
            ChallengeResponse::Decline
        }
    }
}

impl<R: Rng> Agent for RandomAgent<R> {
    fn propose_action(&mut self, me: &Player, view: &PublicView) -> Action {
        let actions = view.legal_actions(me);
        match actions.choose(&mut self.rng) {
            Some(action) => action.clone(),
            None => Action::new(ActionKind::Revenue, me.id, None),
        }
    }

    fn respond_to_challenge_opportunity(&mut self, _me: &Player, _action: &Action) -> ChallengeResponse {
        self.maybe_challenge()
    }

    fn respond_to_counter_opportunity(&mut self, _me: &Player, action: &Action) -> CounterResponse {
        let counters = action.kind().counters();
        if counters.is_empty() || !self.rng.gen_bool(self.counter_probability) {
            return CounterResponse::Decline;
        }

        match counters.choose(&mut self.rng) {
            Some(kind) => CounterResponse::Counter(*kind),
            None => CounterResponse::Decline,
        }
    }

    fn respond_to_counter_challenge_opportunity(&mut self, _me: &Player, _counter: &Action) -> ChallengeResponse {
        self.maybe_challenge()
    }

    fn choose_card_to_reveal(&mut self, hand: &[Card]) -> usize {
        let face_down: Vec<usize> = hand.iter()
            .enumerate()
            .filter_map(|(idx, card)| if card.is_revealed { None } else { Some(idx) })
            .collect();

        face_down.choose(&mut self.rng).copied().unwrap_or(0)
    }

    fn choose_cards_to_keep(&mut self, hand: &[Card], drawn: &[Card]) -> Vec<usize> {
        index::sample(&mut self.rng, hand.len() + drawn.len(), hand.len()).into_vec()
    }
}

use std::fmt::{Debug, Formatter};
use rand::Rng;
use rand::seq::SliceRandom;
use crate::action::{Action, ActionKind};
use crate::agent::{Agent, ChallengeResponse, CounterResponse};
use crate::{Card, Character, CHARACTER_VARIANTS};
use crate::config::{TableConfig, EXCHANGE_DRAW, HAND_SIZE};
use crate::deck::Deck;
use crate::error::CoupError;
use crate::history::{Event, History, Narration, Visibility};
use crate::phase::{Phase, PhaseGraph};
use crate::player::{is_valid_selection, Player, ASSASSINATE_COST, COUP_COST};
use crate::view::{PlayerView, PublicView};

/// What the turn in flight has gathered so far.
#[derive(Default)]
struct Pending {
    action: Option<Action>,
    challenger: Option<usize>,
    counter: Option<Action>,
}

impl Pending {
    fn action(&self) -> Result<Action, CoupError> {
        self.action.clone().ok_or_else(|| CoupError::invariant("no action in flight"))
    }

    fn challenger(&self) -> Result<usize, CoupError> {
        self.challenger.ok_or_else(|| CoupError::invariant("no challenger recorded"))
    }

    fn counter(&self) -> Result<Action, CoupError> {
        self.counter.clone().ok_or_else(|| CoupError::invariant("no counter in flight"))
    }
}

/// Owns the deck and every seat, and runs the game one turn at a time.
/// Agents are lent to each call, they never hold on to table state.
#[derive(Clone)]
pub struct Table {
    config: TableConfig,
    pub(crate) players: Vec<Player>,
    pub(crate) deck: Deck,
    pub(crate) current_player_idx: usize,
    turn: usize,
    phase: Phase,
    transitions: PhaseGraph,
    narration: Narration,
    history: History,
}

impl Debug for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(format!("T {} | P {} | {:?} | deck {}\n", self.turn, self.current_player_idx, self.phase, self.deck.len()).as_str())?;
        for (player_idx, player) in self.players.iter().enumerate() {
            let cards: Vec<String> = player.hand().iter().map(|card| card.to_string()).collect();
            f.write_str(format!("\tP {player_idx}: ${} | {}\n", player.coins(), cards.join(", ")).as_str())?;
        }
        Ok(())
    }
}

impl Table {
    /// Shuffles, deals two cards and the starting coins to every seat, and
    /// picks a random first player.
    pub fn new<R: Rng + Sized>(config: TableConfig, rng: &mut R) -> Result<Self, CoupError> {
        config.validate()?;

        let mut deck = Deck::new(config.copies_per_character);
        deck.shuffle(rng);

        let mut players = Vec::with_capacity(config.num_players);
        for player_idx in 0..config.num_players {
            let hand = deck.draw(HAND_SIZE)?;
            players.push(Player::new(player_idx, config.player_name(player_idx), hand, config.starting_coins));
        }

        let current_player_idx = rng.gen_range(0..config.num_players);

        let mut table = Self {
            narration: Narration::new(config.narration_capacity),
            config,
            players,
            deck,
            current_player_idx,
            turn: 0,
            phase: Phase::AwaitingAction,
            transitions: PhaseGraph::new(),
            history: History::new(),
        };

        table.record(Visibility::Public, Event::GameStarted { players: table.players.len(), first_player: current_player_idx });
        for player_idx in table.players_indexes() {
            let hand = table.players[player_idx].hand().iter().map(|card| card.character).collect();
            table.record(Visibility::Private(player_idx), Event::Dealt { player: player_idx, hand });
        }
        table.record(Visibility::Public, Event::TurnStarted { player: current_player_idx });

        let first = table.players[current_player_idx].name.clone();
        table.narrate(format!("{first} goes first"));
        log::info!("new table with {} players, {} starts", table.players.len(), first);

        Ok(table)
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, player_idx: usize) -> Option<&Player> {
        self.players.get(player_idx)
    }

    pub fn players_indexes(&self) -> std::ops::Range<usize> {
        0..self.players.len()
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn current_player(&self) -> usize {
        self.current_player_idx
    }

    pub fn turn(&self) -> usize {
        self.turn
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn narration(&self) -> &Narration {
        &self.narration
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn public_view(&self) -> PublicView {
        PublicView {
            turn: self.turn,
            current_player: self.current_player_idx,
            deck_size: self.deck.len(),
            players: self.players.iter().map(PlayerView::from).collect(),
        }
    }

    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|player| player.is_alive()).count()
    }

    pub fn is_game_over(&self) -> bool {
        self.alive_count() == 1
    }

    pub fn winner(&self) -> Option<usize> {
        if self.is_game_over() {
            self.players.iter().position(|player| player.is_alive())
        } else {
            None
        }
    }

    /// Cards in the deck plus cards in every hand.
    pub fn card_count(&self) -> usize {
        self.deck.len() + self.players.iter().map(|player| player.hand().len()).sum::<usize>()
    }

    /// Card conservation, hand sizes and elimination consistency.
    pub fn check_invariants(&self) -> Result<(), CoupError> {
        if self.card_count() != self.config.deck_size() {
            return Err(CoupError::invariant(format!("{} cards on the table, expected {}", self.card_count(), self.config.deck_size())));
        }

        for character in CHARACTER_VARIANTS {
            let count = self.deck.cards().iter()
                .chain(self.players.iter().flat_map(|player| player.hand().iter()))
                .filter(|card| card.character == character)
                .count();
            if count != self.config.copies_per_character {
                return Err(CoupError::invariant(format!("{count} copies of {:?} on the table", character)));
            }
        }

        for player in &self.players {
            if player.hand().len() != HAND_SIZE {
                return Err(CoupError::invariant(format!("player {} holds {} cards", player.id, player.hand().len())));
            }
            if player.is_alive() != (player.influence_count() > 0) {
                return Err(CoupError::invariant(format!("player {} alive flag disagrees with their hand", player.id)));
            }
            if !player.is_alive() && player.coins() != 0 {
                return Err(CoupError::invariant(format!("eliminated player {} still holds coins", player.id)));
            }
        }

        Ok(())
    }

    /// Plays until someone wins or the configured turn limit runs out.
    pub fn play<R: Rng + Sized>(&mut self, agents: &mut [Box<dyn Agent>], rng: &mut R) -> Result<Option<usize>, CoupError> {
        for _ in 0..self.config.max_turns {
            if let Some(winner) = self.play_turn(agents, rng)? {
                return Ok(Some(winner));
            }
        }

        log::info!("no winner after {} turns", self.config.max_turns);
        Ok(None)
    }

    /// Runs the current player's turn to completion: proposal, challenges,
    /// counters, effect. Returns the winner once the game is decided.
    ///
    /// A proposal that is still illegal after the configured number of
    /// attempts comes back as a retryable [`CoupError::IllegalAction`] and the
    /// table is left as it was. Any other error is fatal.
    pub fn play_turn<R: Rng + Sized>(&mut self, agents: &mut [Box<dyn Agent>], rng: &mut R) -> Result<Option<usize>, CoupError> {
        if self.phase == Phase::GameOver {
            return Err(CoupError::invariant("the game is already over"));
        }
        if self.phase != Phase::AwaitingAction {
            return Err(CoupError::invariant(format!("turn resumed from {:?}", self.phase)));
        }
        if agents.len() != self.players.len() {
            return Err(CoupError::invariant(format!("{} agents for {} players", agents.len(), self.players.len())));
        }

        let mut pending = Pending::default();

        loop {
            match self.phase {
                Phase::AwaitingAction => {
                    let action = self.solicit_proposal(agents)?;

                    let next = if action.can_be_challenged() {
                        Phase::AwaitingChallenges
                    } else if action.can_be_countered() {
                        Phase::AwaitingCounters
                    } else {
                        // revenue and coup just happen
                        Phase::ApplyEffect
                    };

                    pending.action = Some(action);
                    self.enter(next)?;
                }
                Phase::AwaitingChallenges => {
                    let action = pending.action()?;
                    match self.solicit_challenge(agents, &action, rng) {
                        Some(challenger_idx) => {
                            pending.challenger = Some(challenger_idx);
                            self.enter(Phase::BluffResolution)?;
                        }
                        None if action.can_be_countered() => self.enter(Phase::AwaitingCounters)?,
                        None => self.enter(Phase::ApplyEffect)?,
                    }
                }
                Phase::BluffResolution => {
                    let action = pending.action()?;
                    let bluffing = self.adjudicate(agents, rng, action.origin(), pending.challenger()?, action.kind())?;

                    if self.is_game_over() {
                        self.enter(Phase::GameOver)?;
                    } else if bluffing {
                        // a caught bluff is never open to counters
                        self.enter(Phase::AdvanceTurn)?;
                    } else if action.can_be_countered() {
                        self.enter(Phase::AwaitingCounters)?;
                    } else {
                        self.enter(Phase::ApplyEffect)?;
                    }
                }
                Phase::AwaitingCounters => {
                    let action = pending.action()?;
                    match self.solicit_counter(agents, &action, rng) {
                        Some(counter) => {
                            pending.counter = Some(counter);
                            self.enter(Phase::AwaitingCounterChallenge)?;
                        }
                        None => self.enter(Phase::ApplyEffect)?,
                    }
                }
                Phase::AwaitingCounterChallenge => {
                    let action = pending.action()?;
                    let counter = pending.counter()?;
                    let actor_idx = action.origin();

                    match agents[actor_idx].respond_to_counter_challenge_opportunity(&self.players[actor_idx], &counter) {
                        ChallengeResponse::Challenge => {
                            self.record(Visibility::Public, Event::CounterChallenged { challenger: actor_idx, counter: counter.clone() });
                            let line = format!("{} is challenging {}'s {:?}", self.name(actor_idx), self.name(counter.origin()), counter.kind());
                            self.narrate(line);
                            self.enter(Phase::CounterBluffResolution)?;
                        }
                        ChallengeResponse::Decline => {
                            let line = format!("{} successfully countered {:?} from {}", self.name(counter.origin()), action.kind(), self.name(actor_idx));
                            self.narrate(line);
                            self.enter(Phase::AdvanceTurn)?;
                        }
                    }
                }
                Phase::CounterBluffResolution => {
                    let action = pending.action()?;
                    let counter = pending.counter()?;
                    let bluffing = self.adjudicate(agents, rng, counter.origin(), action.origin(), counter.kind())?;

                    if self.is_game_over() {
                        self.enter(Phase::GameOver)?;
                    } else if bluffing {
                        // the counter is void
                        self.enter(Phase::ApplyEffect)?;
                    } else {
                        let line = format!("{} successfully countered {:?} from {}", self.name(counter.origin()), action.kind(), self.name(action.origin()));
                        self.narrate(line);
                        self.enter(Phase::AdvanceTurn)?;
                    }
                }
                Phase::ApplyEffect => {
                    let action = pending.action()?;
                    self.apply_effect(agents, rng, &action)?;

                    if self.is_game_over() {
                        self.enter(Phase::GameOver)?;
                    } else {
                        self.enter(Phase::AdvanceTurn)?;
                    }
                }
                Phase::AdvanceTurn => {
                    for player in self.players.iter_mut() {
                        player.refresh();
                    }
                    self.check_invariants()?;

                    if self.is_game_over() {
                        self.enter(Phase::GameOver)?;
                        continue;
                    }

                    self.go_next_turn();
                    self.enter(Phase::AwaitingAction)?;
                    log::trace!("{:?}", self);
                    return Ok(None);
                }
                Phase::GameOver => {
                    self.check_invariants()?;
                    let winner = self.winner().ok_or_else(|| CoupError::invariant("game over without a survivor"))?;

                    self.record(Visibility::Public, Event::GameOver { winner });
                    let line = format!("{} wins", self.name(winner));
                    self.narrate(line);
                    log::info!("game over after {} turns, player {} wins", self.turn + 1, winner);
                    return Ok(Some(winner));
                }
            }
        }
    }

    fn enter(&mut self, next: Phase) -> Result<(), CoupError> {
        if !self.transitions.allows(self.phase, next) {
            return Err(CoupError::invariant(format!("no transition from {:?} to {:?}", self.phase, next)));
        }
        log::trace!("{:?} -> {:?}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    fn go_next_turn(&mut self) {
        // player's turn is over
        self.turn += 1;
        self.current_player_idx = self.next_living_player();
        self.record(Visibility::Public, Event::TurnStarted { player: self.current_player_idx });
    }

    fn next_living_player(&self) -> usize {
        let n = self.players.len();
        (1..=n)
            .map(|offset| (self.current_player_idx + offset) % n)
            .find(|&idx| self.players[idx].is_alive())
            .unwrap_or(self.current_player_idx)
    }

    /// Living players in seat order, starting after `exclude_idx`.
    fn other_player_indexes(&self, exclude_idx: usize) -> Vec<usize> {
        (1..self.players.len())
            .map(|n| (exclude_idx + n) % self.players.len())
            .filter(|player_idx| self.players[*player_idx].is_alive())
            .collect()
    }

    fn solicit_proposal(&mut self, agents: &mut [Box<dyn Agent>]) -> Result<Action, CoupError> {
        let player_idx = self.current_player_idx;
        let mut rejection = None;

        for _ in 0..self.config.max_proposal_attempts {
            let view = self.public_view();
            let action = agents[player_idx].propose_action(&self.players[player_idx], &view);

            match view.check(&self.players[player_idx], &action) {
                Ok(()) => {
                    self.accept_proposal(&action)?;
                    return Ok(action);
                }
                Err(err) => {
                    log::warn!("rejected proposal from player {player_idx}: {err}");
                    self.record(Visibility::Private(player_idx), Event::Rejected { action: action.clone(), reason: err.to_string() });
                    agents[player_idx].on_rejected(&action, &err);
                    rejection = Some(err);
                }
            }
        }

        Err(rejection.unwrap_or_else(|| CoupError::invariant("no proposal attempts allowed")))
    }

    fn accept_proposal(&mut self, action: &Action) -> Result<(), CoupError> {
        let actor_idx = action.origin();
        self.record(Visibility::Public, Event::Proposed { action: action.clone() });

        if action.is_contestable() {
            let line = match action.target() {
                Some(target_idx) => format!("{} tries to use {:?} on {}", self.name(actor_idx), action.kind(), self.name(target_idx)),
                None => format!("{} tries to use {:?}", self.name(actor_idx), action.kind()),
            };
            self.narrate(line);
        }

        // the assassin is paid for up front, whatever happens to the attempt
        if action.kind() == ActionKind::Assassin {
            self.players[actor_idx].pay_assassin()?;
            self.record(Visibility::Public, Event::CoinsPaid { player: actor_idx, amount: ASSASSINATE_COST });
        }

        Ok(())
    }

    /// Asks everyone else whether they challenge, and keeps one of the
    /// challengers, picked uniformly at random.
    fn solicit_challenge<R: Rng + Sized>(&mut self, agents: &mut [Box<dyn Agent>], action: &Action, rng: &mut R) -> Option<usize> {
        let claimant_idx = action.origin();
        let challengers: Vec<usize> = self.other_player_indexes(claimant_idx)
            .into_iter()
            .filter(|&player_idx| {
                agents[player_idx].respond_to_challenge_opportunity(&self.players[player_idx], action) == ChallengeResponse::Challenge
            })
            .collect();

        let challenger_idx = *challengers.choose(rng)?;

        self.record(Visibility::Public, Event::Challenged {
            challenger: challenger_idx,
            challenged: claimant_idx,
            claim: action.kind(),
            attempts: challengers.len(),
        });
        let line = format!("{} is challenging {} with {:?}", self.name(challenger_idx), self.name(claimant_idx), action.kind());
        self.narrate(line);

        Some(challenger_idx)
    }

    /// Asks everyone else whether they counter. Any living opponent may claim
    /// a blocking character, targeted or not. Counters that don't block this
    /// action count as declining.
    fn solicit_counter<R: Rng + Sized>(&mut self, agents: &mut [Box<dyn Agent>], action: &Action, rng: &mut R) -> Option<Action> {
        let actor_idx = action.origin();
        let mut counters = Vec::new();

        for player_idx in self.other_player_indexes(actor_idx) {
            match agents[player_idx].respond_to_counter_opportunity(&self.players[player_idx], action) {
                CounterResponse::Counter(kind) => {
                    if action.kind().counters().contains(&kind) {
                        counters.push(Action::new(kind, player_idx, Some(actor_idx)));
                    } else {
                        log::warn!("player {player_idx} can't counter {:?} with {:?}, ignoring", action, kind);
                    }
                }
                CounterResponse::Decline => {}
            }
        }

        let counter = counters.choose(rng)?.clone();

        self.record(Visibility::Public, Event::Countered { counter: counter.clone() });
        let line = format!("{} tries to counter {} with {:?}", self.name(counter.origin()), self.name(actor_idx), counter.kind());
        self.narrate(line);

        Some(counter)
    }

    /// Settles a challenge against `claimant_idx`'s claim. A bluffer loses an
    /// influence; otherwise the proven card goes back into the deck for a
    /// fresh one and the challenger loses an influence. Returns whether the
    /// claimant was bluffing.
    fn adjudicate<R: Rng + Sized>(
        &mut self,
        agents: &mut [Box<dyn Agent>],
        rng: &mut R,
        claimant_idx: usize,
        challenger_idx: usize,
        claim: ActionKind,
    ) -> Result<bool, CoupError> {
        let (bluffing, card) = self.players[claimant_idx].is_bluffing(claim);
        self.record(Visibility::Public, Event::ChallengeResolved {
            challenged: claimant_idx,
            bluffing,
            shown: card.map(|card| card.character),
        });

        if bluffing {
            let line = format!("{} was bluffing {:?} and loses an influence", self.name(claimant_idx), claim);
            self.narrate(line);
            self.lose_influence(agents, claimant_idx)?;
        } else {
            let character = card
                .map(|card| card.character)
                .ok_or_else(|| CoupError::invariant(format!("{:?} can't be challenged", claim)))?;
            let line = format!("{} shows a {:?}, {} lost the challenge", self.name(claimant_idx), character, self.name(challenger_idx));
            self.narrate(line);
            self.replace_influence_card(claimant_idx, character, rng)?;
            self.lose_influence(agents, challenger_idx)?;
        }

        Ok(bluffing)
    }

    /// Shuffles a proven card back into the deck and deals a replacement into
    /// the same slot.
    fn replace_influence_card<R: Rng + Sized>(&mut self, player_idx: usize, character: Character, rng: &mut R) -> Result<(), CoupError> {
        let card_idx = self.players[player_idx]
            .find_active_character(character)
            .ok_or_else(|| CoupError::invariant(format!("player {player_idx} has no face down {:?}", character)))?;

        let card = self.players[player_idx].remove_card(card_idx)?;
        self.deck.add_card(card)?;
        self.deck.shuffle(rng);

        let replacement = self.deck.draw_one()?;
        self.players[player_idx].insert_card(card_idx, replacement);

        self.record(Visibility::Public, Event::CardReplaced { player: player_idx, returned: character });
        self.record(Visibility::Public, Event::DeckShuffled { size: self.deck.len() + 1 });
        self.record(Visibility::Private(player_idx), Event::CardDrawn { player: player_idx, character: replacement.character });

        Ok(())
    }

    /// Flips one of the player's face down cards, letting them choose when
    /// there is a choice to make.
    fn lose_influence(&mut self, agents: &mut [Box<dyn Agent>], player_idx: usize) -> Result<Card, CoupError> {
        let player = &self.players[player_idx];
        let face_down: Vec<usize> = player.influence().collect();

        let card_idx = match face_down.as_slice() {
            [] => return Err(CoupError::NoInfluenceToLose(player_idx)),
            [only] => *only,
            _ => {
                let choice = agents[player_idx].choose_card_to_reveal(player.hand());
                if face_down.contains(&choice) {
                    choice
                } else {
                    log::warn!("player {player_idx} chose card {choice} which they can't reveal, flipping {} instead", face_down[0]);
                    face_down[0]
                }
            }
        };

        let card = self.players[player_idx].lose_one_influence(card_idx)?;
        self.record(Visibility::Public, Event::InfluenceLost { player: player_idx, character: card.character });
        let line = format!("{} loses their {:?}", self.name(player_idx), card.character);
        self.narrate(line);

        if !self.players[player_idx].is_alive() {
            self.record(Visibility::Public, Event::Eliminated { player: player_idx });
            let line = format!("{} is out of the game", self.name(player_idx));
            self.narrate(line);
            log::info!("player {player_idx} eliminated on turn {}", self.turn);
        }

        Ok(card)
    }

    fn apply_effect<R: Rng + Sized>(&mut self, agents: &mut [Box<dyn Agent>], rng: &mut R, action: &Action) -> Result<(), CoupError> {
        let actor_idx = action.origin();
        let target = || action.target().ok_or_else(|| CoupError::invariant(format!("{:?} has no target", action)));

        match action.kind() {
            ActionKind::Revenue => {
                self.players[actor_idx].action_revenue();
                self.gained(actor_idx, 1, "revenue");
            }
            ActionKind::ForeignAid => {
                self.players[actor_idx].action_foreign_aid();
                self.gained(actor_idx, 2, "foreign aid");
            }
            ActionKind::Duke => {
                self.players[actor_idx].action_duke();
                self.gained(actor_idx, 3, "Duke");
            }
            ActionKind::Coup => {
                let target_idx = target()?;
                self.players[actor_idx].pay_coup()?;
                self.record(Visibility::Public, Event::CoinsPaid { player: actor_idx, amount: COUP_COST });
                let line = format!("{} launched a Coup on {}", self.name(actor_idx), self.name(target_idx));
                self.narrate(line);
                self.lose_influence(agents, target_idx)?;
            }
            ActionKind::Assassin => {
                let target_idx = target()?;
                // target could already be dead from losing a challenge
                if self.players[target_idx].is_alive() {
                    let line = format!("{} assassinates {}", self.name(actor_idx), self.name(target_idx));
                    self.narrate(line);
                    self.lose_influence(agents, target_idx)?;
                }
            }
            ActionKind::Captain => {
                let target_idx = target()?;
                let (thief, victim) = self.pair_mut(actor_idx, target_idx)?;
                let amount = thief.action_captain(victim);
                self.record(Visibility::Public, Event::Stolen { thief: actor_idx, victim: target_idx, amount });
                let line = format!("{} stole {amount} coin(s) from {}", self.name(actor_idx), self.name(target_idx));
                self.narrate(line);
            }
            ActionKind::Ambassador => {
                self.exchange(agents, rng, actor_idx)?;
            }
            ActionKind::CounterForeignAidWithDuke
            | ActionKind::CounterAssassinWithContessa
            | ActionKind::CounterCaptainWithCaptain
            | ActionKind::CounterCaptainWithAmbassador
            | ActionKind::Challenge
            | ActionKind::DoNothing => {
                return Err(CoupError::invariant(format!("{:?} has no effect of its own", action.kind())));
            }
        }

        Ok(())
    }

    fn gained(&mut self, player_idx: usize, amount: u8, source: &str) {
        self.record(Visibility::Public, Event::CoinsGained { player: player_idx, amount });
        let line = format!("{} collected {amount} coin(s) with {source}", self.name(player_idx));
        self.narrate(line);
    }

    /// Draws two, lets the player keep as many as they have face down cards,
    /// and shuffles the rest back.
    fn exchange<R: Rng + Sized>(&mut self, agents: &mut [Box<dyn Agent>], rng: &mut R, player_idx: usize) -> Result<(), CoupError> {
        let drawn = self.deck.draw(EXCHANGE_DRAW)?;
        let player = &self.players[player_idx];
        let hand: Vec<Card> = player.influence().map(|card_idx| player.hand()[card_idx]).collect();

        let mut keep = agents[player_idx].choose_cards_to_keep(&hand, &drawn);
        if !is_valid_selection(&keep, hand.len(), hand.len() + drawn.len()) {
            log::warn!("player {player_idx} kept {:?} out of {} cards, keeping their own hand", keep, hand.len() + drawn.len());
            keep = (0..hand.len()).collect();
        }

        let kept: Vec<Character> = keep.iter()
            .map(|&pick| if pick < hand.len() { hand[pick].character } else { drawn[pick - hand.len()].character })
            .collect();

        let returned = self.players[player_idx].exchange(drawn, &keep)?;
        for card in &returned {
            self.deck.add_card(*card)?;
        }
        self.deck.shuffle(rng);

        self.record(Visibility::Private(player_idx), Event::Exchanged {
            player: player_idx,
            kept,
            returned: returned.iter().map(|card| card.character).collect(),
        });
        self.record(Visibility::Public, Event::DeckShuffled { size: self.deck.len() });
        let line = format!("{} exchanged cards with the deck", self.name(player_idx));
        self.narrate(line);

        Ok(())
    }

    fn pair_mut(&mut self, a: usize, b: usize) -> Result<(&mut Player, &mut Player), CoupError> {
        if a == b || a >= self.players.len() || b >= self.players.len() {
            return Err(CoupError::invariant(format!("players {a} and {b} can't both be borrowed")));
        }

        if a < b {
            let (left, right) = self.players.split_at_mut(b);
            Ok((&mut left[a], &mut right[0]))
        } else {
            let (left, right) = self.players.split_at_mut(a);
            Ok((&mut right[0], &mut left[b]))
        }
    }

    fn name(&self, player_idx: usize) -> &str {
        &self.players[player_idx].name
    }

    fn narrate(&mut self, line: String) {
        self.narration.push(line);
    }

    fn record(&mut self, visibility: Visibility, event: Event) {
        self.history.push(self.turn, visibility, event);
    }
}

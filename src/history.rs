use std::collections::VecDeque;
use std::io::Write;
use serde::{Deserialize, Serialize};
use crate::action::{Action, ActionKind};
use crate::Character;
use crate::error::CoupError;

/// The last few human readable lines about the game, oldest first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narration {
    capacity: usize,
    lines: VecDeque<String>,
}

impl Narration {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, lines: VecDeque::with_capacity(capacity) }
    }

    pub fn push(&mut self, line: String) {
        log::debug!("{line}");
        self.lines.push_back(line);
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }

    pub fn lines(&self) -> impl Iterator<Item=&str> + '_ {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    // only the given player learns this
    Private(usize),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    GameStarted { players: usize, first_player: usize },
    /// Private: the two cards a player was dealt.
    Dealt { player: usize, hand: Vec<Character> },
    TurnStarted { player: usize },
    Proposed { action: Action },
    Rejected { action: Action, reason: String },
    CoinsPaid { player: usize, amount: u8 },
    Challenged { challenger: usize, challenged: usize, claim: ActionKind, attempts: usize },
    /// When the claim held the card was shown to everyone.
    ChallengeResolved { challenged: usize, bluffing: bool, shown: Option<Character> },
    Countered { counter: Action },
    CounterChallenged { challenger: usize, counter: Action },
    InfluenceLost { player: usize, character: Character },
    /// A shown card went back into the deck and a replacement was drawn.
    CardReplaced { player: usize, returned: Character },
    /// Private: what the replacement was.
    CardDrawn { player: usize, character: Character },
    /// Private: an ambassador's picks.
    Exchanged { player: usize, kept: Vec<Character>, returned: Vec<Character> },
    DeckShuffled { size: usize },
    CoinsGained { player: usize, amount: u8 },
    Stolen { thief: usize, victim: usize, amount: u8 },
    Eliminated { player: usize },
    GameOver { winner: usize },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::GameStarted { .. } => "game_started",
            Event::Dealt { .. } => "dealt",
            Event::TurnStarted { .. } => "turn_started",
            Event::Proposed { .. } => "proposed",
            Event::Rejected { .. } => "rejected",
            Event::CoinsPaid { .. } => "coins_paid",
            Event::Challenged { .. } => "challenged",
            Event::ChallengeResolved { .. } => "challenge_resolved",
            Event::Countered { .. } => "countered",
            Event::CounterChallenged { .. } => "counter_challenged",
            Event::InfluenceLost { .. } => "influence_lost",
            Event::CardReplaced { .. } => "card_replaced",
            Event::CardDrawn { .. } => "card_drawn",
            Event::Exchanged { .. } => "exchanged",
            Event::DeckShuffled { .. } => "deck_shuffled",
            Event::CoinsGained { .. } => "coins_gained",
            Event::Stolen { .. } => "stolen",
            Event::Eliminated { .. } => "eliminated",
            Event::GameOver { .. } => "game_over",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub turn: usize,
    pub visibility: Visibility,
    pub event: Event,
}

impl Record {
    pub fn is_visible_to(&self, player_idx: usize) -> bool {
        match self.visibility {
            Visibility::Public => true,
            Visibility::Private(owner) => owner == player_idx,
        }
    }
}

#[derive(Serialize)]
struct CsvRow {
    turn: usize,
    visibility: String,
    event: &'static str,
    detail: String,
}

/// Append-only, structured account of everything that happened at the table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    records: Vec<Record>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: usize, visibility: Visibility, event: Event) {
        log::trace!("T{turn} {:?} {:?}", visibility, event);
        self.records.push(Record { turn, visibility, event });
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn public(&self) -> impl Iterator<Item=&Record> + '_ {
        self.records.iter().filter(|r| r.visibility == Visibility::Public)
    }

    /// The public record plus whatever was shown to the given player alone.
    pub fn visible_to(&self, player_idx: usize) -> impl Iterator<Item=&Record> + '_ {
        self.records.iter().filter(move |r| r.is_visible_to(player_idx))
    }

    pub fn to_json(&self) -> Result<String, CoupError> {
        Ok(serde_json::to_string(&self.records)?)
    }

    /// One row per record; the event payload is embedded as json.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), CoupError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for record in &self.records {
            let visibility = match record.visibility {
                Visibility::Public => "public".to_string(),
                Visibility::Private(player_idx) => format!("private:{player_idx}"),
            };
            csv_writer.serialize(CsvRow {
                turn: record.turn,
                visibility,
                event: record.event.name(),
                detail: serde_json::to_string(&record.event)?,
            })?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::action::{Action, ActionKind};
    use crate::Character::{Assassin, Duke};
    use crate::history::{Event, History, Narration, Visibility};

    #[test]
    fn narration_is_bounded() {
        let mut narration = Narration::new(3);
        for i in 0..5 {
            narration.push(format!("line {i}"));
        }
        assert_eq!(narration.len(), 3);
        assert_eq!(narration.lines().collect::<Vec<_>>(), vec!["line 2", "line 3", "line 4"]);
    }

    fn sample() -> History {
        let mut history = History::new();
        history.push(0, Visibility::Private(1), Event::Dealt { player: 1, hand: vec![Duke, Assassin] });
        history.push(0, Visibility::Public, Event::Proposed { action: Action::new(ActionKind::Duke, 1, None) });
        history.push(0, Visibility::Private(2), Event::Dealt { player: 2, hand: vec![Duke, Duke] });
        history
    }

    #[test]
    fn private_records_stay_private() {
        let history = sample();
        assert_eq!(history.len(), 3);
        assert_eq!(history.public().count(), 1);
        assert_eq!(history.visible_to(1).count(), 2);
        assert_eq!(history.visible_to(2).count(), 2);
        assert_eq!(history.visible_to(3).count(), 1);
    }

    #[test]
    fn json_export() {
        let json = sample().to_json().unwrap();
        let parsed: Vec<crate::history::Record> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample().records());
    }

    #[test]
    fn csv_export() {
        let mut out = Vec::new();
        sample().write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "turn,visibility,event,detail");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("0,private:1,dealt,"));
        assert!(lines[2].starts_with("0,public,proposed,"));
    }
}

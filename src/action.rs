use std::fmt::{Debug, Formatter};
use serde::{Deserialize, Serialize};
use crate::Character;
use crate::Character::{Ambassador, Assassin, Captain, Contessa, Duke};
use crate::error::CoupError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Revenue,
    ForeignAid,
    Coup,
    Duke,
    Assassin,
    Ambassador,
    Captain,
    CounterForeignAidWithDuke,
    CounterAssassinWithContessa,
    CounterCaptainWithCaptain,
    CounterCaptainWithAmbassador,
    Challenge,
    DoNothing,
}

pub static ACTION_KIND_VARIANTS: [ActionKind; 13] = [
    ActionKind::Revenue,
    ActionKind::ForeignAid,
    ActionKind::Coup,
    ActionKind::Duke,
    ActionKind::Assassin,
    ActionKind::Ambassador,
    ActionKind::Captain,
    ActionKind::CounterForeignAidWithDuke,
    ActionKind::CounterAssassinWithContessa,
    ActionKind::CounterCaptainWithCaptain,
    ActionKind::CounterCaptainWithAmbassador,
    ActionKind::Challenge,
    ActionKind::DoNothing,
];

impl ActionKind {
    /// The character whose possession this kind claims, if any.
    pub fn claimed_character(&self) -> Option<Character> {
        match self {
            ActionKind::Duke | ActionKind::CounterForeignAidWithDuke => Some(Duke),
            ActionKind::Assassin => Some(Assassin),
            ActionKind::Ambassador | ActionKind::CounterCaptainWithAmbassador => Some(Ambassador),
            ActionKind::Captain | ActionKind::CounterCaptainWithCaptain => Some(Captain),
            ActionKind::CounterAssassinWithContessa => Some(Contessa),
            ActionKind::Revenue
            | ActionKind::ForeignAid
            | ActionKind::Coup
            | ActionKind::Challenge
            | ActionKind::DoNothing => None,
        }
    }

    pub fn is_challengeable(&self) -> bool {
        self.claimed_character().is_some()
    }

    pub fn is_counterable(&self) -> bool {
        !self.counters().is_empty()
    }

    /// Kinds that may be claimed to block this one.
    pub fn counters(&self) -> &'static [ActionKind] {
        match self {
            ActionKind::ForeignAid => &[ActionKind::CounterForeignAidWithDuke],
            ActionKind::Assassin => &[ActionKind::CounterAssassinWithContessa],
            ActionKind::Captain => &[ActionKind::CounterCaptainWithCaptain, ActionKind::CounterCaptainWithAmbassador],
            _ => &[],
        }
    }

    pub fn is_counter(&self) -> bool {
        matches!(
            self,
            ActionKind::CounterForeignAidWithDuke
                | ActionKind::CounterAssassinWithContessa
                | ActionKind::CounterCaptainWithCaptain
                | ActionKind::CounterCaptainWithAmbassador
        )
    }

    /// Whether this kind can be put forward on a player's own turn.
    pub fn is_proposable(&self) -> bool {
        matches!(
            self,
            ActionKind::Revenue
                | ActionKind::ForeignAid
                | ActionKind::Coup
                | ActionKind::Duke
                | ActionKind::Assassin
                | ActionKind::Ambassador
                | ActionKind::Captain
        )
    }

    pub fn requires_target(&self) -> bool {
        matches!(self, ActionKind::Coup | ActionKind::Assassin | ActionKind::Captain)
    }

    /// Numeric code used by external policies that emit actions as integers.
    pub fn code(&self) -> i8 {
        match self {
            ActionKind::DoNothing => 0,
            ActionKind::Challenge => 1,
            ActionKind::Revenue => 2,
            ActionKind::ForeignAid => 3,
            ActionKind::Coup => 4,
            ActionKind::Duke => 5,
            ActionKind::Assassin => 6,
            ActionKind::Ambassador => 7,
            ActionKind::Captain => 8,
            ActionKind::CounterForeignAidWithDuke => 10,
            ActionKind::CounterAssassinWithContessa => 11,
            ActionKind::CounterCaptainWithCaptain => 12,
            ActionKind::CounterCaptainWithAmbassador => 13,
        }
    }
}

impl TryFrom<i8> for ActionKind {
    type Error = CoupError;

    fn try_from(code: i8) -> Result<Self, Self::Error> {
        ACTION_KIND_VARIANTS
            .iter()
            .copied()
            .find(|kind| kind.code() == code)
            .ok_or(CoupError::UnknownActionKind(code))
    }
}

/// A proposed move. Contestability flags are derived from the kind, so an
/// action can only be built through [`Action::new`] and never changes after.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "ActionRepr")]
pub struct Action {
    kind: ActionKind,
    origin: usize,
    target: Option<usize>,
    can_be_challenged: bool,
    can_be_countered: bool,
}

#[derive(Deserialize)]
struct ActionRepr {
    kind: ActionKind,
    origin: usize,
    target: Option<usize>,
}

impl From<ActionRepr> for Action {
    fn from(repr: ActionRepr) -> Self {
        Action::new(repr.kind, repr.origin, repr.target)
    }
}

impl Action {
    pub fn new(kind: ActionKind, origin: usize, target: Option<usize>) -> Self {
        Self {
            kind,
            origin,
            target,
            can_be_challenged: kind.is_challengeable(),
            can_be_countered: kind.is_counterable(),
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn origin(&self) -> usize {
        self.origin
    }

    pub fn target(&self) -> Option<usize> {
        self.target
    }

    pub fn can_be_challenged(&self) -> bool {
        self.can_be_challenged
    }

    pub fn can_be_countered(&self) -> bool {
        self.can_be_countered
    }

    pub fn is_contestable(&self) -> bool {
        self.can_be_challenged || self.can_be_countered
    }
}

impl Debug for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let player_idx = self.origin;
        let target = match self.target {
            Some(target_player_idx) => format!("{target_player_idx}"),
            None => "nobody".to_string(),
        };

        match self.kind {
            ActionKind::Revenue => {
                f.write_fmt(format_args!("Player {player_idx} takes revenue"))
            }
            ActionKind::ForeignAid => {
                f.write_fmt(format_args!("Player {player_idx} gets foreign aid"))
            }
            ActionKind::Coup => {
                f.write_fmt(format_args!("Player {player_idx} coups {target}"))
            }
            ActionKind::Duke => {
                f.write_fmt(format_args!("Player {player_idx} taxes as Duke"))
            }
            ActionKind::Assassin => {
                f.write_fmt(format_args!("Player {player_idx} assassinates {target}"))
            }
            ActionKind::Ambassador => {
                f.write_fmt(format_args!("Player {player_idx} exchanges as Ambassador"))
            }
            ActionKind::Captain => {
                f.write_fmt(format_args!("Player {player_idx} steals from {target}"))
            }
            ActionKind::CounterForeignAidWithDuke => {
                f.write_fmt(format_args!("Player {player_idx} blocks foreign aid of {target} with Duke"))
            }
            ActionKind::CounterAssassinWithContessa => {
                f.write_fmt(format_args!("Player {player_idx} blocks assassination by {target} with Contessa"))
            }
            ActionKind::CounterCaptainWithCaptain => {
                f.write_fmt(format_args!("Player {player_idx} blocks steal by {target} with Captain"))
            }
            ActionKind::CounterCaptainWithAmbassador => {
                f.write_fmt(format_args!("Player {player_idx} blocks steal by {target} with Ambassador"))
            }
            ActionKind::Challenge => {
                f.write_fmt(format_args!("Player {player_idx} challenges {target}"))
            }
            ActionKind::DoNothing => {
                f.write_fmt(format_args!("Player {player_idx} does nothing"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::action::{Action, ActionKind, ACTION_KIND_VARIANTS};
    use crate::Character::{Ambassador, Captain, Contessa, Duke};
    use crate::error::CoupError;

    #[test]
    fn flags_follow_kind() {
        let tax = Action::new(ActionKind::Duke, 0, None);
        assert!(tax.can_be_challenged());
        assert!(!tax.can_be_countered());

        let aid = Action::new(ActionKind::ForeignAid, 0, None);
        assert!(!aid.can_be_challenged());
        assert!(aid.can_be_countered());

        let steal = Action::new(ActionKind::Captain, 0, Some(2));
        assert!(steal.can_be_challenged());
        assert!(steal.can_be_countered());

        for kind in [ActionKind::Revenue, ActionKind::Coup, ActionKind::Challenge, ActionKind::DoNothing] {
            assert!(!Action::new(kind, 0, None).is_contestable());
        }
    }

    #[test]
    fn counters_claim_their_character() {
        assert_eq!(ActionKind::CounterForeignAidWithDuke.claimed_character(), Some(Duke));
        assert_eq!(ActionKind::CounterAssassinWithContessa.claimed_character(), Some(Contessa));
        assert_eq!(ActionKind::CounterCaptainWithCaptain.claimed_character(), Some(Captain));
        assert_eq!(ActionKind::CounterCaptainWithAmbassador.claimed_character(), Some(Ambassador));

        // every counter is challengeable but can't itself be countered
        for kind in ACTION_KIND_VARIANTS.iter().filter(|k| k.is_counter()) {
            assert!(kind.is_challengeable());
            assert!(!kind.is_counterable());
            assert!(!kind.is_proposable());
        }
    }

    #[test]
    fn codes() {
        for kind in ACTION_KIND_VARIANTS {
            assert_eq!(ActionKind::try_from(kind.code()).unwrap(), kind);
        }

        // 9 was a bare "contessa" action that never had a meaning
        assert!(matches!(ActionKind::try_from(9), Err(CoupError::UnknownActionKind(9))));
        assert!(matches!(ActionKind::try_from(-1), Err(CoupError::UnknownActionKind(-1))));
    }

    #[test]
    fn deserialize_recomputes_flags() {
        let json = r#"{"kind":"Assassin","origin":1,"target":3,"can_be_challenged":false,"can_be_countered":false}"#;
        let action: Action = serde_json::from_str(json).unwrap();
        assert_eq!(action, Action::new(ActionKind::Assassin, 1, Some(3)));
        assert!(action.can_be_challenged());
        assert!(action.can_be_countered());
    }

    #[test]
    fn debug_reads_like_narration() {
        assert_eq!(format!("{:?}", Action::new(ActionKind::Captain, 0, Some(2))), "Player 0 steals from 2");
        assert_eq!(format!("{:?}", Action::new(ActionKind::Revenue, 3, None)), "Player 3 takes revenue");
    }
}

use thiserror::Error;
use crate::action::Action;

#[derive(Debug, Error)]
pub enum CoupError {
    /// The proposal breaks a rule of the game. The proposer may try again.
    #[error("illegal action {0:?}: {1}")]
    IllegalAction(Action, &'static str),

    #[error("unknown action kind code {0}")]
    UnknownActionKind(i8),

    #[error("internal invariant violated: {0}")]
    InternalInvariantViolation(String),

    #[error("player {0} has no influence left to lose")]
    NoInfluenceToLose(usize),

    #[error("cannot draw {requested} card(s), only {remaining} left in the deck")]
    DeckExhausted { requested: usize, remaining: usize },

    #[error("invalid table config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl CoupError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoupError::IllegalAction(_, _))
    }

    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        CoupError::InternalInvariantViolation(msg.into())
    }
}

//! Validation errors reported back to the session that caused them

use shared::{ActionKind, Phase};
use thiserror::Error;

/// A rejected request. The `Display` text is what the offending session
/// receives in its `error` message; the room is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Only the host can do that")]
    NotHost,
    #[error("Need {required} players, have {connected}")]
    CapacityShortfall { required: usize, connected: usize },
    #[error("Game already started")]
    AlreadyStarted,
    #[error("Game has not started yet")]
    NotStarted,
    #[error("The game is over")]
    GameOver,
    #[error("You are dead")]
    Dead,
    #[error("Not action time")]
    NotActionTime,
    #[error("{action} is not allowed during {phase}")]
    WrongPhase { action: ActionKind, phase: Phase },
    #[error("Not allowed to {action}")]
    NotAllowed { action: ActionKind },
    #[error("No seer checks left this night")]
    SeerQuotaExhausted,
    #[error("No heals left")]
    NoHealsLeft,
    #[error("unknown or invalid action: {0}")]
    UnknownAction(String),
    #[error("{action} needs a target")]
    MissingTarget { action: ActionKind },
    #[error("No living player with id {0}")]
    InvalidTarget(u32),
    #[error("Guess must be good, evil or a non-doctor role name")]
    InvalidGuess,
    #[error("Votes are only accepted during voting")]
    NotVotingTime,
}

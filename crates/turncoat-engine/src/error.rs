//! Error types for turncoat-engine.
//!
//! Everything here is an expected, user-recoverable condition: the
//! dispatcher renders the message back to the acting player and logs the
//! structured fields. Nothing in the engine panics on bad input.

use thiserror::Error;

use crate::ids::{PlayerId, RoundId, SessionKey};

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in game, round, and session operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An operation was attempted outside the stage(s) it is legal in.
    #[error("{operation} on {id}: expected {expected}, found {actual}")]
    InvalidState {
        operation: &'static str,
        id: String,
        expected: &'static str,
        actual: String,
    },

    /// A leader-only action was attempted by someone else.
    #[error("player {caller} is not the leader of round {round} ({leader} is)")]
    NotLeader {
        round: RoundId,
        leader: PlayerId,
        caller: PlayerId,
    },

    /// A proposed team has the wrong number of members.
    #[error("round {round} needs a team of {expected}, got {actual}")]
    WrongTeamSize {
        round: RoundId,
        expected: usize,
        actual: usize,
    },

    /// The player already voted in this phase of the round.
    #[error("player {player} already voted in round {round}")]
    DuplicateVote { round: RoundId, player: PlayerId },

    /// The player is not in the set this action is reserved to.
    #[error("player {player} is not eligible: {detail}")]
    NotEligible { player: PlayerId, detail: String },

    /// No ruleset covers this roster size.
    #[error("no ruleset for a roster of {player_count}")]
    Configuration { player_count: usize },

    /// The session already has a live game.
    #[error("session {session} already has an active game")]
    DuplicateGame { session: SessionKey },

    /// The session has no live game.
    #[error("session {session} has no active game")]
    NoActiveGame { session: SessionKey },

    /// A persisted record is missing fields or failed to parse.
    #[error("corrupt record at {key}: {detail}")]
    CorruptState { key: String, detail: String },

    /// The session lock was not acquired within its retry budget.
    #[error("lock {key:?} still held after {attempts} attempts")]
    LockTimeout { key: String, attempts: u32 },

    /// The storage collaborator failed.
    #[error("store error: {0}")]
    Store(turncoat_store::Error),
}

impl From<turncoat_store::Error> for Error {
    fn from(error: turncoat_store::Error) -> Self {
        // Lock exhaustion is part of this crate's public taxonomy, not a
        // generic storage fault.
        match error {
            turncoat_store::Error::LockTimeout { key, attempts } => {
                Self::LockTimeout { key, attempts }
            }
            other => Self::Store(other),
        }
    }
}

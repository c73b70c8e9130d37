//! Read models for rendering game state to a chat surface.
//!
//! Summaries are plain serializable values cut from engine snapshots.
//! They follow two disclosure rules: spy identities never appear in a
//! [`GameSummary`] (the engine exposes them separately for private
//! whispers), and mission votes appear only as counts once the mission
//! is decided.

use serde::Serialize;
use turncoat_rules::{GameStage, RoundStage};

use crate::ids::{GameId, PlayerId, RoundId};

/// Which side a player is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Spy,
    GoodGuy,
}

/// Attributed team-vote tallies plus who still owes a vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteBreakdown {
    pub yes: Vec<PlayerId>,
    pub no: Vec<PlayerId>,
    pub pending: Vec<PlayerId>,
}

/// Rendering snapshot of one round.
#[derive(Debug, Clone, Serialize)]
pub struct RoundSummary {
    pub id: RoundId,
    pub index: usize,
    pub stage: RoundStage,
    pub leader: PlayerId,
    pub team_size: usize,
    pub team: Vec<PlayerId>,
    pub team_votes: VoteBreakdown,
    pub mission_votes_cast: usize,
    pub mission_pending: Vec<PlayerId>,
    /// Fail-vote count, populated once the mission is decided.
    pub mission_fail_votes: Option<usize>,
    pub mission_succeeded: Option<bool>,
}

/// One slot on the mission board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundSlot {
    pub team_size: usize,
    /// `Some(true)` won, `Some(false)` lost, `None` not yet played.
    pub outcome: Option<bool>,
}

/// Rendering snapshot of a whole game.
#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub id: GameId,
    pub stage: GameStage,
    pub players: Vec<PlayerId>,
    pub current_leader: Option<PlayerId>,
    pub current_round: Option<RoundId>,
    pub rounds: Vec<RoundSlot>,
    pub rounds_won: usize,
    pub rounds_lost: usize,
}

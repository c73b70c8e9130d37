//! Turncoat Rulebook
//!
//! Pure domain data and math for Turncoat, the hidden-role game: the
//! player-count scaled ruleset table, the closed stage vocabulary, and the
//! two vote tallies. Nothing here touches storage or the clock - every
//! function is total over its arguments, so the contested decisions (tie
//! votes, fail thresholds) are pinned by tests in exactly one place.
//!
//! # Rule Summary
//!
//! A game seats 5-10 players, a minority of whom are secretly spies. Play
//! runs for five rounds. Each round a rotating leader proposes a team of a
//! fixed size, the whole table votes on the proposal (strict majority
//! accepts, a tie rejects), and an accepted team then votes secretly on
//! the mission itself. One fail vote usually sinks a mission; round four
//! takes two. The spies win the moment two missions sink; the good guys
//! win by finishing all five rounds with at most one failure.

mod ruleset;
mod stage;
mod tally;

pub use ruleset::{
    ruleset_for, Ruleset, MAX_PLAYERS, MAX_ROUND_FAILURES, MIN_PLAYERS, ROUNDS_PER_GAME,
};
pub use stage::{GameStage, RoundStage, UnknownStage};
pub use tally::{mission_failed, team_accepted};

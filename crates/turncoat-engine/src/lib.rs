//! Turncoat Game Engine
//!
//! The rules engine for Turncoat, a hidden-role bluffing game played over
//! chat. A minority of players are secretly spies; each round a rotating
//! leader proposes a mission team, the table votes on the proposal, and
//! the approved team votes the mission up or down in secret. The spies
//! win the moment two missions sink; the good guys win by keeping the
//! board to at most one loss across all five rounds.
//!
//! # Model
//!
//! State lives in a key-value store behind the [`KvStore`] port, one
//! field per key, so any Redis-shaped backend can host it. The engine
//! types ([`Game`], [`Round`]) are write-through snapshots: they load a
//! record once, validate transitions against the snapshot, and persist
//! every accepted change before mirroring it in memory.
//!
//! # Concurrency
//!
//! Each chat session runs at most one game, and all of a session's
//! actions serialize through [`SessionRegistry::lock`]. Multi-key
//! transitions order their writes around a single commit point (a stage
//! key or a set-if-absent pointer claim) so a crash between writes
//! leaves a record that a retried action repairs instead of a torn one.
//!
//! # Disclosure
//!
//! Spy identities are handed out by [`Game::spies`] and
//! [`Game::faction_of`] for private whispers. Everything meant for the
//! table goes through [`Game::summary`] and [`Round::summary`], which
//! never name the spies and never attribute mission votes.

mod error;
mod game;
mod ids;
mod keys;
mod record;
mod round;
mod session;
mod summary;

pub use error::{Error, Result};
pub use game::Game;
pub use ids::{GameId, PlayerId, RoundId, SessionKey};
pub use round::Round;
pub use session::SessionRegistry;
pub use summary::{Faction, GameSummary, RoundSlot, RoundSummary, VoteBreakdown};

pub use turncoat_rules::{GameStage, RoundStage};
pub use turncoat_store::KvStore;

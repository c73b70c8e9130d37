//! Session bindings.
//!
//! A session is one chat surface (a channel, a group, a room). Each
//! session runs at most one game at a time through the
//! `session:{key}:game` binding; the binding is claimed with a
//! set-if-absent so two simultaneous `/start`s produce exactly one game.
//!
//! Game actions arrive as independent requests with no ordering
//! guarantee, so callers serialize each session's actions through
//! [`SessionRegistry::lock`] before touching its game.

use std::sync::Arc;

use tracing::info;
use turncoat_store::{KvStore, LockConfig, ScopedLock};

use crate::error::{Error, Result};
use crate::game::Game;
use crate::ids::{GameId, SessionKey};
use crate::keys;

/// Entry point binding chat sessions to games over a shared store.
pub struct SessionRegistry {
    store: Arc<dyn KvStore>,
    lock_config: LockConfig,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            lock_config: LockConfig::default(),
        }
    }

    /// Use a custom retry policy for session locks.
    #[must_use]
    pub fn with_lock_config(mut self, config: LockConfig) -> Self {
        self.lock_config = config;
        self
    }

    /// Create a game and bind it as the session's active game.
    ///
    /// The game record is written before the binding is claimed; a
    /// loser's unbound record is never referenced again.
    pub fn create_game(&self, session: &SessionKey) -> Result<Game> {
        let game = Game::create(Arc::clone(&self.store))?;
        let bound = self
            .store
            .set_nx(&keys::session_game(session), game.id().as_str())?;
        if !bound {
            return Err(Error::DuplicateGame {
                session: session.clone(),
            });
        }
        info!(session = %session, game = %game.id(), "game bound to session");
        Ok(game)
    }

    /// The session's active game id, if any.
    pub fn active_game_id(&self, session: &SessionKey) -> Result<Option<GameId>> {
        Ok(self
            .store
            .get(&keys::session_game(session))?
            .map(GameId::from))
    }

    /// Load the session's active game.
    pub fn active_game(&self, session: &SessionKey) -> Result<Option<Game>> {
        let Some(game_id) = self.active_game_id(session)? else {
            return Ok(None);
        };
        let game = Game::fetch(Arc::clone(&self.store), &game_id)?.ok_or_else(|| {
            Error::CorruptState {
                key: keys::session_game(session),
                detail: format!("points at missing game {game_id}"),
            }
        })?;
        Ok(Some(game))
    }

    /// Unbind the session's game once it is decided or cancelled. The
    /// game record itself stays readable by id.
    pub fn remove_game(&self, session: &SessionKey) -> Result<GameId> {
        let Some(game_id) = self.active_game_id(session)? else {
            return Err(Error::NoActiveGame {
                session: session.clone(),
            });
        };
        self.store.del(&keys::session_game(session))?;
        info!(session = %session, game = %game_id, "game unbound from session");
        Ok(game_id)
    }

    /// The session's action mutex. Hold the guard across a whole
    /// read-decide-write action.
    pub fn lock(&self, session: &SessionKey) -> ScopedLock {
        ScopedLock::with_config(
            Arc::clone(&self.store),
            keys::session_lock(session),
            self.lock_config,
        )
    }

    /// Handle to the shared store.
    pub fn store(&self) -> Arc<dyn KvStore> {
        Arc::clone(&self.store)
    }
}

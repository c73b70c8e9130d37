//! Persisted key layout.
//!
//! Records are field-per-key: every attribute of a game or round lives at
//! its own key, with the store kind that fits it (scalar stage and
//! pointers, sets for membership, a list for the leader queue and round
//! history, hashes for the vote maps). The layout is:
//!
//! ```text
//! game:{gid}:stage              scalar
//! game:{gid}:players            set
//! game:{gid}:spies              set
//! game:{gid}:leader_queue       list
//! game:{gid}:rounds             list
//! game:{gid}:current_round      scalar, set-if-absent guarded
//! game:{gid}:rounds_completed   set
//! game:{gid}:rounds_won         set
//! game:{gid}:rounds_lost        set
//! round:{rid}:stage             scalar
//! round:{rid}:leader            scalar
//! round:{rid}:index             scalar
//! round:{rid}:team_size         scalar
//! round:{rid}:min_fail_votes    scalar
//! round:{rid}:team              set
//! round:{rid}:eligible_voters   set
//! round:{rid}:team_votes        hash, voter -> "true"/"false"
//! round:{rid}:mission_votes     hash, voter -> "true"/"false"
//! session:{key}:game            scalar, set-if-absent guarded
//! session:{key}:lock            scalar, advisory lock sentinel
//! ```
//!
//! A game or round exists iff its stage key does; partially written
//! records stay invisible because the stage key is written last.

use crate::ids::{GameId, RoundId, SessionKey};

pub(crate) fn game_stage(game: &GameId) -> String {
    format!("game:{}:stage", game.as_str())
}

pub(crate) fn game_players(game: &GameId) -> String {
    format!("game:{}:players", game.as_str())
}

pub(crate) fn game_spies(game: &GameId) -> String {
    format!("game:{}:spies", game.as_str())
}

pub(crate) fn game_leader_queue(game: &GameId) -> String {
    format!("game:{}:leader_queue", game.as_str())
}

pub(crate) fn game_rounds(game: &GameId) -> String {
    format!("game:{}:rounds", game.as_str())
}

pub(crate) fn game_current_round(game: &GameId) -> String {
    format!("game:{}:current_round", game.as_str())
}

pub(crate) fn game_rounds_completed(game: &GameId) -> String {
    format!("game:{}:rounds_completed", game.as_str())
}

pub(crate) fn game_rounds_won(game: &GameId) -> String {
    format!("game:{}:rounds_won", game.as_str())
}

pub(crate) fn game_rounds_lost(game: &GameId) -> String {
    format!("game:{}:rounds_lost", game.as_str())
}

pub(crate) fn round_stage(round: &RoundId) -> String {
    format!("round:{}:stage", round.as_str())
}

pub(crate) fn round_leader(round: &RoundId) -> String {
    format!("round:{}:leader", round.as_str())
}

pub(crate) fn round_index(round: &RoundId) -> String {
    format!("round:{}:index", round.as_str())
}

pub(crate) fn round_team_size(round: &RoundId) -> String {
    format!("round:{}:team_size", round.as_str())
}

pub(crate) fn round_min_fail_votes(round: &RoundId) -> String {
    format!("round:{}:min_fail_votes", round.as_str())
}

pub(crate) fn round_team(round: &RoundId) -> String {
    format!("round:{}:team", round.as_str())
}

pub(crate) fn round_eligible_voters(round: &RoundId) -> String {
    format!("round:{}:eligible_voters", round.as_str())
}

pub(crate) fn round_team_votes(round: &RoundId) -> String {
    format!("round:{}:team_votes", round.as_str())
}

pub(crate) fn round_mission_votes(round: &RoundId) -> String {
    format!("round:{}:mission_votes", round.as_str())
}

pub(crate) fn session_game(session: &SessionKey) -> String {
    format!("session:{}:game", session.as_str())
}

pub(crate) fn session_lock(session: &SessionKey) -> String {
    format!("session:{}:lock", session.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_nest_record_then_field() {
        let game = GameId::from("g1");
        assert_eq!(game_stage(&game), "game:g1:stage");
        assert_eq!(game_current_round(&game), "game:g1:current_round");

        let round = RoundId::from("r1");
        assert_eq!(round_mission_votes(&round), "round:r1:mission_votes");

        let session = SessionKey::from("T1:C1");
        assert_eq!(session_game(&session), "session:T1:C1:game");
        assert_eq!(session_lock(&session), "session:T1:C1:lock");
    }
}

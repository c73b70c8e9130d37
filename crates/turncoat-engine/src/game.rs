//! Game lifecycle and the mission board.
//!
//! A game runs `WAITING_FOR_PLAYERS → IN_PROGRESS → GAME_SUCCESS |
//! GAME_FAIL | GAME_CANCELLED`. While in progress it owns at most one
//! round at a time through the `current_round` pointer; completed rounds
//! accumulate in the won/lost sets that decide the game.
//!
//! Like [`Round`], a [`Game`] is a write-through snapshot of a
//! field-per-key record, owned by one request at a time under the session
//! lock. Multi-key transitions order their writes so that a crash between
//! any two leaves a record a retry can repair: the stage key commits
//! `start_game`, the `current_round` pointer commits `start_new_round`,
//! and `complete_round` clears that pointer only after the outcome sets
//! and any terminal stage are down.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};
use turncoat_rules::{ruleset_for, GameStage, MAX_ROUND_FAILURES, ROUNDS_PER_GAME};
use turncoat_store::KvStore;

use crate::error::{Error, Result};
use crate::ids::{GameId, PlayerId, RoundId};
use crate::keys;
use crate::record;
use crate::round::Round;
use crate::summary::{Faction, GameSummary, RoundSlot};

/// Write-through snapshot of one game.
pub struct Game {
    store: Arc<dyn KvStore>,
    id: GameId,
    stage: GameStage,
    players: BTreeSet<PlayerId>,
    spies: BTreeSet<PlayerId>,
    leader_queue: VecDeque<PlayerId>,
    rounds: Vec<RoundId>,
    current_round: Option<RoundId>,
    rounds_completed: BTreeSet<RoundId>,
    rounds_won: BTreeSet<RoundId>,
    rounds_lost: BTreeSet<RoundId>,
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The store handle is not Debug; format the snapshot fields only.
        f.debug_struct("Game")
            .field("id", &self.id)
            .field("stage", &self.stage)
            .field("players", &self.players)
            .field("spies", &self.spies)
            .field("leader_queue", &self.leader_queue)
            .field("rounds", &self.rounds)
            .field("current_round", &self.current_round)
            .field("rounds_completed", &self.rounds_completed)
            .field("rounds_won", &self.rounds_won)
            .field("rounds_lost", &self.rounds_lost)
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Write a fresh lobby record and return its snapshot.
    pub(crate) fn create(store: Arc<dyn KvStore>) -> Result<Self> {
        let id = GameId::generate();
        store.set(&keys::game_stage(&id), GameStage::WaitingForPlayers.as_str())?;
        info!(game = %id, "game created");

        Ok(Self {
            store,
            id,
            stage: GameStage::WaitingForPlayers,
            players: BTreeSet::new(),
            spies: BTreeSet::new(),
            leader_queue: VecDeque::new(),
            rounds: Vec::new(),
            current_round: None,
            rounds_completed: BTreeSet::new(),
            rounds_won: BTreeSet::new(),
            rounds_lost: BTreeSet::new(),
        })
    }

    /// Load the game stored under `id`, or `None` if there is none.
    pub fn fetch(store: Arc<dyn KvStore>, id: &GameId) -> Result<Option<Self>> {
        let stage_key = keys::game_stage(id);
        let stage = match store.get(&stage_key)? {
            None => return Ok(None),
            Some(raw) => GameStage::parse(&raw).map_err(|e| Error::CorruptState {
                key: stage_key,
                detail: e.to_string(),
            })?,
        };

        let players = record::player_set(&*store, &keys::game_players(id))?;
        let spies = record::player_set(&*store, &keys::game_spies(id))?;
        let leader_queue = store
            .list_range(&keys::game_leader_queue(id), 0, -1)?
            .into_iter()
            .map(PlayerId::from)
            .collect();
        let rounds = store
            .list_range(&keys::game_rounds(id), 0, -1)?
            .into_iter()
            .map(RoundId::from)
            .collect();
        let current_round = store
            .get(&keys::game_current_round(id))?
            .map(RoundId::from);
        let rounds_completed =
            record::round_id_set(&*store, &keys::game_rounds_completed(id))?;
        let rounds_won = record::round_id_set(&*store, &keys::game_rounds_won(id))?;
        let rounds_lost = record::round_id_set(&*store, &keys::game_rounds_lost(id))?;

        Ok(Some(Self {
            store,
            id: id.clone(),
            stage,
            players,
            spies,
            leader_queue,
            rounds,
            current_round,
            rounds_completed,
            rounds_won,
            rounds_lost,
        }))
    }

    /// Seat a player in the lobby. Joining twice is a no-op.
    pub fn add_player(&mut self, player: &PlayerId) -> Result<()> {
        if self.stage != GameStage::WaitingForPlayers {
            return Err(self.wrong_stage("add_player", "WAITING_FOR_PLAYERS"));
        }

        let joined = self
            .store
            .set_add(&keys::game_players(&self.id), player.as_str())?;
        if joined {
            self.players.insert(player.clone());
            debug!(game = %self.id, player = %player, seats = self.players.len(), "player joined");
        }
        Ok(())
    }

    /// Deal factions and a leader order, then open the game.
    ///
    /// The roster is frozen from here on. Spy identities are persisted
    /// for [`Game::spies`] but never logged.
    pub fn start_game<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        if self.stage != GameStage::WaitingForPlayers {
            return Err(self.wrong_stage("start_game", "WAITING_FOR_PLAYERS"));
        }
        let ruleset = ruleset_for(self.players.len()).ok_or(Error::Configuration {
            player_count: self.players.len(),
        })?;

        let roster: Vec<PlayerId> = self.players.iter().cloned().collect();
        let spies: BTreeSet<PlayerId> = roster
            .choose_multiple(rng, ruleset.num_spies)
            .cloned()
            .collect();
        let mut order = roster;
        order.shuffle(rng);

        // Clear-then-rewrite makes a retry after a partial failure safe.
        let spies_key = keys::game_spies(&self.id);
        self.store.del(&spies_key)?;
        for spy in &spies {
            self.store.set_add(&spies_key, spy.as_str())?;
        }
        let queue_key = keys::game_leader_queue(&self.id);
        self.store.del(&queue_key)?;
        for player in &order {
            self.store.list_push_back(queue_key.as_str(), player.as_str())?;
        }
        self.set_stage(GameStage::InProgress)?;

        self.spies = spies;
        self.leader_queue = order.into();
        info!(
            game = %self.id,
            players = self.players.len(),
            spies = ruleset.num_spies,
            "game started"
        );
        Ok(())
    }

    /// Open the next round under the next leader.
    ///
    /// The round record is written first and the `current_round` pointer
    /// claims it with a set-if-absent, so two racing callers cannot both
    /// open a round. The leader queue rotates front to back once the
    /// claim holds.
    pub fn start_new_round(&mut self) -> Result<Round> {
        if self.stage != GameStage::InProgress {
            return Err(self.wrong_stage("start_new_round", "IN_PROGRESS"));
        }
        if let Some(in_flight) = &self.current_round {
            return Err(Error::InvalidState {
                operation: "start_new_round",
                id: self.id.to_string(),
                expected: "no round in flight",
                actual: format!("round {in_flight} in flight"),
            });
        }
        if self.is_game_over() {
            return Err(Error::InvalidState {
                operation: "start_new_round",
                id: self.id.to_string(),
                expected: "an undecided game",
                actual: format!(
                    "{} rounds completed, {} lost",
                    self.rounds_completed.len(),
                    self.rounds_lost.len()
                ),
            });
        }

        let ruleset = ruleset_for(self.players.len()).ok_or_else(|| Error::CorruptState {
            key: keys::game_players(&self.id),
            detail: format!("roster of {} has no ruleset", self.players.len()),
        })?;
        let index = self.rounds_completed.len();
        let team_size = ruleset.team_size(index).ok_or_else(|| Error::CorruptState {
            key: keys::game_rounds_completed(&self.id),
            detail: format!("round index {index} is off the board"),
        })?;
        let min_fail_votes =
            ruleset
                .fail_votes_needed(index)
                .ok_or_else(|| Error::CorruptState {
                    key: keys::game_rounds_completed(&self.id),
                    detail: format!("round index {index} is off the board"),
                })?;
        let leader = self
            .leader_queue
            .front()
            .cloned()
            .ok_or_else(|| Error::CorruptState {
                key: keys::game_leader_queue(&self.id),
                detail: "leader queue is empty".to_string(),
            })?;

        let round = Round::create(
            Arc::clone(&self.store),
            index,
            leader.clone(),
            team_size,
            min_fail_votes,
            self.players.clone(),
        )?;

        // The pointer is the claim. Losing it leaves an unreferenced
        // round record behind, which nothing ever reads.
        let claimed = self
            .store
            .set_nx(&keys::game_current_round(&self.id), round.id().as_str())?;
        if !claimed {
            return Err(Error::InvalidState {
                operation: "start_new_round",
                id: self.id.to_string(),
                expected: "no round in flight",
                actual: "a concurrently started round".to_string(),
            });
        }
        self.store
            .list_push_back(&keys::game_rounds(&self.id), round.id().as_str())?;

        let queue_key = keys::game_leader_queue(&self.id);
        let rotated = self
            .store
            .list_pop_front(&queue_key)?
            .ok_or_else(|| Error::CorruptState {
                key: queue_key.clone(),
                detail: "leader queue is empty".to_string(),
            })?;
        self.store.list_push_back(&queue_key, &rotated)?;

        self.current_round = Some(round.id().clone());
        self.rounds.push(round.id().clone());
        if let Some(front) = self.leader_queue.pop_front() {
            self.leader_queue.push_back(front);
        }

        info!(
            game = %self.id,
            round = %round.id(),
            index,
            leader = %leader,
            team_size,
            "round started"
        );
        Ok(round)
    }

    /// Abandon the round in flight without scoring it. Used when the
    /// table votes a proposed team down.
    pub fn discard_current_round(&mut self) -> Result<RoundId> {
        let Some(discarded) = self.current_round.take() else {
            return Err(Error::InvalidState {
                operation: "discard_current_round",
                id: self.id.to_string(),
                expected: "a round in flight",
                actual: "none".to_string(),
            });
        };
        self.store.del(&keys::game_current_round(&self.id))?;
        info!(game = %self.id, round = %discarded, "round discarded");
        Ok(discarded)
    }

    /// Score a decided round and settle the game if it is the last.
    ///
    /// The spies win the moment [`MAX_ROUND_FAILURES`] rounds are lost,
    /// even on the same mission tally that completes the board.
    pub fn complete_round(&mut self, round: &Round) -> Result<()> {
        if !round.is_mission_complete() {
            return Err(Error::InvalidState {
                operation: "complete_round",
                id: round.id().to_string(),
                expected: "a decided mission",
                actual: round.stage().to_string(),
            });
        }
        if self.current_round.as_ref() != Some(round.id()) {
            return Err(Error::InvalidState {
                operation: "complete_round",
                id: self.id.to_string(),
                expected: "the round in flight",
                actual: format!("round {}", round.id()),
            });
        }

        let round_id = round.id().clone();
        self.store.set_add(
            &keys::game_rounds_completed(&self.id),
            round_id.as_str(),
        )?;
        self.rounds_completed.insert(round_id.clone());
        if round.is_mission_successful() {
            self.store
                .set_add(&keys::game_rounds_won(&self.id), round_id.as_str())?;
            self.rounds_won.insert(round_id.clone());
        } else {
            self.store
                .set_add(&keys::game_rounds_lost(&self.id), round_id.as_str())?;
            self.rounds_lost.insert(round_id.clone());
        }

        // Terminal stage goes down before the pointer clears so that a
        // crash in between needs only a retry of this call.
        if self.rounds_lost.len() >= MAX_ROUND_FAILURES {
            self.set_stage(GameStage::GameFail)?;
        } else if self.rounds_completed.len() >= ROUNDS_PER_GAME {
            self.set_stage(GameStage::GameSuccess)?;
        }
        self.store.del(&keys::game_current_round(&self.id))?;
        self.current_round = None;

        info!(
            game = %self.id,
            round = %round_id,
            success = round.is_mission_successful(),
            won = self.rounds_won.len(),
            lost = self.rounds_lost.len(),
            "round completed"
        );
        if self.stage.is_terminal() {
            info!(game = %self.id, stage = %self.stage, "game decided");
        }
        Ok(())
    }

    /// Cancel the game on a player's request. Any seated player may
    /// cancel at any point short of a prior cancellation.
    pub fn cancel_game(&mut self, player: &PlayerId) -> Result<()> {
        if self.stage == GameStage::GameCancelled {
            return Err(self.wrong_stage("cancel_game", "a game not already cancelled"));
        }
        if !self.players.contains(player) {
            return Err(Error::NotEligible {
                player: player.clone(),
                detail: format!("not a player of game {}", self.id),
            });
        }

        self.set_stage(GameStage::GameCancelled)?;
        info!(game = %self.id, player = %player, "game cancelled");
        Ok(())
    }

    pub fn id(&self) -> &GameId {
        &self.id
    }

    pub fn stage(&self) -> GameStage {
        self.stage
    }

    pub fn players(&self) -> &BTreeSet<PlayerId> {
        &self.players
    }

    /// The spy roster. For private whispers only; summaries never carry
    /// it.
    pub fn spies(&self) -> &BTreeSet<PlayerId> {
        &self.spies
    }

    pub fn contains_player(&self, player: &PlayerId) -> bool {
        self.players.contains(player)
    }

    pub fn is_spy(&self, player: &PlayerId) -> bool {
        self.spies.contains(player)
    }

    /// A seated player's faction, `None` before factions are dealt or
    /// for outsiders.
    pub fn faction_of(&self, player: &PlayerId) -> Option<Faction> {
        if self.stage == GameStage::WaitingForPlayers || !self.players.contains(player) {
            return None;
        }
        Some(if self.spies.contains(player) {
            Faction::Spy
        } else {
            Faction::GoodGuy
        })
    }

    /// Leader of the round in flight, or the next leader between rounds.
    pub fn current_leader(&self) -> Option<&PlayerId> {
        if self.stage != GameStage::InProgress {
            return None;
        }
        if self.current_round.is_some() {
            self.leader_queue.back()
        } else {
            self.leader_queue.front()
        }
    }

    /// Every round ever started, including discarded ones, in order.
    pub fn rounds(&self) -> &[RoundId] {
        &self.rounds
    }

    pub fn current_round_id(&self) -> Option<&RoundId> {
        self.current_round.as_ref()
    }

    /// Load the round in flight, if any.
    pub fn fetch_current_round(&self) -> Result<Option<Round>> {
        let Some(round_id) = &self.current_round else {
            return Ok(None);
        };
        let round = Round::fetch(Arc::clone(&self.store), round_id)?.ok_or_else(|| {
            Error::CorruptState {
                key: keys::game_current_round(&self.id),
                detail: format!("points at missing round {round_id}"),
            }
        })?;
        Ok(Some(round))
    }

    /// Team size for the round at the board's current position.
    pub fn current_round_team_size(&self) -> Option<usize> {
        ruleset_for(self.players.len())?.team_size(self.rounds_completed.len())
    }

    /// Fail votes that would sink the round at the board's current
    /// position.
    pub fn current_round_min_fail_votes(&self) -> Option<usize> {
        ruleset_for(self.players.len())?.fail_votes_needed(self.rounds_completed.len())
    }

    /// Whether the board is settled: enough losses for the spies or the
    /// full count of rounds played out.
    pub fn is_game_over(&self) -> bool {
        self.rounds_lost.len() >= MAX_ROUND_FAILURES
            || self.rounds_completed.len() >= ROUNDS_PER_GAME
    }

    /// Whether the good guys held the board to fewer losses than the
    /// spies need.
    pub fn is_game_successful(&self) -> bool {
        self.is_game_over() && self.rounds_lost.len() < MAX_ROUND_FAILURES
    }

    /// Read model for rendering. Spy identities never appear.
    pub fn summary(&self) -> GameSummary {
        let mut slots: Vec<RoundSlot> = match ruleset_for(self.players.len()) {
            Some(ruleset) => ruleset
                .team_sizes
                .iter()
                .map(|&team_size| RoundSlot {
                    team_size,
                    outcome: None,
                })
                .collect(),
            None => Vec::new(),
        };
        let mut position = 0;
        for round_id in &self.rounds {
            if !self.rounds_completed.contains(round_id) {
                continue;
            }
            let Some(slot) = slots.get_mut(position) else {
                break;
            };
            slot.outcome = Some(self.rounds_won.contains(round_id));
            position += 1;
        }

        GameSummary {
            id: self.id.clone(),
            stage: self.stage,
            players: self.players.iter().cloned().collect(),
            current_leader: self.current_leader().cloned(),
            current_round: self.current_round.clone(),
            rounds: slots,
            rounds_won: self.rounds_won.len(),
            rounds_lost: self.rounds_lost.len(),
        }
    }

    fn set_stage(&mut self, stage: GameStage) -> Result<()> {
        self.store.set(&keys::game_stage(&self.id), stage.as_str())?;
        self.stage = stage;
        Ok(())
    }

    fn wrong_stage(&self, operation: &'static str, expected: &'static str) -> Error {
        Error::InvalidState {
            operation,
            id: self.id.to_string(),
            expected,
            actual: self.stage.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use turncoat_rules::{MAX_PLAYERS, MIN_PLAYERS};
    use turncoat_store::MemoryStore;

    fn memory() -> Arc<dyn KvStore> {
        Arc::new(MemoryStore::new())
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn player(name: &str) -> PlayerId {
        PlayerId::from(name)
    }

    fn lobby(store: &Arc<dyn KvStore>, names: &[&str]) -> Game {
        let mut game = Game::create(Arc::clone(store)).unwrap();
        for name in names {
            game.add_player(&player(name)).unwrap();
        }
        game
    }

    fn started(store: &Arc<dyn KvStore>, names: &[&str]) -> Game {
        let mut game = lobby(store, names);
        game.start_game(&mut rng()).unwrap();
        game
    }

    /// Plays one full round: the leader drafts the alphabetically first
    /// players, the table approves unanimously, and the team casts
    /// exactly as many fail votes as the mission needs to sink, or none.
    fn play_round(game: &mut Game, succeed: bool) -> RoundId {
        let mut round = game.start_new_round().unwrap();
        let leader = round.leader().clone();
        let team: BTreeSet<PlayerId> = round
            .eligible_voters()
            .iter()
            .take(round.team_size())
            .cloned()
            .collect();
        round.choose_team(&leader, team.clone()).unwrap();
        for voter in round.eligible_voters().clone() {
            round.add_team_vote(&voter, true).unwrap();
        }
        let fails_needed = if succeed { 0 } else { round.min_fail_votes() };
        for (cast, member) in team.iter().enumerate() {
            round.add_mission_vote(member, cast >= fails_needed).unwrap();
        }
        assert_eq!(round.is_mission_successful(), succeed);
        let id = round.id().clone();
        game.complete_round(&round).unwrap();
        id
    }

    const FIVE: [&str; 5] = ["ada", "bob", "cat", "dan", "eve"];
    const SEVEN: [&str; 7] = ["ada", "bob", "cat", "dan", "eve", "fay", "gil"];

    #[test]
    fn players_join_only_while_waiting() {
        let store = memory();
        let mut game = lobby(&store, &FIVE);
        assert_eq!(game.players().len(), 5);
        assert!(game.contains_player(&player("cat")));

        // Rejoining is harmless.
        game.add_player(&player("cat")).unwrap();
        assert_eq!(game.players().len(), 5);

        game.start_game(&mut rng()).unwrap();
        let err = game.add_player(&player("zed")).unwrap_err();
        assert!(matches!(err, Error::InvalidState { operation: "add_player", .. }));
    }

    #[test]
    fn start_game_needs_a_legal_roster() {
        let store = memory();
        let mut small = lobby(&store, &["ada", "bob", "cat", "dan"]);
        let err = small.start_game(&mut rng()).unwrap_err();
        assert!(matches!(err, Error::Configuration { player_count: 4 }));

        let eleven: Vec<String> = (0..11).map(|n| format!("p{n}")).collect();
        let names: Vec<&str> = eleven.iter().map(String::as_str).collect();
        let mut big = lobby(&store, &names);
        let err = big.start_game(&mut rng()).unwrap_err();
        assert!(matches!(err, Error::Configuration { player_count: 11 }));

        let mut game = lobby(&store, &FIVE);
        game.start_game(&mut rng()).unwrap();
        assert_eq!(game.stage(), GameStage::InProgress);
        let err = game.start_game(&mut rng()).unwrap_err();
        assert!(matches!(err, Error::InvalidState { operation: "start_game", .. }));
    }

    #[test]
    fn start_game_deals_spies_and_a_full_leader_queue() {
        let store = memory();
        let mut game = lobby(&store, &SEVEN);
        assert_eq!(game.faction_of(&player("ada")), None);

        game.start_game(&mut rng()).unwrap();
        assert_eq!(game.spies().len(), 3);
        for spy in game.spies().clone() {
            assert!(game.contains_player(&spy));
            assert!(game.is_spy(&spy));
            assert_eq!(game.faction_of(&spy), Some(Faction::Spy));
        }
        let good_guy = game
            .players()
            .iter()
            .find(|p| !game.is_spy(p))
            .cloned()
            .unwrap();
        assert_eq!(game.faction_of(&good_guy), Some(Faction::GoodGuy));
        assert_eq!(game.faction_of(&player("zed")), None);
    }

    #[test]
    fn every_table_size_deals_the_rulebook_spy_count() {
        for count in MIN_PLAYERS..=MAX_PLAYERS {
            let roster: Vec<String> = (0..count).map(|n| format!("p{n}")).collect();
            let names: Vec<&str> = roster.iter().map(String::as_str).collect();
            let store = memory();
            let mut game = lobby(&store, &names);
            game.start_game(&mut rng()).unwrap();

            let expected = ruleset_for(count).unwrap().num_spies;
            assert_eq!(
                game.spies().len(),
                expected,
                "{} players should deal {} spies",
                count,
                expected
            );
            for spy in game.spies() {
                assert!(game.contains_player(spy), "spy {} is not seated", spy);
            }
        }
    }

    #[test]
    fn leadership_rotates_through_the_whole_table() {
        let store = memory();
        let mut game = started(&store, &FIVE);

        let mut leaders = Vec::new();
        for _ in 0..6 {
            let round = game.start_new_round().unwrap();
            assert_eq!(round.index(), 0, "discarded rounds replay the same slot");
            assert_eq!(game.current_leader(), Some(round.leader()));
            leaders.push(round.leader().clone());
            game.discard_current_round().unwrap();
        }

        let distinct: BTreeSet<&PlayerId> = leaders[..5].iter().collect();
        assert_eq!(distinct.len(), 5, "first five leaders cover the table");
        assert_eq!(leaders[5], leaders[0], "the sixth round wraps around");
        assert_eq!(game.rounds().len(), 6);
        assert!(game.rounds_completed.is_empty());
    }

    #[test]
    fn only_one_round_runs_at_a_time() {
        let store = memory();
        let mut game = started(&store, &FIVE);

        let lobby_err = lobby(&store, &FIVE).start_new_round().unwrap_err();
        assert!(matches!(lobby_err, Error::InvalidState { .. }));

        let round = game.start_new_round().unwrap();
        let err = game.start_new_round().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidState { operation: "start_new_round", .. }
        ));

        // A second snapshot of the same game loses the pointer race.
        let mut rival = Game::fetch(Arc::clone(&store), game.id()).unwrap().unwrap();
        rival.discard_current_round().unwrap();
        rival.start_new_round().unwrap();
        game.current_round = None;
        let err = game.start_new_round().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidState { operation: "start_new_round", .. }
        ));
        drop(round);
    }

    #[test]
    fn two_lost_missions_hand_the_spies_the_game() {
        let store = memory();
        let mut game = started(&store, &FIVE);

        play_round(&mut game, false);
        assert!(!game.is_game_over());
        play_round(&mut game, false);

        assert!(game.is_game_over());
        assert!(!game.is_game_successful());
        assert_eq!(game.stage(), GameStage::GameFail);
        assert_eq!(game.rounds_lost.len(), 2);

        let err = game.start_new_round().unwrap_err();
        assert!(matches!(err, Error::InvalidState { .. }));
    }

    #[test]
    fn five_missions_with_one_loss_is_a_good_guy_win() {
        let store = memory();
        let mut game = started(&store, &FIVE);

        for succeed in [true, false, true, true, true] {
            assert!(!game.is_game_over());
            play_round(&mut game, succeed);
        }

        assert!(game.is_game_over());
        assert!(game.is_game_successful());
        assert_eq!(game.stage(), GameStage::GameSuccess);

        let summary = game.summary();
        let outcomes: Vec<Option<bool>> = summary.rounds.iter().map(|s| s.outcome).collect();
        assert_eq!(
            outcomes,
            vec![Some(true), Some(false), Some(true), Some(true), Some(true)]
        );
        assert_eq!(summary.rounds_won, 4);
        assert_eq!(summary.rounds_lost, 1);
        assert_eq!(summary.current_leader, None);
    }

    #[test]
    fn completing_a_round_needs_a_decided_current_mission() {
        let store = memory();
        let mut game = started(&store, &FIVE);

        // Undecided round.
        let round = game.start_new_round().unwrap();
        let err = game.complete_round(&round).unwrap_err();
        assert!(matches!(err, Error::InvalidState { expected: "a decided mission", .. }));
        game.discard_current_round().unwrap();

        // Decided but no longer the round in flight.
        let finished = play_round(&mut game, true);
        let stale = Round::fetch(Arc::clone(&store), &finished).unwrap().unwrap();
        let err = game.complete_round(&stale).unwrap_err();
        assert!(matches!(err, Error::InvalidState { expected: "the round in flight", .. }));
        assert_eq!(game.rounds_completed.len(), 1, "the score did not move");
    }

    #[test]
    fn discard_requires_a_round_in_flight() {
        let store = memory();
        let mut game = started(&store, &FIVE);

        let err = game.discard_current_round().unwrap_err();
        assert!(matches!(err, Error::InvalidState { .. }));

        let round = game.start_new_round().unwrap();
        let discarded = game.discard_current_round().unwrap();
        assert_eq!(&discarded, round.id());
        assert!(game.current_round_id().is_none());
        assert!(game.fetch_current_round().unwrap().is_none());

        let err = game.discard_current_round().unwrap_err();
        assert!(matches!(err, Error::InvalidState { .. }));
    }

    #[test]
    fn the_board_scales_team_sizes_by_position() {
        let store = memory();
        let mut game = started(&store, &FIVE);

        for expected in [2, 3, 2, 3, 3] {
            assert_eq!(game.current_round_team_size(), Some(expected));
            play_round(&mut game, true);
        }
        assert_eq!(game.current_round_team_size(), None);
    }

    #[test]
    fn the_fourth_mission_needs_two_fail_votes() {
        let store = memory();
        let mut game = started(&store, &FIVE);
        for _ in 0..3 {
            play_round(&mut game, true);
        }
        assert_eq!(game.current_round_min_fail_votes(), Some(2));

        // One fail vote is not enough at this position.
        let mut round = game.start_new_round().unwrap();
        let leader = round.leader().clone();
        let team: BTreeSet<PlayerId> = round
            .eligible_voters()
            .iter()
            .take(round.team_size())
            .cloned()
            .collect();
        round.choose_team(&leader, team.clone()).unwrap();
        for voter in round.eligible_voters().clone() {
            round.add_team_vote(&voter, true).unwrap();
        }
        for (cast, member) in team.iter().enumerate() {
            round.add_mission_vote(member, cast >= 1).unwrap();
        }
        assert!(round.is_mission_successful());
    }

    #[test]
    fn cancel_needs_a_seated_player_and_happens_once() {
        let store = memory();
        let mut game = started(&store, &FIVE);

        let err = game.cancel_game(&player("zed")).unwrap_err();
        assert!(matches!(err, Error::NotEligible { .. }));
        assert_eq!(game.stage(), GameStage::InProgress);

        game.cancel_game(&player("bob")).unwrap();
        assert_eq!(game.stage(), GameStage::GameCancelled);

        let err = game.cancel_game(&player("bob")).unwrap_err();
        assert!(matches!(err, Error::InvalidState { operation: "cancel_game", .. }));

        // Cancelled games take no further rounds even though the board
        // is not settled.
        assert!(!game.is_game_over());
        let err = game.start_new_round().unwrap_err();
        assert!(matches!(err, Error::InvalidState { .. }));
    }

    #[test]
    fn a_lobby_can_be_cancelled_by_a_seated_player() {
        let store = memory();
        let mut game = lobby(&store, &["ada", "bob"]);
        game.cancel_game(&player("ada")).unwrap();
        assert_eq!(game.stage(), GameStage::GameCancelled);
    }

    #[test]
    fn fetch_rebuilds_the_snapshot() {
        let store = memory();
        let mut game = started(&store, &FIVE);
        let won = play_round(&mut game, true);

        assert!(Game::fetch(Arc::clone(&store), &GameId::from("missing"))
            .unwrap()
            .is_none());

        let fetched = Game::fetch(Arc::clone(&store), game.id()).unwrap().unwrap();
        assert_eq!(fetched.stage(), GameStage::InProgress);
        assert_eq!(fetched.players(), game.players());
        assert_eq!(fetched.spies(), game.spies());
        assert_eq!(fetched.rounds(), game.rounds());
        assert_eq!(fetched.current_round_id(), None);
        assert_eq!(fetched.current_leader(), game.current_leader());
        assert!(fetched.rounds_won.contains(&won));
        assert_eq!(fetched.rounds_completed.len(), 1);
    }

    #[test]
    fn a_corrupt_stage_is_an_error_not_a_default() {
        let store = memory();
        let game = started(&store, &FIVE);
        store.set(&keys::game_stage(game.id()), "HALTED").unwrap();

        let err = Game::fetch(Arc::clone(&store), game.id()).unwrap_err();
        assert!(matches!(err, Error::CorruptState { .. }));
    }
}

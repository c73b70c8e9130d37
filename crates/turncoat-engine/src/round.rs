//! Round state machine.
//!
//! A round runs `CHOOSING_TEAM → VOTING_ON_TEAM`, then either
//! `TEAM_DENIED` (the table rejected the proposal) or
//! `VOTING_ON_MISSION → MISSION_SUCCESS | MISSION_FAIL`. The record
//! persists field-per-key under `round:{id}:*`; a [`Round`] value is a
//! write-through snapshot of it, owned by one request at a time under the
//! session lock.
//!
//! Vote hashes store full attribution so tallies stay auditable. Mission
//! votes are anonymous to the table as a rendering rule: the summary
//! exposes only counts and who has not voted yet, never who voted what.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use tracing::debug;
use turncoat_rules::{mission_failed, team_accepted, RoundStage};
use turncoat_store::KvStore;

use crate::error::{Error, Result};
use crate::ids::{PlayerId, RoundId};
use crate::keys;
use crate::record;
use crate::summary::{RoundSummary, VoteBreakdown};

/// Write-through snapshot of one round.
pub struct Round {
    store: Arc<dyn KvStore>,
    id: RoundId,
    stage: RoundStage,
    index: usize,
    leader: PlayerId,
    team_size: usize,
    min_fail_votes: usize,
    team: BTreeSet<PlayerId>,
    eligible_voters: BTreeSet<PlayerId>,
    team_votes: BTreeMap<PlayerId, bool>,
    mission_votes: BTreeMap<PlayerId, bool>,
}

impl fmt::Debug for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The store handle is not Debug; format the snapshot fields only.
        f.debug_struct("Round")
            .field("id", &self.id)
            .field("stage", &self.stage)
            .field("index", &self.index)
            .field("leader", &self.leader)
            .field("team_size", &self.team_size)
            .field("min_fail_votes", &self.min_fail_votes)
            .field("team", &self.team)
            .field("eligible_voters", &self.eligible_voters)
            .field("team_votes", &self.team_votes)
            .field("mission_votes", &self.mission_votes)
            .finish_non_exhaustive()
    }
}

impl Round {
    /// Write a fresh round record and return its snapshot.
    ///
    /// The stage key goes last: a record is invisible to [`Round::fetch`]
    /// until every other field is in place.
    pub(crate) fn create(
        store: Arc<dyn KvStore>,
        index: usize,
        leader: PlayerId,
        team_size: usize,
        min_fail_votes: usize,
        eligible_voters: BTreeSet<PlayerId>,
    ) -> Result<Self> {
        let id = RoundId::generate();
        store.set(&keys::round_leader(&id), leader.as_str())?;
        store.set(&keys::round_index(&id), &index.to_string())?;
        store.set(&keys::round_team_size(&id), &team_size.to_string())?;
        store.set(&keys::round_min_fail_votes(&id), &min_fail_votes.to_string())?;
        for voter in &eligible_voters {
            store.set_add(&keys::round_eligible_voters(&id), voter.as_str())?;
        }
        store.set(&keys::round_stage(&id), RoundStage::ChoosingTeam.as_str())?;
        debug!(round = %id, index, leader = %leader, team_size, "round created");

        Ok(Self {
            store,
            id,
            stage: RoundStage::ChoosingTeam,
            index,
            leader,
            team_size,
            min_fail_votes,
            team: BTreeSet::new(),
            eligible_voters,
            team_votes: BTreeMap::new(),
            mission_votes: BTreeMap::new(),
        })
    }

    /// Load the round stored under `id`, or `None` if there is none.
    pub fn fetch(store: Arc<dyn KvStore>, id: &RoundId) -> Result<Option<Self>> {
        let stage_key = keys::round_stage(id);
        let stage = match store.get(&stage_key)? {
            None => return Ok(None),
            Some(raw) => RoundStage::parse(&raw).map_err(|e| Error::CorruptState {
                key: stage_key,
                detail: e.to_string(),
            })?,
        };

        let leader = PlayerId::from(record::require_scalar(&*store, &keys::round_leader(id))?);
        let index = record::require_usize(&*store, &keys::round_index(id))?;
        let team_size = record::require_usize(&*store, &keys::round_team_size(id))?;
        let min_fail_votes =
            record::require_usize(&*store, &keys::round_min_fail_votes(id))?;
        let team = record::player_set(&*store, &keys::round_team(id))?;
        let eligible_voters =
            record::player_set(&*store, &keys::round_eligible_voters(id))?;
        let team_votes = record::vote_map(&*store, &keys::round_team_votes(id))?;
        let mission_votes = record::vote_map(&*store, &keys::round_mission_votes(id))?;

        Ok(Some(Self {
            store,
            id: id.clone(),
            stage,
            index,
            leader,
            team_size,
            min_fail_votes,
            team,
            eligible_voters,
            team_votes,
            mission_votes,
        }))
    }

    /// Propose the mission team. Leader only, exact size, only while
    /// choosing.
    pub fn choose_team(&mut self, player: &PlayerId, team: BTreeSet<PlayerId>) -> Result<()> {
        if *player != self.leader {
            return Err(Error::NotLeader {
                round: self.id.clone(),
                leader: self.leader.clone(),
                caller: player.clone(),
            });
        }
        if team.len() != self.team_size {
            return Err(Error::WrongTeamSize {
                round: self.id.clone(),
                expected: self.team_size,
                actual: team.len(),
            });
        }
        if self.stage != RoundStage::ChoosingTeam {
            return Err(self.wrong_stage("choose_team", "CHOOSING_TEAM"));
        }
        if let Some(outsider) = team.iter().find(|p| !self.eligible_voters.contains(*p)) {
            return Err(Error::NotEligible {
                player: outsider.clone(),
                detail: format!("not an eligible voter of round {}", self.id),
            });
        }

        // Clear-then-add keeps a retry with a different team from merging
        // the two proposals.
        let team_key = keys::round_team(&self.id);
        self.store.del(&team_key)?;
        for member in &team {
            self.store.set_add(&team_key, member.as_str())?;
        }
        self.set_stage(RoundStage::VotingOnTeam)?;
        self.team = team;
        debug!(round = %self.id, leader = %self.leader, team = ?self.team, "team proposed");
        Ok(())
    }

    /// Record one player's vote on the proposed team. When the last
    /// eligible voter casts, the round moves to `VOTING_ON_MISSION` on a
    /// strict majority of yes votes and `TEAM_DENIED` otherwise.
    pub fn add_team_vote(&mut self, player: &PlayerId, vote: bool) -> Result<()> {
        if self.stage != RoundStage::VotingOnTeam {
            return Err(self.wrong_stage("add_team_vote", "VOTING_ON_TEAM"));
        }
        if !self.eligible_voters.contains(player) {
            return Err(Error::NotEligible {
                player: player.clone(),
                detail: format!("not an eligible voter of round {}", self.id),
            });
        }
        if self.team_votes.contains_key(player) {
            return Err(Error::DuplicateVote {
                round: self.id.clone(),
                player: player.clone(),
            });
        }

        self.store.hash_set(
            &keys::round_team_votes(&self.id),
            player.as_str(),
            record::vote_str(vote),
        )?;
        self.team_votes.insert(player.clone(), vote);
        debug!(round = %self.id, player = %player, "team vote recorded");

        if self.is_team_vote_complete() {
            let (yes, no) = self.team_vote_tally();
            let next = if team_accepted(yes, no) {
                RoundStage::VotingOnMission
            } else {
                RoundStage::TeamDenied
            };
            self.set_stage(next)?;
            debug!(round = %self.id, yes, no, stage = %self.stage, "team vote complete");
        }
        Ok(())
    }

    /// Record one team member's secret vote on the mission. When the last
    /// member casts, the mission fails iff the fail votes reach the
    /// round's threshold.
    pub fn add_mission_vote(&mut self, player: &PlayerId, vote: bool) -> Result<()> {
        if self.stage != RoundStage::VotingOnMission {
            return Err(self.wrong_stage("add_mission_vote", "VOTING_ON_MISSION"));
        }
        if !self.team.contains(player) {
            return Err(Error::NotEligible {
                player: player.clone(),
                detail: format!("not on the mission team of round {}", self.id),
            });
        }
        if self.mission_votes.contains_key(player) {
            return Err(Error::DuplicateVote {
                round: self.id.clone(),
                player: player.clone(),
            });
        }

        self.store.hash_set(
            &keys::round_mission_votes(&self.id),
            player.as_str(),
            record::vote_str(vote),
        )?;
        self.mission_votes.insert(player.clone(), vote);
        debug!(round = %self.id, player = %player, "mission vote recorded");

        if self.mission_votes.len() == self.team.len() {
            let (_, fails) = self.mission_vote_counts();
            let next = if mission_failed(fails, self.min_fail_votes) {
                RoundStage::MissionFail
            } else {
                RoundStage::MissionSuccess
            };
            self.set_stage(next)?;
            debug!(round = %self.id, fails, stage = %self.stage, "mission vote complete");
        }
        Ok(())
    }

    pub fn id(&self) -> &RoundId {
        &self.id
    }

    pub fn stage(&self) -> RoundStage {
        self.stage
    }

    /// Zero-based position among the game's completed rounds at creation.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn leader(&self) -> &PlayerId {
        &self.leader
    }

    pub fn team_size(&self) -> usize {
        self.team_size
    }

    /// Fail votes that sink this round's mission.
    pub fn min_fail_votes(&self) -> usize {
        self.min_fail_votes
    }

    pub fn team(&self) -> &BTreeSet<PlayerId> {
        &self.team
    }

    pub fn eligible_voters(&self) -> &BTreeSet<PlayerId> {
        &self.eligible_voters
    }

    /// Whether every eligible voter has voted on the team.
    pub fn is_team_vote_complete(&self) -> bool {
        self.team_votes.len() == self.eligible_voters.len()
    }

    /// Whether a completed team vote accepted the team. `false` while the
    /// vote is still open.
    pub fn is_team_accepted(&self) -> bool {
        let (yes, no) = self.team_vote_tally();
        self.is_team_vote_complete() && team_accepted(yes, no)
    }

    /// Whether the mission has been decided.
    pub fn is_mission_complete(&self) -> bool {
        matches!(
            self.stage,
            RoundStage::MissionSuccess | RoundStage::MissionFail
        )
    }

    pub fn is_mission_successful(&self) -> bool {
        self.stage == RoundStage::MissionSuccess
    }

    pub fn has_team_voted(&self, player: &PlayerId) -> bool {
        self.team_votes.contains_key(player)
    }

    pub fn has_mission_voted(&self, player: &PlayerId) -> bool {
        self.mission_votes.contains_key(player)
    }

    /// Attributed yes/no/pending partition of the team vote.
    pub fn team_vote_breakdown(&self) -> VoteBreakdown {
        let mut yes = Vec::new();
        let mut no = Vec::new();
        let mut pending = Vec::new();
        for voter in &self.eligible_voters {
            match self.team_votes.get(voter) {
                Some(true) => yes.push(voter.clone()),
                Some(false) => no.push(voter.clone()),
                None => pending.push(voter.clone()),
            }
        }
        VoteBreakdown { yes, no, pending }
    }

    /// `(success, fail)` counts of the mission votes cast so far.
    pub fn mission_vote_counts(&self) -> (usize, usize) {
        let fails = self.mission_votes.values().filter(|v| !**v).count();
        (self.mission_votes.len() - fails, fails)
    }

    /// Team members who have not cast their mission vote yet.
    pub fn mission_pending_voters(&self) -> Vec<PlayerId> {
        self.team
            .iter()
            .filter(|p| !self.mission_votes.contains_key(*p))
            .cloned()
            .collect()
    }

    /// Read model for rendering. Mission votes appear only as counts.
    pub fn summary(&self) -> RoundSummary {
        let (_, fails) = self.mission_vote_counts();
        RoundSummary {
            id: self.id.clone(),
            index: self.index,
            stage: self.stage,
            leader: self.leader.clone(),
            team_size: self.team_size,
            team: self.team.iter().cloned().collect(),
            team_votes: self.team_vote_breakdown(),
            mission_votes_cast: self.mission_votes.len(),
            mission_pending: self.mission_pending_voters(),
            mission_fail_votes: self.is_mission_complete().then_some(fails),
            mission_succeeded: self
                .is_mission_complete()
                .then(|| self.is_mission_successful()),
        }
    }

    fn team_vote_tally(&self) -> (usize, usize) {
        let yes = self.team_votes.values().filter(|v| **v).count();
        (yes, self.team_votes.len() - yes)
    }

    fn set_stage(&mut self, stage: RoundStage) -> Result<()> {
        self.store
            .set(&keys::round_stage(&self.id), stage.as_str())?;
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

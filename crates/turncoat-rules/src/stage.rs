//! Game and round stage vocabulary.
//!
//! Stages persist as their `SCREAMING_SNAKE_CASE` wire strings, one scalar
//! per game or round. Reading a stage back goes through [`GameStage::parse`]
//! / [`RoundStage::parse`] so an unrecognized string is an error at the
//! storage edge, never a silently defaulted stage.

use std::str::FromStr;

/// A stage string that is not part of the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized stage {0:?}")]
pub struct UnknownStage(pub String);

/// Lifecycle stage of a whole game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum GameStage {
    /// Roster still open; rounds cannot start.
    WaitingForPlayers,
    /// Factions assigned, rounds underway.
    InProgress,
    /// Good guys won the required rounds.
    GameSuccess,
    /// Spies sank the allowed number of rounds.
    GameFail,
    /// Abandoned by a player before a verdict.
    GameCancelled,
}

impl GameStage {
    /// The persisted wire string for this stage.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WaitingForPlayers => "WAITING_FOR_PLAYERS",
            Self::InProgress => "IN_PROGRESS",
            Self::GameSuccess => "GAME_SUCCESS",
            Self::GameFail => "GAME_FAIL",
            Self::GameCancelled => "GAME_CANCELLED",
        }
    }

    /// Parse a persisted stage string.
    pub fn parse(s: &str) -> Result<Self, UnknownStage> {
        match s {
            "WAITING_FOR_PLAYERS" => Ok(Self::WaitingForPlayers),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "GAME_SUCCESS" => Ok(Self::GameSuccess),
            "GAME_FAIL" => Ok(Self::GameFail),
            "GAME_CANCELLED" => Ok(Self::GameCancelled),
            other => Err(UnknownStage(other.to_string())),
        }
    }

    /// Whether the game has ended (by verdict or cancellation).
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::GameSuccess | Self::GameFail | Self::GameCancelled)
    }
}

impl std::fmt::Display for GameStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameStage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Lifecycle stage of a single round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum RoundStage {
    /// The leader has not proposed a team yet.
    ChoosingTeam,
    /// Everyone votes on the proposed team.
    VotingOnTeam,
    /// The team vote failed; the round is discarded and replayed.
    TeamDenied,
    /// The accepted team votes secretly on the mission.
    VotingOnMission,
    /// Mission succeeded; counts toward the good guys.
    MissionSuccess,
    /// Mission failed; counts toward the spies.
    MissionFail,
}

impl RoundStage {
    /// The persisted wire string for this stage.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ChoosingTeam => "CHOOSING_TEAM",
            Self::VotingOnTeam => "VOTING_ON_TEAM",
            Self::TeamDenied => "TEAM_DENIED",
            Self::VotingOnMission => "VOTING_ON_MISSION",
            Self::MissionSuccess => "MISSION_SUCCESS",
            Self::MissionFail => "MISSION_FAIL",
        }
    }

    /// Parse a persisted stage string.
    pub fn parse(s: &str) -> Result<Self, UnknownStage> {
        match s {
            "CHOOSING_TEAM" => Ok(Self::ChoosingTeam),
            "VOTING_ON_TEAM" => Ok(Self::VotingOnTeam),
            "TEAM_DENIED" => Ok(Self::TeamDenied),
            "VOTING_ON_MISSION" => Ok(Self::VotingOnMission),
            "MISSION_SUCCESS" => Ok(Self::MissionSuccess),
            "MISSION_FAIL" => Ok(Self::MissionFail),
            other => Err(UnknownStage(other.to_string())),
        }
    }

    /// Whether the round can take no further votes.
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::TeamDenied | Self::MissionSuccess | Self::MissionFail
        )
    }
}

impl std::fmt::Display for RoundStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoundStage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAME_STAGES: [GameStage; 5] = [
        GameStage::WaitingForPlayers,
        GameStage::InProgress,
        GameStage::GameSuccess,
        GameStage::GameFail,
        GameStage::GameCancelled,
    ];

    const ROUND_STAGES: [RoundStage; 6] = [
        RoundStage::ChoosingTeam,
        RoundStage::VotingOnTeam,
        RoundStage::TeamDenied,
        RoundStage::VotingOnMission,
        RoundStage::MissionSuccess,
        RoundStage::MissionFail,
    ];

    #[test]
    fn game_stages_round_trip_through_strings() {
        for stage in GAME_STAGES {
            assert_eq!(GameStage::parse(stage.as_str()), Ok(stage));
            assert_eq!(stage.as_str().parse::<GameStage>(), Ok(stage));
        }
    }

    #[test]
    fn round_stages_round_trip_through_strings() {
        for stage in ROUND_STAGES {
            assert_eq!(RoundStage::parse(stage.as_str()), Ok(stage));
        }
    }

    #[test]
    fn unknown_strings_are_rejected() {
        assert_eq!(
            GameStage::parse("HALF_TIME"),
            Err(UnknownStage("HALF_TIME".to_string()))
        );
        // Case and whitespace are significant on the wire.
        assert!(GameStage::parse("in_progress").is_err());
        assert!(RoundStage::parse(" CHOOSING_TEAM").is_err());
        assert!(RoundStage::parse("").is_err());
    }

    #[test]
    fn terminal_stages() {
        assert!(!GameStage::WaitingForPlayers.is_terminal());
        assert!(!GameStage::InProgress.is_terminal());
        assert!(GameStage::GameSuccess.is_terminal());
        assert!(GameStage::GameFail.is_terminal());
        assert!(GameStage::GameCancelled.is_terminal());

        assert!(!RoundStage::ChoosingTeam.is_terminal());
        assert!(!RoundStage::VotingOnTeam.is_terminal());
        assert!(!RoundStage::VotingOnMission.is_terminal());
        assert!(RoundStage::TeamDenied.is_terminal());
        assert!(RoundStage::MissionSuccess.is_terminal());
        assert!(RoundStage::MissionFail.is_terminal());
    }

    #[test]
    fn display_matches_the_wire_string() {
        assert_eq!(GameStage::WaitingForPlayers.to_string(), "WAITING_FOR_PLAYERS");
        assert_eq!(RoundStage::VotingOnMission.to_string(), "VOTING_ON_MISSION");
    }
}

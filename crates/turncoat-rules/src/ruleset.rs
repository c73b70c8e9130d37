//! Player-count scaled rulebook.
//!
//! Every legal table size (5-10 players) has a fixed ruleset: how many
//! players are secretly spies, how many rounds are played, how large the
//! proposed team is in each round, and how many fail votes sink each
//! round's mission. The values are the printed-rulebook numbers and never
//! change mid-game, so they live in a `const` table rather than storage.

/// Smallest roster a game can start with.
pub const MIN_PLAYERS: usize = 5;

/// Largest roster a game can seat.
pub const MAX_PLAYERS: usize = 10;

/// Rounds played per game, at every table size.
pub const ROUNDS_PER_GAME: usize = 5;

/// Lost rounds that end the game in a spy victory.
pub const MAX_ROUND_FAILURES: usize = 2;

/// The fixed rules for one table size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ruleset {
    /// Players secretly assigned to the spy faction.
    pub num_spies: usize,
    /// Rounds in the game (always [`ROUNDS_PER_GAME`]).
    pub num_rounds: usize,
    /// Team size for each round, in round order.
    pub team_sizes: [usize; ROUNDS_PER_GAME],
    /// Fail votes needed to sink each round's mission, in round order.
    pub min_fail_votes: [usize; ROUNDS_PER_GAME],
    /// Lost rounds that end the game (always [`MAX_ROUND_FAILURES`]).
    pub max_round_failures: usize,
}

// Round four needs two fail votes at every table size; every other round
// fails on a single one.
const RULESETS: [Ruleset; 6] = [
    Ruleset {
        num_spies: 2,
        num_rounds: ROUNDS_PER_GAME,
        team_sizes: [2, 3, 2, 3, 3],
        min_fail_votes: [1, 1, 1, 2, 1],
        max_round_failures: MAX_ROUND_FAILURES,
    },
    Ruleset {
        num_spies: 2,
        num_rounds: ROUNDS_PER_GAME,
        team_sizes: [2, 3, 4, 3, 4],
        min_fail_votes: [1, 1, 1, 2, 1],
        max_round_failures: MAX_ROUND_FAILURES,
    },
    Ruleset {
        num_spies: 3,
        num_rounds: ROUNDS_PER_GAME,
        team_sizes: [2, 3, 3, 4, 4],
        min_fail_votes: [1, 1, 1, 2, 1],
        max_round_failures: MAX_ROUND_FAILURES,
    },
    Ruleset {
        num_spies: 3,
        num_rounds: ROUNDS_PER_GAME,
        team_sizes: [3, 4, 4, 5, 5],
        min_fail_votes: [1, 1, 1, 2, 1],
        max_round_failures: MAX_ROUND_FAILURES,
    },
    Ruleset {
        num_spies: 3,
        num_rounds: ROUNDS_PER_GAME,
        team_sizes: [3, 4, 4, 5, 5],
        min_fail_votes: [1, 1, 1, 2, 1],
        max_round_failures: MAX_ROUND_FAILURES,
    },
    Ruleset {
        num_spies: 4,
        num_rounds: ROUNDS_PER_GAME,
        team_sizes: [3, 4, 4, 5, 5],
        min_fail_votes: [1, 1, 1, 2, 1],
        max_round_failures: MAX_ROUND_FAILURES,
    },
];

// One table entry per legal player count.
const _: () = assert!(RULESETS.len() == MAX_PLAYERS - MIN_PLAYERS + 1);

/// Look up the ruleset for a roster of `player_count` players.
///
/// Returns `None` outside the playable range.
///
/// # Examples
///
/// ```
/// use turncoat_rules::ruleset_for;
///
/// assert_eq!(ruleset_for(7).unwrap().num_spies, 3);
/// assert!(ruleset_for(4).is_none());
/// assert!(ruleset_for(11).is_none());
/// ```
pub const fn ruleset_for(player_count: usize) -> Option<&'static Ruleset> {
    if player_count < MIN_PLAYERS || player_count > MAX_PLAYERS {
        return None;
    }
    Some(&RULESETS[player_count - MIN_PLAYERS])
}

impl Ruleset {
    /// Team size for the zero-indexed round, `None` past the last round.
    pub const fn team_size(&self, round_index: usize) -> Option<usize> {
        if round_index < ROUNDS_PER_GAME {
            Some(self.team_sizes[round_index])
        } else {
            None
        }
    }

    /// Fail votes that sink the zero-indexed round's mission.
    pub const fn fail_votes_needed(&self, round_index: usize) -> Option<usize> {
        if round_index < ROUNDS_PER_GAME {
            Some(self.min_fail_votes[round_index])
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spy_counts_match_the_rulebook() {
        let test_cases = [(5, 2), (6, 2), (7, 3), (8, 3), (9, 3), (10, 4)];

        for (players, spies) in test_cases {
            assert_eq!(
                ruleset_for(players).unwrap().num_spies,
                spies,
                "{} players should seat {} spies",
                players,
                spies
            );
        }
    }

    #[test]
    fn out_of_range_counts_have_no_ruleset() {
        assert!(ruleset_for(0).is_none());
        assert!(ruleset_for(4).is_none());
        assert!(ruleset_for(11).is_none());
        assert!(ruleset_for(usize::MAX).is_none());
    }

    #[test]
    fn spies_are_always_a_minority() {
        for players in MIN_PLAYERS..=MAX_PLAYERS {
            let rules = ruleset_for(players).unwrap();
            assert!(rules.num_spies >= 1);
            assert!(
                rules.num_spies * 2 < players,
                "{} spies of {} players is not a minority",
                rules.num_spies,
                players
            );
        }
    }

    #[test]
    fn team_sizes_fit_the_roster() {
        for players in MIN_PLAYERS..=MAX_PLAYERS {
            let rules = ruleset_for(players).unwrap();
            for (round, &size) in rules.team_sizes.iter().enumerate() {
                assert!(size >= 2, "round {} team too small", round);
                assert!(
                    size <= players,
                    "round {} wants {} of only {} players",
                    round,
                    size,
                    players
                );
            }
        }
    }

    #[test]
    fn fail_thresholds_are_reachable() {
        // Every round must be sinkable by the spies on the team, so the
        // threshold can never exceed the team size.
        for players in MIN_PLAYERS..=MAX_PLAYERS {
            let rules = ruleset_for(players).unwrap();
            for round in 0..ROUNDS_PER_GAME {
                let needed = rules.fail_votes_needed(round).unwrap();
                assert!(needed >= 1);
                assert!(needed <= rules.team_size(round).unwrap());
            }
        }
    }

    #[test]
    fn round_indexing_is_bounded() {
        let rules = ruleset_for(7).unwrap();
        assert_eq!(rules.team_size(0), Some(2));
        assert_eq!(rules.team_size(4), Some(4));
        assert_eq!(rules.team_size(5), None);
        assert_eq!(rules.fail_votes_needed(3), Some(2));
        assert_eq!(rules.fail_votes_needed(ROUNDS_PER_GAME), None);
    }
}

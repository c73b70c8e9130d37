//! Vote mathematics.
//!
//! Two decisions in the game reduce to a comparison, and both comparisons
//! are easy to get subtly wrong:
//! - a proposed team needs a **strict majority** of yes votes, so a tie
//!   rejects the team;
//! - a mission fails as soon as the fail votes **reach** the round's
//!   threshold, so threshold 2 means two fail votes sink it, not three.
//!
//! Both live here as total functions so every caller agrees on the
//! operator.

/// Whether a completed team vote accepts the proposed team.
///
/// # Examples
///
/// ```
/// use turncoat_rules::team_accepted;
///
/// assert!(team_accepted(4, 3));
/// assert!(!team_accepted(3, 3)); // ties reject
/// assert!(!team_accepted(2, 5));
/// ```
pub const fn team_accepted(yes_votes: usize, no_votes: usize) -> bool {
    yes_votes > no_votes
}

/// Whether a completed mission vote fails the mission.
///
/// `min_fail_votes` is the round's threshold from the ruleset; reaching it
/// exactly is enough to fail.
pub const fn mission_failed(fail_votes: usize, min_fail_votes: usize) -> bool {
    fail_votes >= min_fail_votes
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ties_reject_the_team() {
        assert!(!team_accepted(0, 0));
        assert!(!team_accepted(3, 3));
        assert!(!team_accepted(5, 5));
    }

    #[test]
    fn one_extra_yes_accepts() {
        assert!(team_accepted(1, 0));
        assert!(team_accepted(4, 3));
        assert!(team_accepted(6, 5));
    }

    #[test]
    fn threshold_boundaries() {
        // Threshold 1: a single fail vote sinks the mission.
        assert!(!mission_failed(0, 1));
        assert!(mission_failed(1, 1));

        // Threshold 2 (round four): one fail vote is survivable.
        assert!(!mission_failed(1, 2));
        assert!(mission_failed(2, 2));
        assert!(mission_failed(3, 2));
    }

    proptest! {
        #[test]
        fn an_extra_yes_never_rejects_an_accepted_team(yes in 0usize..100, no in 0usize..100) {
            if team_accepted(yes, no) {
                prop_assert!(team_accepted(yes + 1, no));
            }
        }

        #[test]
        fn an_extra_no_never_accepts_a_rejected_team(yes in 0usize..100, no in 0usize..100) {
            if !team_accepted(yes, no) {
                prop_assert!(!team_accepted(yes, no + 1));
            }
        }

        #[test]
        fn acceptance_is_antisymmetric(yes in 0usize..100, no in 0usize..100) {
            // At most one ordering of the same two tallies can accept.
            prop_assert!(!(team_accepted(yes, no) && team_accepted(no, yes)));
        }

        #[test]
        fn extra_fail_votes_never_rescue_a_mission(fails in 0usize..100, threshold in 1usize..10) {
            if mission_failed(fails, threshold) {
                prop_assert!(mission_failed(fails + 1, threshold));
            }
        }

        #[test]
        fn reaching_the_threshold_exactly_fails(threshold in 1usize..10) {
            prop_assert!(mission_failed(threshold, threshold));
            prop_assert!(!mission_failed(threshold - 1, threshold));
        }
    }
}

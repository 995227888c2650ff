//! Independent checker for finished schedules.
//!
//! Re-derives every hard rule from the raw triples without touching the
//! propagator, so a bug in propagation cannot hide itself.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::config::TournamentConfig;
use crate::extract::{Assignment, Match, Occupant};
use crate::model::SlotTriple;
use crate::result::Solution;

/// A broken rule found in an assignment or solution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("slot {triple:?} lies outside the configured dimensions")]
    OutOfRange { triple: SlotTriple },

    #[error("participant {participant} has {actual} matches, expected {expected}")]
    MatchCount {
        participant: usize,
        expected: usize,
        actual: usize,
    },

    #[error("resource {resource} hosts {count} participants at timeslot {timeslot}")]
    ResourceDoubleBooked {
        timeslot: usize,
        resource: usize,
        count: usize,
    },

    #[error("participant {participant} plays {count} matches at timeslot {timeslot}")]
    ParticipantDoubleBooked {
        participant: usize,
        timeslot: usize,
        count: usize,
    },

    #[error("participant {participant} plays at timeslots {first} and {second}, inside the gap")]
    SpacingViolated {
        participant: usize,
        first: usize,
        second: usize,
    },

    #[error("participant view of {participant} disagrees with the assignment")]
    UsageMismatch { participant: usize },

    #[error("timeslot view of {timeslot} disagrees with the assignment")]
    TimeslotViewMismatch { timeslot: usize },

    #[error("objective is {actual}, the assignment uses {expected} resources")]
    ObjectiveMismatch { expected: usize, actual: usize },
}

/// Checks match counts, both exclusion rules and spacing.
///
/// Returns every violation found; an empty vector means the assignment is a
/// valid schedule for `config`.
pub fn check_assignment(config: &TournamentConfig, assignment: &Assignment) -> Vec<Violation> {
    let (n, r, t) = (
        config.participant_count,
        config.resource_count,
        config.timeslot_count,
    );
    let mut violations = Vec::new();

    let mut in_range = Vec::with_capacity(assignment.len());
    for &triple in assignment.iter() {
        if triple.participant < n && triple.timeslot < t && triple.resource < r {
            in_range.push(triple);
        } else {
            violations.push(Violation::OutOfRange { triple });
        }
    }

    let mut matches = vec![0usize; n];
    let mut cell = vec![0usize; t * r];
    let mut busy = vec![0usize; n * t];
    for triple in &in_range {
        matches[triple.participant] += 1;
        cell[triple.timeslot * r + triple.resource] += 1;
        busy[triple.participant * t + triple.timeslot] += 1;
    }

    for (participant, &actual) in matches.iter().enumerate() {
        if actual != config.matches_per_participant {
            violations.push(Violation::MatchCount {
                participant,
                expected: config.matches_per_participant,
                actual,
            });
        }
    }
    for (index, &count) in cell.iter().enumerate() {
        if count > 1 {
            violations.push(Violation::ResourceDoubleBooked {
                timeslot: index / r,
                resource: index % r,
                count,
            });
        }
    }
    for (index, &count) in busy.iter().enumerate() {
        if count > 1 {
            violations.push(Violation::ParticipantDoubleBooked {
                participant: index / t,
                timeslot: index % t,
                count,
            });
        }
    }

    let gap = config.min_gap_between_matches;
    for participant in 0..n {
        let played: Vec<usize> = (0..t)
            .filter(|&slot| busy[participant * t + slot] > 0)
            .collect();
        for (i, &first) in played.iter().enumerate() {
            for &second in played[i + 1..].iter().take_while(|&&s| s - first <= gap) {
                violations.push(Violation::SpacingViolated {
                    participant,
                    first,
                    second,
                });
            }
        }
    }

    violations
}

/// Runs [`check_assignment`] and also checks that both views and the
/// objective agree with the assignment.
pub fn check_solution(config: &TournamentConfig, solution: &Solution) -> Vec<Violation> {
    let assignment = solution.assignment();
    let mut violations = check_assignment(config, assignment);

    let mut expected_matches = vec![Vec::new(); config.participant_count];
    let mut expected_resources = vec![BTreeSet::new(); config.participant_count];
    let mut expected_slots = vec![Vec::new(); config.timeslot_count];
    for triple in assignment.iter() {
        if let Some(list) = expected_matches.get_mut(triple.participant) {
            list.push(Match {
                timeslot: triple.timeslot,
                resource: triple.resource,
            });
        }
        if let Some(set) = expected_resources.get_mut(triple.participant) {
            set.insert(triple.resource);
        }
        if let Some(slot) = expected_slots.get_mut(triple.timeslot) {
            slot.push(Occupant {
                resource: triple.resource,
                participant: triple.participant,
            });
        }
    }

    let view = solution.participant_view();
    for participant in 0..config.participant_count {
        let agrees = view.get(participant).is_some_and(|schedule| {
            schedule.matches == expected_matches[participant]
                && schedule.resources == expected_resources[participant]
        });
        if !agrees {
            violations.push(Violation::UsageMismatch { participant });
        }
    }

    let timeslots = solution.timeslot_view();
    for (timeslot, occupants) in expected_slots.iter_mut().enumerate() {
        occupants.sort_unstable();
        if timeslots.occupants(timeslot) != occupants.as_slice() {
            violations.push(Violation::TimeslotViewMismatch { timeslot });
        }
    }

    let usage: usize = expected_resources.iter().map(BTreeSet::len).sum();
    if usage != solution.objective {
        violations.push(Violation::ObjectiveMismatch {
            expected: usage,
            actual: solution.objective,
        });
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Schedule;
    use crate::model::{SlotSpace, VarState};
    use crate::search::SearchStats;

    fn config() -> TournamentConfig {
        TournamentConfig::default()
            .with_participants(2)
            .with_resources(2)
            .with_timeslots(4)
            .with_matches(2)
            .with_min_gap(1)
    }

    fn assignment(triples: &[(usize, usize, usize)]) -> Assignment {
        Assignment::from_triples(
            triples
                .iter()
                .map(|&(p, t, r)| SlotTriple::new(p, t, r))
                .collect(),
        )
    }

    fn solution(triples: &[(usize, usize, usize)], objective: usize) -> Solution {
        let space = SlotSpace::new(2, 4, 2);
        let mut values = vec![VarState::False; space.len()];
        for &(p, t, r) in triples {
            values[space.var(p, t, r).index()] = VarState::True;
        }
        Solution {
            schedule: Schedule::from_values(&space, &values).unwrap(),
            objective,
            is_optimal: true,
            elapsed_seconds: 0.0,
            stats: SearchStats::default(),
        }
    }

    #[test]
    fn test_valid_assignment() {
        let a = assignment(&[(0, 0, 0), (0, 2, 0), (1, 1, 0), (1, 3, 0)]);
        assert!(check_assignment(&config(), &a).is_empty());
    }

    #[test]
    fn test_match_count() {
        let a = assignment(&[(0, 0, 0), (0, 2, 0), (1, 1, 0)]);
        assert_eq!(
            check_assignment(&config(), &a),
            vec![Violation::MatchCount {
                participant: 1,
                expected: 2,
                actual: 1
            }]
        );
    }

    #[test]
    fn test_double_bookings() {
        let a = assignment(&[(0, 0, 0), (0, 0, 1), (1, 0, 0), (1, 2, 1)]);
        let violations = check_assignment(&config(), &a);
        assert!(violations.contains(&Violation::ResourceDoubleBooked {
            timeslot: 0,
            resource: 0,
            count: 2
        }));
        assert!(violations.contains(&Violation::ParticipantDoubleBooked {
            participant: 0,
            timeslot: 0,
            count: 2
        }));
    }

    #[test]
    fn test_spacing() {
        let a = assignment(&[(0, 0, 0), (0, 1, 1), (1, 0, 1), (1, 2, 1)]);
        assert_eq!(
            check_assignment(&config(), &a),
            vec![Violation::SpacingViolated {
                participant: 0,
                first: 0,
                second: 1
            }]
        );
        // gap 2 also rejects timeslots 0 and 2
        let wide = config().with_min_gap(2);
        assert!(check_assignment(&wide, &a).contains(&Violation::SpacingViolated {
            participant: 1,
            first: 0,
            second: 2
        }));
    }

    #[test]
    fn test_out_of_range() {
        let a = assignment(&[(0, 0, 0), (0, 2, 0), (1, 1, 0), (1, 3, 5)]);
        let violations = check_assignment(&config(), &a);
        assert!(violations.contains(&Violation::OutOfRange {
            triple: SlotTriple::new(1, 3, 5)
        }));
    }

    #[test]
    fn test_solution_checks_objective() {
        let trues = [(0, 0, 0), (0, 2, 1), (1, 1, 0), (1, 3, 0)];
        assert!(check_solution(&config(), &solution(&trues, 3)).is_empty());
        assert_eq!(
            check_solution(&config(), &solution(&trues, 2)),
            vec![Violation::ObjectiveMismatch {
                expected: 3,
                actual: 2
            }]
        );
    }

    #[test]
    fn test_solution_checks_views() {
        let mut s = solution(&[(0, 0, 0), (0, 2, 0), (1, 1, 0), (1, 3, 0)], 2);
        s.schedule.participant_view = Default::default();
        let violations = check_solution(&config(), &s);
        assert!(violations.contains(&Violation::UsageMismatch { participant: 0 }));
        assert!(violations.contains(&Violation::UsageMismatch { participant: 1 }));
    }
}

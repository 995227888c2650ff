//! Result of a solve call.

use std::fmt;

use crate::constraints::CapacityWarning;
use crate::extract::{Assignment, ParticipantView, Schedule, TimeslotView};
use crate::search::SearchStats;

/// Why no schedule was returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoSolutionReason {
    /// The capacity check proved the instance infeasible; no search ran.
    CapacityExceeded,
    /// The whole tree was searched without finding a schedule.
    Exhausted,
    /// The time budget ran out before any schedule was found.
    TimeExpired,
}

impl fmt::Display for NoSolutionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoSolutionReason::CapacityExceeded => write!(f, "capacity exceeded"),
            NoSolutionReason::Exhausted => write!(f, "search space exhausted"),
            NoSolutionReason::TimeExpired => write!(f, "time budget expired"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoSolution {
    pub reason: NoSolutionReason,
    pub elapsed_seconds: f64,
    pub stats: SearchStats,
}

/// A schedule satisfying every hard constraint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    pub schedule: Schedule,
    /// Summed distinct-resource usage over all participants.
    pub objective: usize,
    /// True only if the search finished before the deadline.
    pub is_optimal: bool,
    pub elapsed_seconds: f64,
    pub stats: SearchStats,
}

impl Solution {
    /// Occupants per (timeslot, resource).
    pub fn timeslot_view(&self) -> &TimeslotView {
        &self.schedule.timeslot_view
    }

    /// Matches and resources per participant.
    pub fn participant_view(&self) -> &ParticipantView {
        &self.schedule.participant_view
    }

    /// The raw set of true slots.
    pub fn assignment(&self) -> &Assignment {
        &self.schedule.assignment
    }
}

/// Either a schedule or the reason there is none.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScheduleResult {
    NoSolution(NoSolution),
    Solution(Solution),
}

impl ScheduleResult {
    /// Whether a schedule was found.
    pub fn is_solution(&self) -> bool {
        matches!(self, ScheduleResult::Solution(_))
    }

    /// Whether a schedule was found and proven optimal.
    pub fn is_optimal(&self) -> bool {
        self.solution().is_some_and(|s| s.is_optimal)
    }

    /// The schedule, if one was found.
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            ScheduleResult::Solution(solution) => Some(solution),
            ScheduleResult::NoSolution(_) => None,
        }
    }

    /// The failure details, if no schedule was found.
    pub fn no_solution(&self) -> Option<&NoSolution> {
        match self {
            ScheduleResult::NoSolution(none) => Some(none),
            ScheduleResult::Solution(_) => None,
        }
    }

    /// Search statistics of either outcome.
    pub fn stats(&self) -> &SearchStats {
        match self {
            ScheduleResult::Solution(solution) => &solution.stats,
            ScheduleResult::NoSolution(none) => &none.stats,
        }
    }

    /// Wall-clock time spent, in seconds.
    pub fn elapsed_seconds(&self) -> f64 {
        match self {
            ScheduleResult::Solution(solution) => solution.elapsed_seconds,
            ScheduleResult::NoSolution(none) => none.elapsed_seconds,
        }
    }
}

/// A solve result plus the capacity warnings raised for the instance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolveReport {
    pub result: ScheduleResult,
    pub warnings: Vec<CapacityWarning>,
}

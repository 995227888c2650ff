//! Error taxonomy.
//!
//! Only [`ConfigError`] is fatal to a solve call. Infeasibility and timeouts
//! are ordinary results (see [`crate::result::ScheduleResult`]), and capacity
//! problems are reported as [`crate::constraints::CapacityWarning`]s.

use thiserror::Error;

/// Invalid tournament dimensions, detected before any variable is created.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("participant_count must be positive")]
    ZeroParticipants,

    #[error("resource_count must be positive")]
    ZeroResources,

    #[error("timeslot_count must be positive")]
    ZeroTimeslots,

    #[error("matches_per_participant must be positive")]
    ZeroMatches,

    #[error("matches_per_participant ({matches}) exceeds timeslot_count ({timeslots})")]
    MatchesExceedTimeslots { matches: usize, timeslots: usize },

    #[error(
        "{participants} participants x {timeslots} timeslots x {resources} resources \
         overflows the slot variable count"
    )]
    ModelTooLarge {
        participants: usize,
        timeslots: usize,
        resources: usize,
    },

    #[error("max_solve_seconds must be a positive finite number, got {0}")]
    InvalidTimeBudget(f64),
}

/// A schedule was requested from an assignment that is not terminal.
///
/// This is a contract violation inside the crate, not a user-facing
/// condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IllegalStateError {
    #[error("expected {expected} slot values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("{count} slot variables are still undetermined")]
    Undetermined { count: usize },
}

/// Error type of [`crate::search::Solver::solve`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TournamentError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("illegal state: {0}")]
    IllegalState(#[from] IllegalStateError),
}

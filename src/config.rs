//! Tournament configuration.

use std::time::Duration;

use crate::error::ConfigError;

/// Dimensions and limits of one tournament.
///
/// The defaults describe a 12-participant event on 6 resources over 8
/// timeslots, 4 matches each, with at least one free timeslot between two
/// matches of the same participant.
///
/// # Examples
///
/// ```
/// use u_tournament::TournamentConfig;
///
/// let config = TournamentConfig::default()
///     .with_participants(4)
///     .with_resources(2)
///     .with_timeslots(4)
///     .with_matches(2)
///     .with_max_solve_seconds(5.0);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.demand(), 8);
/// assert_eq!(config.capacity(), 8);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TournamentConfig {
    /// Number of participants (N).
    pub participant_count: usize,
    /// Number of resources (R), e.g. tables or courts.
    pub resource_count: usize,
    /// Number of timeslots (T).
    pub timeslot_count: usize,
    /// Exact number of matches every participant must play (M).
    pub matches_per_participant: usize,
    /// Forward window of timeslots after a match in which the same
    /// participant may not play again. 0 disables the spacing rule.
    pub min_gap_between_matches: usize,
    /// Wall-clock budget for the search, in seconds.
    pub max_solve_seconds: f64,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            participant_count: 12,
            resource_count: 6,
            timeslot_count: 8,
            matches_per_participant: 4,
            min_gap_between_matches: 1,
            max_solve_seconds: 60.0,
        }
    }
}

impl TournamentConfig {
    /// Sets the number of participants.
    pub fn with_participants(mut self, n: usize) -> Self {
        self.participant_count = n;
        self
    }

    /// Sets the number of resources.
    pub fn with_resources(mut self, n: usize) -> Self {
        self.resource_count = n;
        self
    }

    /// Sets the number of timeslots.
    pub fn with_timeslots(mut self, n: usize) -> Self {
        self.timeslot_count = n;
        self
    }

    /// Sets the exact match count per participant.
    pub fn with_matches(mut self, n: usize) -> Self {
        self.matches_per_participant = n;
        self
    }

    /// Sets the spacing window. Values above the timeslot count behave like
    /// the timeslot count (see [`TournamentConfig::effective_gap`]).
    pub fn with_min_gap(mut self, gap: usize) -> Self {
        self.min_gap_between_matches = gap;
        self
    }

    /// Sets the wall-clock budget in seconds.
    pub fn with_max_solve_seconds(mut self, seconds: f64) -> Self {
        self.max_solve_seconds = seconds;
        self
    }

    /// Total number of matches to place (N × M).
    pub fn demand(&self) -> usize {
        self.participant_count
            .saturating_mul(self.matches_per_participant)
    }

    /// Number of (timeslot, resource) cells available (R × T).
    pub fn capacity(&self) -> usize {
        self.resource_count.saturating_mul(self.timeslot_count)
    }

    /// The spacing window clamped to the timeslot count.
    ///
    /// A window of `timeslot_count` already allows one match per participant,
    /// so any larger value means the same thing.
    pub fn effective_gap(&self) -> usize {
        self.min_gap_between_matches.min(self.timeslot_count)
    }

    /// Number of slot variables (N × T × R), or `None` on overflow.
    pub fn slot_count(&self) -> Option<usize> {
        self.participant_count
            .checked_mul(self.timeslot_count)?
            .checked_mul(self.resource_count)
    }

    /// The search budget as a [`Duration`].
    ///
    /// Only meaningful for a validated configuration; invalid budgets map to
    /// [`Duration::ZERO`].
    pub fn time_budget(&self) -> Duration {
        Duration::try_from_secs_f64(self.max_solve_seconds).unwrap_or(Duration::ZERO)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.participant_count == 0 {
            return Err(ConfigError::ZeroParticipants);
        }
        if self.resource_count == 0 {
            return Err(ConfigError::ZeroResources);
        }
        if self.timeslot_count == 0 {
            return Err(ConfigError::ZeroTimeslots);
        }
        if self.matches_per_participant == 0 {
            return Err(ConfigError::ZeroMatches);
        }
        if self.matches_per_participant > self.timeslot_count {
            return Err(ConfigError::MatchesExceedTimeslots {
                matches: self.matches_per_participant,
                timeslots: self.timeslot_count,
            });
        }
        if self.slot_count().is_none() {
            return Err(ConfigError::ModelTooLarge {
                participants: self.participant_count,
                timeslots: self.timeslot_count,
                resources: self.resource_count,
            });
        }
        if !self.max_solve_seconds.is_finite() || self.max_solve_seconds <= 0.0 {
            return Err(ConfigError::InvalidTimeBudget(self.max_solve_seconds));
        }
        Ok(())
    }
}

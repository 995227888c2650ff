//! Cheap necessary-condition checks run before search.

use thiserror::Error;

use crate::config::TournamentConfig;

/// A packing bound that is tight or violated.
///
/// `Exceeded` and `SpacingExceeded` prove that no schedule exists; `Tight`
/// only says every cell must be filled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CapacityWarning {
    #[error(
        "{demand} matches do not fit into {capacity} (timeslot, resource) cells; \
         at least {min_timeslots} timeslots are needed"
    )]
    Exceeded {
        demand: usize,
        capacity: usize,
        min_timeslots: usize,
    },

    #[error("{demand} matches fill all {capacity} (timeslot, resource) cells exactly")]
    Tight { demand: usize, capacity: usize },

    #[error(
        "{matches} matches per participant cannot be spaced out; \
         at most {max_spaced} fit with the configured gap"
    )]
    SpacingExceeded { matches: usize, max_spaced: usize },
}

impl CapacityWarning {
    /// Whether this warning is a proof of infeasibility.
    pub fn proves_infeasible(&self) -> bool {
        !matches!(self, CapacityWarning::Tight { .. })
    }
}

/// Most matches one participant can play in `timeslots` slots when two
/// matches must be more than `gap` slots apart.
pub fn max_spaced_matches(timeslots: usize, gap: usize) -> usize {
    timeslots.div_ceil(gap.saturating_add(1))
}

/// Runs the packing checks for `config`.
///
/// # Examples
///
/// ```
/// use u_tournament::{constraints::check_capacity, TournamentConfig};
///
/// let config = TournamentConfig::default()
///     .with_participants(10)
///     .with_resources(2)
///     .with_timeslots(4)
///     .with_matches(4)
///     .with_min_gap(0);
/// let warnings = check_capacity(&config);
/// assert!(warnings.iter().any(|w| w.proves_infeasible()));
/// ```
pub fn check_capacity(config: &TournamentConfig) -> Vec<CapacityWarning> {
    let mut warnings = Vec::new();
    let demand = config.demand();
    let capacity = config.capacity();

    if demand > capacity {
        warnings.push(CapacityWarning::Exceeded {
            demand,
            capacity,
            min_timeslots: demand.div_ceil(config.resource_count.max(1)),
        });
    } else if demand == capacity {
        warnings.push(CapacityWarning::Tight { demand, capacity });
    }

    let max_spaced = max_spaced_matches(config.timeslot_count, config.effective_gap());
    if config.matches_per_participant > max_spaced {
        warnings.push(CapacityWarning::SpacingExceeded {
            matches: config.matches_per_participant,
            max_spaced,
        });
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_spaced_matches() {
        assert_eq!(max_spaced_matches(8, 0), 8);
        assert_eq!(max_spaced_matches(8, 1), 4);
        assert_eq!(max_spaced_matches(7, 1), 4);
        assert_eq!(max_spaced_matches(7, 2), 3);
        assert_eq!(max_spaced_matches(1, 3), 1);
        assert_eq!(max_spaced_matches(3, usize::MAX), 1);
    }

    #[test]
    fn test_huge_gap_allows_one_match() {
        let config = TournamentConfig::default()
            .with_participants(2)
            .with_resources(1)
            .with_timeslots(3)
            .with_matches(1)
            .with_min_gap(usize::MAX);
        assert!(check_capacity(&config).is_empty());

        let config = config.with_matches(2);
        assert_eq!(
            check_capacity(&config),
            vec![CapacityWarning::SpacingExceeded {
                matches: 2,
                max_spaced: 1
            }]
        );
    }

    #[test]
    fn test_default_is_tight() {
        let warnings = check_capacity(&TournamentConfig::default());
        assert_eq!(
            warnings,
            vec![CapacityWarning::Tight {
                demand: 48,
                capacity: 48
            }]
        );
        assert!(!warnings[0].proves_infeasible());
    }

    #[test]
    fn test_exceeded_suggests_timeslots() {
        let config = TournamentConfig::default()
            .with_participants(10)
            .with_resources(2)
            .with_timeslots(4)
            .with_matches(4)
            .with_min_gap(0);
        let warnings = check_capacity(&config);
        assert_eq!(
            warnings,
            vec![CapacityWarning::Exceeded {
                demand: 40,
                capacity: 8,
                min_timeslots: 20
            }]
        );
    }

    #[test]
    fn test_spacing_exceeded() {
        let config = TournamentConfig::default()
            .with_participants(1)
            .with_resources(4)
            .with_timeslots(5)
            .with_matches(4)
            .with_min_gap(1);
        let warnings = check_capacity(&config);
        assert_eq!(
            warnings,
            vec![CapacityWarning::SpacingExceeded {
                matches: 4,
                max_spaced: 3
            }]
        );
        assert!(warnings[0].proves_infeasible());
    }

    #[test]
    fn test_roomy_config_has_no_warnings() {
        let config = TournamentConfig::default()
            .with_participants(4)
            .with_resources(4)
            .with_timeslots(8)
            .with_matches(2);
        assert!(check_capacity(&config).is_empty());
    }
}

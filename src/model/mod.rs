//! Domain model: the slot-variable space of one tournament.
//!
//! One boolean [`SlotVar`] exists per (participant, timeslot, resource)
//! triple. The space is allocated once by [`DomainModel::new`] and never
//! resized; all lookups are offset arithmetic on a flat index.

mod variables;

pub use variables::{SlotSpace, SlotTriple, SlotVar, VarState};

use crate::config::TournamentConfig;
use crate::error::ConfigError;

/// A validated tournament together with its variable space.
///
/// # Examples
///
/// ```
/// use u_tournament::{model::DomainModel, TournamentConfig};
///
/// let model = DomainModel::new(&TournamentConfig::default()).unwrap();
/// assert_eq!(model.space().len(), 12 * 8 * 6);
///
/// let bad = TournamentConfig::default().with_resources(0);
/// assert!(DomainModel::new(&bad).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct DomainModel {
    config: TournamentConfig,
    space: SlotSpace,
}

impl DomainModel {
    /// Validates `config` and allocates the variable space.
    pub fn new(config: &TournamentConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let space = SlotSpace::new(
            config.participant_count,
            config.timeslot_count,
            config.resource_count,
        );
        Ok(Self {
            config: config.clone(),
            space,
        })
    }

    /// The configuration this model was built from.
    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    /// The slot-variable space.
    pub fn space(&self) -> &SlotSpace {
        &self.space
    }

    /// Exact match count per participant (M).
    pub fn matches_per_participant(&self) -> usize {
        self.config.matches_per_participant
    }

    /// Spacing window, clamped to the timeslot count.
    pub fn min_gap(&self) -> usize {
        self.config.effective_gap()
    }
}

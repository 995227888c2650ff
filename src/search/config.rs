//! Search engine configuration.

/// Knobs of the branch-and-bound engine.
///
/// The time budget is part of [`crate::TournamentConfig`]; these settings
/// only change how the search runs.
///
/// # Examples
///
/// ```
/// use u_tournament::search::SearchConfig;
///
/// let config = SearchConfig::default()
///     .with_seed(7)
///     .with_capacity_precheck(false);
/// assert_eq!(config.seed, Some(7));
/// assert!(!config.parallel);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    /// Seed for shuffling the resource preference order used when picking a
    /// value. `None` prefers lower resource ids, which makes runs
    /// reproducible without a seed.
    pub seed: Option<u64>,

    /// Split the tree below the root across rayon workers.
    ///
    /// Requires the `parallel` feature; without it the engine logs a
    /// warning and searches sequentially.
    pub parallel: bool,

    /// Return `NoSolution` without searching when a packing bound already
    /// proves infeasibility.
    pub capacity_precheck: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            seed: None,
            parallel: false,
            capacity_precheck: true,
        }
    }
}

impl SearchConfig {
    /// Shuffles the resource preference order with `seed`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Requests root-split parallel search (needs the `parallel` feature).
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Enables or disables the early exit on a proven capacity violation.
    pub fn with_capacity_precheck(mut self, enabled: bool) -> Self {
        self.capacity_precheck = enabled;
        self
    }
}

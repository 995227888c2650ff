//! Round-based tournament scheduling.
//!
//! Assigns every participant to exactly `M` (timeslot, resource) slots so
//! that:
//!
//! - a resource hosts at most one participant per timeslot,
//! - a participant plays at most once per timeslot,
//! - two matches of one participant are more than the configured gap apart,
//!
//! while minimizing the summed number of distinct resources each participant
//! plays on.
//!
//! The solver is a purpose-built forward-checking branch-and-bound:
//!
//! - **Model**: one boolean slot variable per (participant, timeslot,
//!   resource) in a flat array ([`model`]).
//! - **Constraints**: exact counts, exclusions, spacing and usage links,
//!   compiled into a pairwise conflict table ([`constraints`]).
//! - **Propagation**: a work-queue pass after every decision with an undo
//!   trail (crate-internal).
//! - **Search**: an explicit state machine with a deadline, bound pruning
//!   and an optional rayon root split ([`search`]).
//! - **Extraction**: timeslot and participant views of the final
//!   assignment ([`extract`]).
//!
//! [`validation`] re-checks any schedule independently; [`report`] and
//! [`export`] render results for people and spreadsheets.
//!
//! # Examples
//!
//! ```
//! use u_tournament::{solve, TournamentConfig};
//!
//! let config = TournamentConfig::default()
//!     .with_participants(4)
//!     .with_resources(2)
//!     .with_timeslots(4)
//!     .with_matches(2)
//!     .with_max_solve_seconds(10.0);
//!
//! let report = solve(&config).unwrap();
//! let solution = report.result.solution().expect("feasible");
//! for (participant, schedule) in solution.participant_view().iter() {
//!     assert_eq!(schedule.matches.len(), 2, "participant {participant}");
//! }
//! ```
//!
//! # Features
//!
//! - `parallel`: split the search tree across rayon workers.
//! - `serde`: `Serialize`/`Deserialize` for configuration and result types.

pub mod config;
pub mod constraints;
pub mod error;
pub mod export;
pub mod extract;
pub mod model;
mod propagator;
pub mod report;
pub mod result;
pub mod search;
pub mod validation;

pub use config::TournamentConfig;
pub use error::{ConfigError, IllegalStateError, TournamentError};
pub use result::{NoSolution, NoSolutionReason, ScheduleResult, Solution, SolveReport};
pub use search::{solve, SearchConfig, Solver};

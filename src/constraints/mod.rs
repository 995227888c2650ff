//! Constraint set: the hard rules of a tournament.
//!
//! # Key Components
//!
//! - [`Constraint`]: exact-count, at-most-one, spacing and usage-link rules
//! - [`ConstraintSet`]: the rules of one model plus a pairwise conflict table
//!   consumed by the propagator
//! - [`check_capacity`]: packing bounds evaluated before any search
//!
//! Exclusion rules are compiled pairwise rather than kept as sums, so that a
//! single true variable immediately forbids every partner.

mod capacity;
mod set;

pub use capacity::{check_capacity, max_spaced_matches, CapacityWarning};
pub use set::{Constraint, ConstraintKind, ConstraintSet, ExclusionScope};

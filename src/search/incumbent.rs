//! Incumbent storage for branch-and-bound.
//!
//! [`LocalIncumbent`] serves a single search tree. [`SharedIncumbent`] is
//! shared by parallel workers: a lock-free atomic upper bound lets workers
//! prune against each other's findings, while the solution itself lives
//! behind a mutex and is only replaced by a strictly better candidate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::model::VarState;

/// The best complete assignment found so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Incumbent {
    pub(crate) objective: usize,
    pub(crate) values: Vec<VarState>,
}

/// Read and update access to the best known objective.
pub(crate) trait IncumbentStore {
    /// Objective of the current incumbent, if any.
    fn upper_bound(&self) -> Option<usize>;

    /// Installs the candidate if it is strictly better than the incumbent.
    fn try_install(&mut self, objective: usize, values: &[VarState]) -> bool;
}

#[derive(Debug, Clone, Default)]
pub(crate) struct LocalIncumbent {
    best: Option<Incumbent>,
}

impl LocalIncumbent {
    pub(crate) fn into_best(self) -> Option<Incumbent> {
        self.best
    }
}

impl IncumbentStore for LocalIncumbent {
    #[inline]
    fn upper_bound(&self) -> Option<usize> {
        self.best.as_ref().map(|b| b.objective)
    }

    fn try_install(&mut self, objective: usize, values: &[VarState]) -> bool {
        if self.upper_bound().is_some_and(|best| objective >= best) {
            return false;
        }
        self.best = Some(Incumbent {
            objective,
            values: values.to_vec(),
        });
        true
    }
}

#[cfg_attr(not(feature = "parallel"), allow(dead_code))]
#[derive(Debug)]
struct SharedSlot {
    best: Option<Incumbent>,
    history: Vec<usize>,
}

/// Incumbent shared between worker threads.
///
/// `upper_bound` starts at `usize::MAX`, meaning no incumbent.
#[cfg_attr(not(feature = "parallel"), allow(dead_code))]
#[derive(Debug)]
pub(crate) struct SharedIncumbent {
    upper_bound: AtomicUsize,
    slot: Mutex<SharedSlot>,
}

impl Default for SharedIncumbent {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(not(feature = "parallel"), allow(dead_code))]
impl SharedIncumbent {
    pub(crate) fn new() -> Self {
        Self {
            upper_bound: AtomicUsize::new(usize::MAX),
            slot: Mutex::new(SharedSlot {
                best: None,
                history: Vec::new(),
            }),
        }
    }

    pub(crate) fn upper_bound(&self) -> Option<usize> {
        match self.upper_bound.load(Ordering::Relaxed) {
            usize::MAX => None,
            value => Some(value),
        }
    }

    /// Installs the candidate if it is strictly better than what is stored
    /// at the time the lock is taken.
    pub(crate) fn try_install(&self, objective: usize, values: &[VarState]) -> bool {
        if self.upper_bound().is_some_and(|best| objective >= best) {
            return false;
        }

        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        // another worker may have installed a better one since the atomic read
        if slot.best.as_ref().is_some_and(|b| objective >= b.objective) {
            return false;
        }
        slot.best = Some(Incumbent {
            objective,
            values: values.to_vec(),
        });
        slot.history.push(objective);
        self.upper_bound.store(objective, Ordering::Relaxed);
        true
    }

    /// Consumes the store, returning the best solution and the objective of
    /// every installed incumbent in order.
    pub(crate) fn into_parts(self) -> (Option<Incumbent>, Vec<usize>) {
        let slot = self.slot.into_inner().unwrap_or_else(PoisonError::into_inner);
        (slot.best, slot.history)
    }
}

impl IncumbentStore for &SharedIncumbent {
    #[inline]
    fn upper_bound(&self) -> Option<usize> {
        SharedIncumbent::upper_bound(self)
    }

    fn try_install(&mut self, objective: usize, values: &[VarState]) -> bool {
        SharedIncumbent::try_install(self, objective, values)
    }
}

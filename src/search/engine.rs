//! Branch-and-bound over slot variables as an explicit state machine.

use std::time::{Duration, Instant};

use log::debug;

use super::branching::{lower_bound, Brancher};
use super::incumbent::IncumbentStore;
use super::stats::SearchStats;
use crate::model::SlotVar;
use crate::propagator::Propagator;

/// Phases of the search loop.
///
/// Every call to the engine's step function consumes one phase and yields
/// the next; the loop ends at [`SearchPhase::Done`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// Consistency check and propagation of the unassigned model.
    Root,
    /// Pick the next variable and open a decision level for it.
    Branching,
    /// Apply a decision and propagate it.
    Propagating { var: SlotVar, value: bool },
    /// Undo the innermost decision and try its alternative, or pop it.
    Backtracking,
    /// Every participant has its matches; offer the assignment as incumbent.
    SolutionFound,
    /// The current subtree holds no improving solution.
    InfeasibleSubtree,
    /// The wall-clock budget ran out.
    TimeExpired,
    /// The search is over.
    Done,
}

/// Wall-clock budget, checked cooperatively.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    pub(crate) fn new(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }

    #[inline]
    pub(crate) fn expired(&self) -> bool {
        self.start.elapsed() >= self.budget
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Outcome of one engine run.
#[derive(Debug, Clone, Default)]
pub(crate) struct SearchRun {
    pub(crate) stats: SearchStats,
    pub(crate) timed_out: bool,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    var: SlotVar,
    tried_false: bool,
}

/// Depth-first branch-and-bound below the state held by a propagator.
///
/// Whatever the propagator already holds when the engine is built is treated
/// as the root of the search and never undone.
pub(crate) struct SearchEngine<'a, I: IncumbentStore> {
    prop: Propagator<'a>,
    brancher: &'a Brancher,
    incumbent: I,
    deadline: Deadline,
    stack: Vec<Frame>,
    stats: SearchStats,
    timed_out: bool,
}

impl<'a, I: IncumbentStore> SearchEngine<'a, I> {
    pub(crate) fn new(
        prop: Propagator<'a>,
        brancher: &'a Brancher,
        incumbent: I,
        deadline: Deadline,
    ) -> Self {
        Self {
            prop,
            brancher,
            incumbent,
            deadline,
            stack: Vec::new(),
            stats: SearchStats::default(),
            timed_out: false,
        }
    }

    /// Runs until the tree is exhausted or the deadline passes.
    pub(crate) fn run(mut self) -> (SearchRun, I) {
        let mut phase = SearchPhase::Root;
        while phase != SearchPhase::Done {
            phase = self.step(phase);
        }
        let run = SearchRun {
            stats: self.stats,
            timed_out: self.timed_out,
        };
        (run, self.incumbent)
    }

    fn step(&mut self, phase: SearchPhase) -> SearchPhase {
        match phase {
            SearchPhase::Root => match self.prop.check_root() {
                Ok(()) => self.after_propagation(),
                Err(_) => {
                    self.stats.on_pruning_infeasible();
                    SearchPhase::InfeasibleSubtree
                }
            },
            SearchPhase::Branching => self.branch(),
            SearchPhase::Propagating { var, value } => match self.prop.assign(var, value) {
                Ok(()) => self.after_propagation(),
                Err(_) => {
                    self.stats.on_pruning_infeasible();
                    SearchPhase::InfeasibleSubtree
                }
            },
            SearchPhase::SolutionFound => {
                self.stats.on_solution_found();
                debug_assert_eq!(self.prop.undetermined_count(), 0);
                let objective = self.prop.total_used();
                if self.incumbent.try_install(objective, self.prop.values()) {
                    self.stats.on_incumbent(objective);
                    debug!(
                        "new incumbent: objective {} after {} nodes",
                        objective, self.stats.nodes_explored
                    );
                }
                SearchPhase::Backtracking
            }
            SearchPhase::InfeasibleSubtree => {
                self.stats.on_backtrack();
                SearchPhase::Backtracking
            }
            SearchPhase::Backtracking => self.backtrack(),
            SearchPhase::TimeExpired => {
                self.timed_out = true;
                SearchPhase::Done
            }
            SearchPhase::Done => SearchPhase::Done,
        }
    }

    fn branch(&mut self) -> SearchPhase {
        if self.deadline.expired() {
            return SearchPhase::TimeExpired;
        }
        self.stats.on_node_explored();
        let Some(var) = self.brancher.select(&self.prop) else {
            return SearchPhase::SolutionFound;
        };
        self.prop.push_frame();
        self.stack.push(Frame {
            var,
            tried_false: false,
        });
        self.stats.on_depth_update(self.prop.depth());
        SearchPhase::Propagating { var, value: true }
    }

    fn backtrack(&mut self) -> SearchPhase {
        match self.stack.last_mut() {
            None => SearchPhase::Done,
            Some(frame) if !frame.tried_false => {
                frame.tried_false = true;
                let var = frame.var;
                self.prop.backtrack_frame();
                SearchPhase::Propagating { var, value: false }
            }
            Some(_) => {
                self.prop.pop_frame();
                self.stack.pop();
                SearchPhase::Backtracking
            }
        }
    }

    /// Bounds the subtree against the incumbent and decides where to go next.
    fn after_propagation(&mut self) -> SearchPhase {
        if let Some(best) = self.incumbent.upper_bound() {
            if !self.tighten(best) {
                self.stats.on_pruning_bound();
                return SearchPhase::InfeasibleSubtree;
            }
        }
        if self.prop.is_complete() {
            SearchPhase::SolutionFound
        } else {
            SearchPhase::Branching
        }
    }

    /// Returns `false` when no completion can beat `best`.
    ///
    /// When the bound is one below `best`, every participant not counted in
    /// it must finish on resources it already uses.
    fn tighten(&mut self, best: usize) -> bool {
        if lower_bound(&self.prop) >= best {
            return false;
        }
        for participant in 0..self.prop.space().participant_count() {
            let bound = lower_bound(&self.prop);
            if bound >= best {
                return false;
            }
            if bound + 1 < best {
                break;
            }
            if self.prop.remaining(participant) == 0 || self.prop.needs_new_resource(participant) {
                continue;
            }
            if self.prop.forbid_unused_resources(participant).is_err() {
                return false;
            }
        }
        lower_bound(&self.prop) < best
    }
}

//! Forward-checking propagation over slot variables.
//!
//! The [`Propagator`] holds the current partial assignment and the counters
//! needed to detect dead ends after each decision:
//!
//! - per participant: true slots and still-open slots
//! - per (participant, resource): true and open slots, and the usage
//!   indicator derived from them
//! - total resource usage (the objective)
//! - per (timeslot, resource) cell and per (participant, timeslot) seat:
//!   true and open slots, and per timeslot the number of free cells and
//!   free seats
//!
//! Every change goes through the [`Trail`](trail::Trail) so the search engine
//! can revert a decision level in time proportional to what it touched.
//!
//! Propagation runs the work queue to a fixpoint, then applies the packing
//! rules:
//!
//! - the free cells must hold every match still to place (the surplus is
//!   the *slack*);
//! - a timeslot with more free cells than free seats wastes the difference,
//!   and the waste may not exceed the slack;
//! - every participant must still fit its remaining matches into its free
//!   seats with the configured gap between them;
//! - at zero slack a free cell with a single candidate forces that slot.
//!
//! It does not aim for arc consistency beyond that.

mod trail;

use crate::constraints::ConstraintSet;
use crate::model::{DomainModel, SlotSpace, SlotTriple, SlotVar, VarState};
use trail::{Trail, TrailEntry};

/// An assignment left some constraint unsatisfiable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Contradiction;

pub(crate) type Propagation = Result<(), Contradiction>;

#[derive(Debug, Clone)]
pub(crate) struct Propagator<'a> {
    space: SlotSpace,
    constraints: &'a ConstraintSet,
    matches: usize,
    gap: usize,
    demand: usize,
    values: Vec<VarState>,
    usage: Vec<VarState>,
    true_count: Vec<usize>,
    open_count: Vec<usize>,
    true_on: Vec<usize>,
    open_on: Vec<usize>,
    used_count: Vec<usize>,
    total_used: usize,
    /// A cell is free while it has no true slot and at least one open one.
    cell_true: Vec<usize>,
    cell_open: Vec<usize>,
    /// A seat is free while the participant has no match at that timeslot
    /// and at least one open slot there.
    seat_true: Vec<usize>,
    seat_open: Vec<usize>,
    free_cells_at: Vec<usize>,
    free_seats_at: Vec<usize>,
    free_cells: usize,
    placed: usize,
    /// Sum over timeslots of free cells that no free seat can take.
    excess: usize,
    trail: Trail,
    queue: Vec<(SlotVar, bool)>,
}

impl<'a> Propagator<'a> {
    /// Creates a propagator with every variable open.
    pub(crate) fn new(model: &DomainModel, constraints: &'a ConstraintSet) -> Self {
        let space = *model.space();
        let n = space.participant_count();
        let (t_count, r_count) = (space.timeslot_count(), space.resource_count());
        let cells = t_count * r_count;
        let matches = model.matches_per_participant();
        Self {
            space,
            constraints,
            matches,
            gap: model.min_gap(),
            demand: n * matches,
            values: vec![VarState::Open; space.len()],
            usage: vec![VarState::Open; space.usage_len()],
            true_count: vec![0; n],
            open_count: vec![cells; n],
            true_on: vec![0; space.usage_len()],
            open_on: vec![space.timeslot_count(); space.usage_len()],
            used_count: vec![0; n],
            total_used: 0,
            cell_true: vec![0; cells],
            cell_open: vec![n; cells],
            seat_true: vec![0; n * t_count],
            seat_open: vec![r_count; n * t_count],
            free_cells_at: vec![r_count; t_count],
            free_seats_at: vec![n; t_count],
            free_cells: cells,
            placed: 0,
            excess: t_count * r_count.saturating_sub(n),
            trail: Trail::with_capacity(space.len()),
            queue: Vec::new(),
        }
    }

    /// Checks the state before any decision and applies what it already
    /// forces.
    pub(crate) fn check_root(&mut self) -> Propagation {
        let feasible = (0..self.space.participant_count())
            .all(|p| self.true_count[p] + self.open_count[p] >= self.matches);
        if !feasible {
            return Err(Contradiction);
        }
        self.queue.clear();
        self.drain()
    }

    /// Assigns `var` and propagates the consequences.
    ///
    /// On `Err` the state is partially updated; the caller must backtrack
    /// the current frame.
    pub(crate) fn assign(&mut self, var: SlotVar, value: bool) -> Propagation {
        self.queue.clear();
        self.queue.push((var, value));
        self.drain()
    }

    /// Fixes every open usage indicator of `participant` to false, which
    /// forbids all its slots on resources it does not use yet.
    pub(crate) fn forbid_unused_resources(&mut self, participant: usize) -> Propagation {
        self.queue.clear();
        for r in 0..self.space.resource_count() {
            let u = self.space.usage_index(participant, r);
            if self.usage[u].is_open() && self.true_on[u] == 0 {
                self.set_usage(u, VarState::False);
                for v in self.space.participant_resource_vars(participant, r) {
                    if self.values[v.index()].is_open() {
                        self.queue.push((v, false));
                    }
                }
            }
        }
        self.drain()
    }

    fn drain(&mut self) -> Propagation {
        loop {
            while let Some((var, value)) = self.queue.pop() {
                match (self.values[var.index()], value) {
                    (VarState::Open, true) => self.set_true(var)?,
                    (VarState::Open, false) => self.set_false(var)?,
                    (VarState::True, true) | (VarState::False, false) => {}
                    _ => return Err(Contradiction),
                }
            }
            self.check_packing()?;
            if !self.force_lone_cells() {
                return Ok(());
            }
        }
    }

    fn check_packing(&self) -> Propagation {
        match self.slack() {
            Some(slack) if self.excess <= slack => {}
            _ => return Err(Contradiction),
        }
        let spaced = (0..self.space.participant_count())
            .all(|p| self.true_count[p] + self.spaced_reach(p) >= self.matches);
        if spaced {
            Ok(())
        } else {
            Err(Contradiction)
        }
    }

    /// Queues the only open slot of every free cell that has one, provided
    /// no cell is spare. Returns whether anything was queued.
    fn force_lone_cells(&mut self) -> bool {
        if self.slack() != Some(0) {
            return false;
        }
        let space = self.space;
        let r_count = space.resource_count();
        for cell in 0..self.cell_true.len() {
            if self.cell_true[cell] > 0 || self.cell_open[cell] != 1 {
                continue;
            }
            let values = &self.values;
            let lone = space
                .timeslot_resource_vars(cell / r_count, cell % r_count)
                .find(|&v| values[v.index()].is_open());
            if let Some(var) = lone {
                self.queue.push((var, true));
            }
        }
        !self.queue.is_empty()
    }

    fn set_true(&mut self, var: SlotVar) -> Propagation {
        let slot = self.space.triple(var);
        let (p, u) = (
            slot.participant,
            self.space.usage_index(slot.participant, slot.resource),
        );

        if self.usage[u] == VarState::False {
            return Err(Contradiction);
        }

        self.values[var.index()] = VarState::True;
        self.trail.push(TrailEntry::Slot(var));
        self.recount(slot, VarState::Open, VarState::True);
        self.open_count[p] -= 1;
        self.true_count[p] += 1;
        self.open_on[u] -= 1;
        self.true_on[u] += 1;
        if self.true_on[u] == 1 {
            self.used_count[p] += 1;
            self.total_used += 1;
            self.set_usage(u, VarState::True);
        }

        if self.true_count[p] > self.matches {
            return Err(Contradiction);
        }

        for &other in self.constraints.conflicts(var) {
            match self.values[other.index()] {
                VarState::True => return Err(Contradiction),
                VarState::Open => self.queue.push((other, false)),
                VarState::False => {}
            }
        }

        if self.true_count[p] == self.matches {
            for v in self.space.participant_vars(p) {
                if self.values[v.index()].is_open() {
                    self.queue.push((v, false));
                }
            }
        }
        Ok(())
    }

    fn set_false(&mut self, var: SlotVar) -> Propagation {
        let slot = self.space.triple(var);
        let (p, u) = (
            slot.participant,
            self.space.usage_index(slot.participant, slot.resource),
        );

        self.values[var.index()] = VarState::False;
        self.trail.push(TrailEntry::Slot(var));
        self.recount(slot, VarState::Open, VarState::False);
        self.open_count[p] -= 1;
        self.open_on[u] -= 1;

        if self.open_on[u] == 0 && self.true_on[u] == 0 && self.usage[u].is_open() {
            self.set_usage(u, VarState::False);
        }

        let reachable = self.true_count[p] + self.open_count[p];
        if reachable < self.matches {
            return Err(Contradiction);
        }
        if reachable == self.matches && self.open_count[p] > 0 {
            for v in self.space.participant_vars(p) {
                if self.values[v.index()].is_open() {
                    self.queue.push((v, true));
                }
            }
        }
        Ok(())
    }

    /// Moves one slot of `slot`'s cell and seat from `from` to `to` and
    /// keeps the free-cell, free-seat and excess tallies in step.
    fn recount(&mut self, slot: SlotTriple, from: VarState, to: VarState) {
        let t = slot.timeslot;
        let cell = t * self.space.resource_count() + slot.resource;
        let seat = slot.participant * self.space.timeslot_count() + t;
        let (cell_was_free, seat_was_free) = (self.cell_free(cell), self.seat_free(seat));

        self.excess -= self.excess_at(t);
        shift(&mut self.cell_open, &mut self.cell_true, cell, from, to);
        shift(&mut self.seat_open, &mut self.seat_true, seat, from, to);
        match (from.is_true(), to.is_true()) {
            (false, true) => self.placed += 1,
            (true, false) => self.placed -= 1,
            _ => {}
        }

        match (cell_was_free, self.cell_free(cell)) {
            (true, false) => {
                self.free_cells_at[t] -= 1;
                self.free_cells -= 1;
            }
            (false, true) => {
                self.free_cells_at[t] += 1;
                self.free_cells += 1;
            }
            _ => {}
        }
        match (seat_was_free, self.seat_free(seat)) {
            (true, false) => self.free_seats_at[t] -= 1,
            (false, true) => self.free_seats_at[t] += 1,
            _ => {}
        }
        self.excess += self.excess_at(t);
    }

    #[inline]
    fn cell_free(&self, cell: usize) -> bool {
        self.cell_true[cell] == 0 && self.cell_open[cell] > 0
    }

    #[inline]
    fn seat_free(&self, seat: usize) -> bool {
        self.seat_true[seat] == 0 && self.seat_open[seat] > 0
    }

    #[inline]
    fn excess_at(&self, timeslot: usize) -> usize {
        self.free_cells_at[timeslot].saturating_sub(self.free_seats_at[timeslot])
    }

    fn set_usage(&mut self, u: usize, state: VarState) {
        self.usage[u] = state;
        self.trail.push(TrailEntry::Usage(u));
    }

    fn undo(&mut self, entry: TrailEntry) {
        match entry {
            TrailEntry::Slot(var) => {
                let slot = self.space.triple(var);
                let (p, u) = (
                    slot.participant,
                    self.space.usage_index(slot.participant, slot.resource),
                );
                let from = self.values[var.index()];
                debug_assert!(!from.is_open());
                self.recount(slot, from, VarState::Open);
                if from.is_true() {
                    self.true_count[p] -= 1;
                    self.true_on[u] -= 1;
                    if self.true_on[u] == 0 {
                        self.used_count[p] -= 1;
                        self.total_used -= 1;
                    }
                }
                self.open_count[p] += 1;
                self.open_on[u] += 1;
                self.values[var.index()] = VarState::Open;
            }
            TrailEntry::Usage(u) => self.usage[u] = VarState::Open,
        }
    }

    /// Opens a new decision level.
    pub(crate) fn push_frame(&mut self) {
        self.trail.push_frame();
    }

    /// Reverts everything done in the innermost level, keeping it open.
    pub(crate) fn backtrack_frame(&mut self) {
        let mark = self.trail.frame_start();
        while let Some(entry) = self.trail.pop_above(mark) {
            self.undo(entry);
        }
    }

    /// Reverts and closes the innermost level.
    pub(crate) fn pop_frame(&mut self) {
        self.backtrack_frame();
        self.trail.pop_frame();
    }

    pub(crate) fn depth(&self) -> usize {
        self.trail.depth()
    }

    pub(crate) fn space(&self) -> &SlotSpace {
        &self.space
    }

    #[inline]
    pub(crate) fn value(&self, var: SlotVar) -> VarState {
        self.values[var.index()]
    }

    pub(crate) fn values(&self) -> &[VarState] {
        &self.values
    }

    #[cfg(test)]
    pub(crate) fn usage(&self, participant: usize, resource: usize) -> VarState {
        self.usage[self.space.usage_index(participant, resource)]
    }

    /// Open slots of a participant.
    #[inline]
    pub(crate) fn open_count(&self, participant: usize) -> usize {
        self.open_count[participant]
    }

    #[cfg(test)]
    pub(crate) fn true_count(&self, participant: usize) -> usize {
        self.true_count[participant]
    }

    /// Matches the participant still has to be given.
    #[inline]
    pub(crate) fn remaining(&self, participant: usize) -> usize {
        self.matches.saturating_sub(self.true_count[participant])
    }

    #[inline]
    pub(crate) fn is_used(&self, participant: usize, resource: usize) -> bool {
        self.true_on[self.space.usage_index(participant, resource)] > 0
    }

    #[cfg(test)]
    pub(crate) fn used_count(&self, participant: usize) -> usize {
        self.used_count[participant]
    }

    /// Sum of all usage indicators that are already true.
    pub(crate) fn total_used(&self) -> usize {
        self.total_used
    }

    /// Open slots of `participant` on resources it already uses.
    pub(crate) fn open_on_used(&self, participant: usize) -> usize {
        (0..self.space.resource_count())
            .map(|r| self.space.usage_index(participant, r))
            .filter(|&u| self.true_on[u] > 0)
            .map(|u| self.open_on[u])
            .sum()
    }

    /// Whether the participant cannot finish without opening a new resource.
    pub(crate) fn needs_new_resource(&self, participant: usize) -> bool {
        let need = self.remaining(participant);
        need > 0 && self.open_on_used(participant) < need
    }

    /// Free cells beyond the matches still to place, or `None` when the free
    /// cells cannot hold them.
    pub(crate) fn slack(&self) -> Option<usize> {
        self.free_cells
            .checked_sub(self.demand.saturating_sub(self.placed))
    }

    /// The first free cell in (timeslot, resource) order.
    pub(crate) fn first_free_cell(&self) -> Option<(usize, usize)> {
        let r_count = self.space.resource_count();
        (0..self.cell_true.len())
            .find(|&cell| self.cell_free(cell))
            .map(|cell| (cell / r_count, cell % r_count))
    }

    /// Most matches `participant` can still add in its free seats with the
    /// gap between them.
    pub(crate) fn spaced_reach(&self, participant: usize) -> usize {
        let t_count = self.space.timeslot_count();
        let mut reach = 0;
        let mut next = 0;
        for t in 0..t_count {
            if t >= next && self.seat_free(participant * t_count + t) {
                reach += 1;
                next = t.saturating_add(self.gap).saturating_add(1);
            }
        }
        reach
    }

    /// Spaced seats `participant` can still afford to lose.
    pub(crate) fn spare_seats(&self, participant: usize) -> usize {
        (self.true_count[participant] + self.spaced_reach(participant))
            .saturating_sub(self.matches)
    }

    /// Whether every participant has exactly its match count.
    pub(crate) fn is_complete(&self) -> bool {
        self.true_count.iter().all(|&c| c == self.matches)
    }

    pub(crate) fn undetermined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_open()).count()
    }
}

fn shift(open: &mut [usize], taken: &mut [usize], i: usize, from: VarState, to: VarState) {
    match from {
        VarState::Open => open[i] -= 1,
        VarState::True => taken[i] -= 1,
        VarState::False => {}
    }
    match to {
        VarState::Open => open[i] += 1,
        VarState::True => taken[i] += 1,
        VarState::False => {}
    }
}

//! Variable selection and the objective lower bound.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::model::SlotVar;
use crate::propagator::Propagator;

/// Most-constrained-participant branching, with a cell-first mode once no
/// cell is spare.
///
/// The participant is the incomplete one with the fewest open slots (lowest
/// id on ties). Among its open slots the brancher prefers a resource the
/// participant already plays on, then the earliest timeslot, then the
/// resource preference order.
///
/// When every free cell must be filled, the brancher instead fills the
/// earliest free cell, offering it first to the candidate with the fewest
/// spare spaced seats.
#[derive(Debug, Clone)]
pub(crate) struct Brancher {
    resource_rank: Vec<usize>,
}

impl Brancher {
    /// `seed = None` ranks resources by id.
    pub(crate) fn new(resource_count: usize, seed: Option<u64>) -> Self {
        let mut order: Vec<usize> = (0..resource_count).collect();
        if let Some(seed) = seed {
            let mut rng = StdRng::seed_from_u64(seed);
            order.shuffle(&mut rng);
        }
        let mut resource_rank = vec![0; resource_count];
        for (rank, &resource) in order.iter().enumerate() {
            resource_rank[resource] = rank;
        }
        Self { resource_rank }
    }

    /// The incomplete participant with the fewest open slots.
    pub(crate) fn select_participant(&self, prop: &Propagator<'_>) -> Option<usize> {
        (0..prop.space().participant_count())
            .filter(|&p| prop.remaining(p) > 0)
            .min_by_key(|&p| (prop.open_count(p), p))
    }

    /// Open slots of `participant`, best candidate first.
    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    pub(crate) fn ordered_candidates(&self, prop: &Propagator<'_>, participant: usize) -> Vec<SlotVar> {
        let space = *prop.space();
        let mut candidates: Vec<SlotVar> = space
            .participant_vars(participant)
            .filter(|&v| prop.value(v).is_open())
            .collect();
        candidates.sort_by_key(|&v| self.preference(prop, v));
        candidates
    }

    /// Next variable to branch on, or `None` once every participant is
    /// complete.
    pub(crate) fn select(&self, prop: &Propagator<'_>) -> Option<SlotVar> {
        let participant = self.select_participant(prop)?;
        if prop.slack() == Some(0) {
            if let Some(var) = self.select_for_first_free_cell(prop) {
                return Some(var);
            }
        }
        prop.space()
            .participant_vars(participant)
            .filter(|&v| prop.value(v).is_open())
            .min_by_key(|&v| self.preference(prop, v))
    }

    fn select_for_first_free_cell(&self, prop: &Propagator<'_>) -> Option<SlotVar> {
        let (timeslot, resource) = prop.first_free_cell()?;
        let space = *prop.space();
        space
            .timeslot_resource_vars(timeslot, resource)
            .filter(|&v| prop.value(v).is_open())
            .min_by_key(|&v| {
                let p = space.triple(v).participant;
                (prop.spare_seats(p), !prop.is_used(p, resource), p)
            })
    }

    fn preference(&self, prop: &Propagator<'_>, var: SlotVar) -> (bool, usize, usize) {
        let slot = prop.space().triple(var);
        (
            !prop.is_used(slot.participant, slot.resource),
            slot.timeslot,
            self.resource_rank[slot.resource],
        )
    }
}

/// Admissible lower bound on the objective of any completion.
///
/// Current usage plus one for every incomplete participant whose open slots
/// on already-used resources cannot cover its remaining matches. A
/// participant with no resource yet always counts.
pub(crate) fn lower_bound(prop: &Propagator<'_>) -> usize {
    let needy = (0..prop.space().participant_count())
        .filter(|&p| prop.needs_new_resource(p))
        .count();
    prop.total_used() + needy
}

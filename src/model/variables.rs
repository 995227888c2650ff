//! Slot variables and their dense index space.

/// A boolean decision: participant plays at a timeslot on a resource.
///
/// The wrapped value is the variable's offset inside its [`SlotSpace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotVar(usize);

impl SlotVar {
    /// Offset of this variable in the flat value array.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// The (participant, timeslot, resource) triple a slot variable stands for.
///
/// Ordering is participant first, then timeslot, then resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotTriple {
    pub participant: usize,
    pub timeslot: usize,
    pub resource: usize,
}

impl SlotTriple {
    /// Bundles a (participant, timeslot, resource) triple.
    pub fn new(participant: usize, timeslot: usize, resource: usize) -> Self {
        Self {
            participant,
            timeslot,
            resource,
        }
    }
}

/// Current value of a slot variable or usage indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VarState {
    /// Not decided yet.
    #[default]
    Open,
    True,
    False,
}

impl VarState {
    #[inline]
    pub fn from_bool(value: bool) -> Self {
        if value {
            VarState::True
        } else {
            VarState::False
        }
    }

    #[inline]
    pub fn is_open(self) -> bool {
        self == VarState::Open
    }

    #[inline]
    pub fn is_true(self) -> bool {
        self == VarState::True
    }
}

/// Flat index space of all slot variables.
///
/// A variable's offset is `(participant * T + timeslot) * R + resource`, so
/// all variables of one participant are contiguous, and within them all
/// variables of one timeslot.
///
/// # Examples
///
/// ```
/// use u_tournament::model::{SlotSpace, SlotTriple};
///
/// let space = SlotSpace::new(3, 4, 2);
/// assert_eq!(space.len(), 24);
/// let v = space.var(1, 2, 1);
/// assert_eq!(space.triple(v), SlotTriple::new(1, 2, 1));
/// assert_eq!(space.timeslot_resource_vars(2, 1).count(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSpace {
    participants: usize,
    timeslots: usize,
    resources: usize,
}

impl SlotSpace {
    /// Creates the space for `participants × timeslots × resources` variables.
    pub fn new(participants: usize, timeslots: usize, resources: usize) -> Self {
        Self {
            participants,
            timeslots,
            resources,
        }
    }

    /// Number of participants (N).
    pub fn participant_count(&self) -> usize {
        self.participants
    }

    /// Number of timeslots (T).
    pub fn timeslot_count(&self) -> usize {
        self.timeslots
    }

    /// Number of resources (R).
    pub fn resource_count(&self) -> usize {
        self.resources
    }

    /// Total number of slot variables.
    ///
    /// The product must fit in `usize`; [`TournamentConfig::validate`]
    /// rejects dimensions where it does not.
    ///
    /// [`TournamentConfig::validate`]: crate::TournamentConfig::validate
    pub fn len(&self) -> usize {
        self.participants * self.timeslots * self.resources
    }

    /// Whether the space holds no variable.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The variable for a triple. O(1).
    #[inline]
    pub fn var(&self, participant: usize, timeslot: usize, resource: usize) -> SlotVar {
        debug_assert!(participant < self.participants);
        debug_assert!(timeslot < self.timeslots);
        debug_assert!(resource < self.resources);
        SlotVar((participant * self.timeslots + timeslot) * self.resources + resource)
    }

    /// Inverse of [`var`](Self::var).
    #[inline]
    pub fn triple(&self, var: SlotVar) -> SlotTriple {
        let resource = var.0 % self.resources;
        let rest = var.0 / self.resources;
        SlotTriple {
            participant: rest / self.timeslots,
            timeslot: rest % self.timeslots,
            resource,
        }
    }

    /// Index of the (participant, resource) pair, used for usage indicators.
    #[inline]
    pub fn usage_index(&self, participant: usize, resource: usize) -> usize {
        participant * self.resources + resource
    }

    /// Number of (participant, resource) pairs.
    pub fn usage_len(&self) -> usize {
        self.participants * self.resources
    }

    /// All variables in index order.
    pub fn vars(&self) -> impl Iterator<Item = SlotVar> {
        (0..self.len()).map(SlotVar)
    }

    /// All variables of one participant.
    pub fn participant_vars(&self, participant: usize) -> impl Iterator<Item = SlotVar> {
        let width = self.timeslots * self.resources;
        let start = participant * width;
        (start..start + width).map(SlotVar)
    }

    /// All variables of one participant at one timeslot.
    pub fn participant_timeslot_vars(
        &self,
        participant: usize,
        timeslot: usize,
    ) -> impl Iterator<Item = SlotVar> {
        let start = self.var(participant, timeslot, 0).0;
        (start..start + self.resources).map(SlotVar)
    }

    /// All variables of one participant on one resource, by timeslot.
    pub fn participant_resource_vars(
        &self,
        participant: usize,
        resource: usize,
    ) -> impl Iterator<Item = SlotVar> {
        let space = *self;
        (0..space.timeslots).map(move |t| space.var(participant, t, resource))
    }

    /// All variables occupying one (timeslot, resource) cell, by participant.
    pub fn timeslot_resource_vars(
        &self,
        timeslot: usize,
        resource: usize,
    ) -> impl Iterator<Item = SlotVar> {
        let space = *self;
        (0..space.participants).map(move |p| space.var(p, timeslot, resource))
    }

    /// All variables at one timeslot.
    pub fn timeslot_vars(&self, timeslot: usize) -> impl Iterator<Item = SlotVar> {
        let space = *self;
        (0..space.participants).flat_map(move |p| space.participant_timeslot_vars(p, timeslot))
    }

    /// All variables on one resource.
    pub fn resource_vars(&self, resource: usize) -> impl Iterator<Item = SlotVar> {
        let space = *self;
        (0..space.participants).flat_map(move |p| space.participant_resource_vars(p, resource))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_triple_inverse() {
        let space = SlotSpace::new(3, 5, 4);
        for var in space.vars() {
            let t = space.triple(var);
            assert_eq!(space.var(t.participant, t.timeslot, t.resource), var);
        }
    }

    #[test]
    fn test_offsets_dense() {
        let space = SlotSpace::new(2, 3, 2);
        let indices: Vec<usize> = space.vars().map(SlotVar::index).collect();
        assert_eq!(indices, (0..12).collect::<Vec<_>>());
        assert_eq!(space.var(1, 0, 0).index(), 6);
    }

    #[test]
    fn test_enumerations() {
        let space = SlotSpace::new(3, 4, 2);
        assert_eq!(space.participant_vars(1).count(), 8);
        assert!(space
            .participant_vars(1)
            .all(|v| space.triple(v).participant == 1));

        let cell: Vec<SlotTriple> = space
            .timeslot_resource_vars(2, 1)
            .map(|v| space.triple(v))
            .collect();
        assert_eq!(
            cell,
            vec![
                SlotTriple::new(0, 2, 1),
                SlotTriple::new(1, 2, 1),
                SlotTriple::new(2, 2, 1)
            ]
        );

        assert_eq!(space.participant_timeslot_vars(0, 3).count(), 2);
        assert!(space
            .participant_resource_vars(2, 0)
            .all(|v| space.triple(v).resource == 0 && space.triple(v).participant == 2));
        assert_eq!(space.timeslot_vars(1).count(), 6);
        assert_eq!(space.resource_vars(1).count(), 12);
    }

    #[test]
    fn test_var_state() {
        assert_eq!(VarState::default(), VarState::Open);
        assert!(VarState::from_bool(true).is_true());
        assert!(!VarState::from_bool(false).is_open());
    }
}

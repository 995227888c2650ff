//! Solution extraction: timeslot- and participant-indexed views of a
//! complete assignment.

use std::collections::BTreeSet;

use crate::error::IllegalStateError;
use crate::model::{SlotSpace, SlotTriple, VarState};

/// The true slot variables of a complete assignment, sorted by
/// (participant, timeslot, resource).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Assignment {
    triples: Vec<SlotTriple>,
}

impl Assignment {
    /// Builds an assignment from arbitrary triples; duplicates are dropped.
    pub fn from_triples(mut triples: Vec<SlotTriple>) -> Self {
        triples.sort_unstable();
        triples.dedup();
        Self { triples }
    }

    /// The true slots, sorted by participant, timeslot, resource.
    pub fn triples(&self) -> &[SlotTriple] {
        &self.triples
    }

    /// Iterates over the true slots.
    pub fn iter(&self) -> impl Iterator<Item = &SlotTriple> {
        self.triples.iter()
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Whether `triple` is part of the assignment.
    pub fn contains(&self, triple: &SlotTriple) -> bool {
        self.triples.binary_search(triple).is_ok()
    }
}

/// A participant playing on a resource, as seen from one timeslot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Occupant {
    pub resource: usize,
    pub participant: usize,
}

/// A match of one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Match {
    pub timeslot: usize,
    pub resource: usize,
}

/// Occupants of every timeslot, sorted by resource.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeslotView {
    slots: Vec<Vec<Occupant>>,
}

impl TimeslotView {
    /// Number of timeslots in the view.
    pub fn timeslot_count(&self) -> usize {
        self.slots.len()
    }

    /// Occupants at `timeslot`; empty for an out-of-range timeslot.
    pub fn occupants(&self, timeslot: usize) -> &[Occupant] {
        self.slots.get(timeslot).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The participant on `resource` at `timeslot`, if any.
    pub fn participant_at(&self, timeslot: usize, resource: usize) -> Option<usize> {
        self.occupants(timeslot)
            .iter()
            .find(|o| o.resource == resource)
            .map(|o| o.participant)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[Occupant])> {
        self.slots.iter().enumerate().map(|(t, o)| (t, o.as_slice()))
    }
}

/// Matches of one participant in timeslot order, plus the distinct resources
/// it plays on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticipantSchedule {
    pub matches: Vec<Match>,
    pub resources: BTreeSet<usize>,
}

impl ParticipantSchedule {
    /// Number of distinct resources this participant plays on.
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }
}

/// Schedules of every participant, indexed by participant id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticipantView {
    participants: Vec<ParticipantSchedule>,
}

impl ParticipantView {
    /// The schedule of one participant.
    pub fn get(&self, participant: usize) -> Option<&ParticipantSchedule> {
        self.participants.get(participant)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &ParticipantSchedule)> {
        self.participants.iter().enumerate()
    }

    /// Sum of distinct resources over all participants.
    pub fn total_resource_usage(&self) -> usize {
        self.participants.iter().map(|s| s.resource_count()).sum()
    }
}

/// A complete schedule in all three shapes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Schedule {
    pub assignment: Assignment,
    pub timeslot_view: TimeslotView,
    pub participant_view: ParticipantView,
}

impl Schedule {
    /// Converts a terminal valuation of `space` into a schedule.
    ///
    /// Fails if `values` does not cover the space or still contains an open
    /// variable.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_tournament::extract::Schedule;
    /// use u_tournament::model::{SlotSpace, VarState};
    ///
    /// let space = SlotSpace::new(2, 2, 1);
    /// let mut values = vec![VarState::False; space.len()];
    /// values[space.var(0, 0, 0).index()] = VarState::True;
    /// values[space.var(1, 1, 0).index()] = VarState::True;
    ///
    /// let schedule = Schedule::from_values(&space, &values).unwrap();
    /// assert_eq!(schedule.timeslot_view.participant_at(1, 0), Some(1));
    ///
    /// values[0] = VarState::Open;
    /// assert!(Schedule::from_values(&space, &values).is_err());
    /// ```
    pub fn from_values(space: &SlotSpace, values: &[VarState]) -> Result<Self, IllegalStateError> {
        if values.len() != space.len() {
            return Err(IllegalStateError::LengthMismatch {
                expected: space.len(),
                actual: values.len(),
            });
        }
        let open = values.iter().filter(|v| v.is_open()).count();
        if open > 0 {
            return Err(IllegalStateError::Undetermined { count: open });
        }

        let triples = space
            .vars()
            .filter(|v| values[v.index()].is_true())
            .map(|v| space.triple(v))
            .collect();
        let assignment = Assignment::from_triples(triples);

        let mut slots = vec![Vec::new(); space.timeslot_count()];
        let mut participants = vec![ParticipantSchedule::default(); space.participant_count()];
        for triple in assignment.iter() {
            slots[triple.timeslot].push(Occupant {
                resource: triple.resource,
                participant: triple.participant,
            });
            let schedule = &mut participants[triple.participant];
            schedule.matches.push(Match {
                timeslot: triple.timeslot,
                resource: triple.resource,
            });
            schedule.resources.insert(triple.resource);
        }
        for occupants in &mut slots {
            occupants.sort_unstable();
        }

        Ok(Self {
            assignment,
            timeslot_view: TimeslotView { slots },
            participant_view: ParticipantView { participants },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values_for(space: &SlotSpace, trues: &[(usize, usize, usize)]) -> Vec<VarState> {
        let mut values = vec![VarState::False; space.len()];
        for &(p, t, r) in trues {
            values[space.var(p, t, r).index()] = VarState::True;
        }
        values
    }

    #[test]
    fn test_views() {
        let space = SlotSpace::new(2, 4, 2);
        let values = values_for(&space, &[(0, 0, 1), (0, 2, 1), (1, 0, 0), (1, 3, 1)]);
        let schedule = Schedule::from_values(&space, &values).unwrap();

        assert_eq!(schedule.assignment.len(), 4);
        assert!(schedule.assignment.contains(&SlotTriple::new(1, 3, 1)));

        let ts = &schedule.timeslot_view;
        assert_eq!(ts.timeslot_count(), 4);
        assert_eq!(
            ts.occupants(0),
            &[
                Occupant {
                    resource: 0,
                    participant: 1
                },
                Occupant {
                    resource: 1,
                    participant: 0
                }
            ]
        );
        assert!(ts.occupants(1).is_empty());
        assert_eq!(ts.participant_at(3, 1), Some(1));
        assert_eq!(ts.participant_at(3, 0), None);

        let pv = &schedule.participant_view;
        let p0 = pv.get(0).unwrap();
        assert_eq!(
            p0.matches,
            vec![
                Match {
                    timeslot: 0,
                    resource: 1
                },
                Match {
                    timeslot: 2,
                    resource: 1
                }
            ]
        );
        assert_eq!(p0.resource_count(), 1);
        assert_eq!(pv.get(1).unwrap().resource_count(), 2);
        assert_eq!(pv.total_resource_usage(), 3);
    }

    #[test]
    fn test_rejects_open_values() {
        let space = SlotSpace::new(1, 2, 2);
        let mut values = values_for(&space, &[(0, 0, 0)]);
        values[3] = VarState::Open;
        assert_eq!(
            Schedule::from_values(&space, &values),
            Err(IllegalStateError::Undetermined { count: 1 })
        );
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let space = SlotSpace::new(1, 2, 2);
        assert_eq!(
            Schedule::from_values(&space, &[VarState::False; 3]),
            Err(IllegalStateError::LengthMismatch {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn test_assignment_sorted_and_deduped() {
        let a = Assignment::from_triples(vec![
            SlotTriple::new(1, 0, 0),
            SlotTriple::new(0, 2, 1),
            SlotTriple::new(1, 0, 0),
        ]);
        assert_eq!(
            a.triples(),
            &[SlotTriple::new(0, 2, 1), SlotTriple::new(1, 0, 0)]
        );
    }
}

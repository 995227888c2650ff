//! Hard constraints and the compiled conflict table.

use crate::model::{DomainModel, SlotSpace, SlotVar};

/// Which cell an [`Constraint::AtMostOne`] group covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionScope {
    /// One participant per (timeslot, resource).
    TimeslotResource { timeslot: usize, resource: usize },
    /// One resource per (participant, timeslot).
    ParticipantTimeslot { participant: usize, timeslot: usize },
}

/// A hard constraint over slot variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Exactly `target` of the participant's variables are true.
    ExactCount {
        participant: usize,
        vars: Vec<SlotVar>,
        target: usize,
    },

    /// At most one of `vars` is true; compiled into pairwise conflicts.
    AtMostOne {
        scope: ExclusionScope,
        vars: Vec<SlotVar>,
    },

    /// The participant plays in at most one of the two timeslots.
    ///
    /// Only forward pairs `first < second <= first + gap` are listed; the
    /// compiled conflicts are symmetric.
    Spacing {
        participant: usize,
        first: usize,
        second: usize,
    },

    /// The usage indicator of (participant, resource) is the OR of `vars`.
    UsageLink {
        participant: usize,
        resource: usize,
        vars: Vec<SlotVar>,
    },
}

/// Discriminant of [`Constraint`], for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    ExactCount,
    AtMostOne,
    Spacing,
    UsageLink,
}

impl Constraint {
    /// The family this constraint belongs to.
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Constraint::ExactCount { .. } => ConstraintKind::ExactCount,
            Constraint::AtMostOne { .. } => ConstraintKind::AtMostOne,
            Constraint::Spacing { .. } => ConstraintKind::Spacing,
            Constraint::UsageLink { .. } => ConstraintKind::UsageLink,
        }
    }
}

/// All hard constraints of a model plus the pairwise conflict table derived
/// from the exclusion and spacing constraints.
///
/// The conflict table is stored in compressed-row form: the conflicts of
/// variable `v` are `targets[offsets[v]..offsets[v + 1]]`.
#[derive(Debug, Clone)]
pub struct ConstraintSet {
    constraints: Vec<Constraint>,
    offsets: Vec<usize>,
    targets: Vec<SlotVar>,
}

impl ConstraintSet {
    /// Builds invariants (a)–(e) for `model`.
    pub fn build(model: &DomainModel) -> Self {
        let space = *model.space();
        let matches = model.matches_per_participant();
        let gap = model.min_gap();
        let (n, t_count, r_count) = (
            space.participant_count(),
            space.timeslot_count(),
            space.resource_count(),
        );

        let mut constraints = Vec::new();

        for p in 0..n {
            constraints.push(Constraint::ExactCount {
                participant: p,
                vars: space.participant_vars(p).collect(),
                target: matches,
            });
        }

        for t in 0..t_count {
            for r in 0..r_count {
                constraints.push(Constraint::AtMostOne {
                    scope: ExclusionScope::TimeslotResource {
                        timeslot: t,
                        resource: r,
                    },
                    vars: space.timeslot_resource_vars(t, r).collect(),
                });
            }
        }

        for p in 0..n {
            for t in 0..t_count {
                constraints.push(Constraint::AtMostOne {
                    scope: ExclusionScope::ParticipantTimeslot {
                        participant: p,
                        timeslot: t,
                    },
                    vars: space.participant_timeslot_vars(p, t).collect(),
                });
            }
        }

        for p in 0..n {
            for first in 0..t_count {
                let last = first.saturating_add(gap).min(t_count.saturating_sub(1));
                for second in first + 1..=last {
                    constraints.push(Constraint::Spacing {
                        participant: p,
                        first,
                        second,
                    });
                }
            }
        }

        for p in 0..n {
            for r in 0..r_count {
                constraints.push(Constraint::UsageLink {
                    participant: p,
                    resource: r,
                    vars: space.participant_resource_vars(p, r).collect(),
                });
            }
        }

        let (offsets, targets) = compile_conflicts(&space, &constraints);

        Self {
            constraints,
            offsets,
            targets,
        }
    }

    /// Variables that must be false once `var` is true.
    #[inline]
    pub fn conflicts(&self, var: SlotVar) -> &[SlotVar] {
        let i = var.index();
        &self.targets[self.offsets[i]..self.offsets[i + 1]]
    }

    /// Every constraint, in build order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Number of constraints of one kind.
    pub fn count(&self, kind: ConstraintKind) -> usize {
        self.constraints.iter().filter(|c| c.kind() == kind).count()
    }

    /// Number of constraints.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Whether the set holds no constraint.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

fn compile_conflicts(space: &SlotSpace, constraints: &[Constraint]) -> (Vec<usize>, Vec<SlotVar>) {
    let mut adjacency: Vec<Vec<SlotVar>> = vec![Vec::new(); space.len()];

    for constraint in constraints {
        match constraint {
            Constraint::AtMostOne { vars, .. } => {
                for (i, &a) in vars.iter().enumerate() {
                    for &b in &vars[i + 1..] {
                        adjacency[a.index()].push(b);
                        adjacency[b.index()].push(a);
                    }
                }
            }
            Constraint::Spacing {
                participant,
                first,
                second,
            } => {
                for a in space.participant_timeslot_vars(*participant, *first) {
                    for b in space.participant_timeslot_vars(*participant, *second) {
                        adjacency[a.index()].push(b);
                        adjacency[b.index()].push(a);
                    }
                }
            }
            Constraint::ExactCount { .. } | Constraint::UsageLink { .. } => {}
        }
    }

    let mut offsets = Vec::with_capacity(space.len() + 1);
    let mut targets = Vec::with_capacity(adjacency.iter().map(Vec::len).sum());
    offsets.push(0);
    for mut row in adjacency {
        row.sort_unstable();
        targets.extend(row);
        offsets.push(targets.len());
    }
    (offsets, targets)
}

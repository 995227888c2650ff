//! Root-split parallel search.
//!
//! The root's most-constrained participant must take one of its open slots.
//! Ordering those candidates as `c0, c1, ...`, subtree `i` fixes `ci` true
//! and every earlier candidate false, so the subtrees are disjoint and cover
//! the whole tree. Each subtree runs on a rayon worker; all workers prune
//! against one [`SharedIncumbent`].

use rayon::prelude::*;

use super::branching::Brancher;
use super::engine::{Deadline, SearchEngine, SearchRun};
use super::incumbent::SharedIncumbent;
use super::SearchOutcome;
use crate::constraints::ConstraintSet;
use crate::model::{DomainModel, SlotVar};
use crate::propagator::Propagator;

pub(crate) fn search(
    model: &DomainModel,
    constraints: &ConstraintSet,
    brancher: &Brancher,
    deadline: Deadline,
) -> SearchOutcome {
    let mut root = Propagator::new(model, constraints);
    let candidates: Option<Vec<SlotVar>> = root.check_root().ok().map(|()| {
        brancher
            .select_participant(&root)
            .map(|p| brancher.ordered_candidates(&root, p))
            .unwrap_or_default()
    });

    let shared = SharedIncumbent::new();
    let runs: Vec<SearchRun> = match candidates {
        None => Vec::new(),
        // propagation already completed the root
        Some(candidates) if candidates.is_empty() => {
            vec![SearchEngine::new(root, brancher, &shared, deadline).run().0]
        }
        Some(candidates) => (0..candidates.len())
            .into_par_iter()
            .map(|i| {
                let mut prop = root.clone();
                let restricted = candidates[..i]
                    .iter()
                    .try_for_each(|&earlier| prop.assign(earlier, false))
                    .and_then(|()| prop.assign(candidates[i], true));
                match restricted {
                    Ok(()) => SearchEngine::new(prop, brancher, &shared, deadline).run().0,
                    Err(_) => SearchRun::default(),
                }
            })
            .collect(),
    };

    let mut outcome = SearchOutcome::default();
    for run in &runs {
        outcome.stats.absorb(&run.stats);
        outcome.timed_out |= run.timed_out;
    }
    let (best, history) = shared.into_parts();
    outcome.best = best;
    outcome.stats.incumbent_history = history;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TournamentConfig;
    use std::time::Duration;

    #[test]
    fn test_parallel_matches_sequential_objective() {
        let config = TournamentConfig::default()
            .with_participants(4)
            .with_resources(2)
            .with_timeslots(4)
            .with_matches(2)
            .with_min_gap(1);
        let model = DomainModel::new(&config).unwrap();
        let constraints = ConstraintSet::build(&model);
        let brancher = Brancher::new(2, None);

        let outcome = search(
            &model,
            &constraints,
            &brancher,
            Deadline::new(Duration::from_secs(30)),
        );
        assert!(!outcome.timed_out);
        assert_eq!(outcome.best.map(|b| b.objective), Some(4));
        assert!(outcome
            .stats
            .incumbent_history
            .windows(2)
            .all(|w| w[1] < w[0]));
    }

    #[test]
    fn test_parallel_root_already_complete() {
        let config = TournamentConfig::default()
            .with_participants(1)
            .with_resources(1)
            .with_timeslots(3)
            .with_matches(3)
            .with_min_gap(0);
        let model = DomainModel::new(&config).unwrap();
        let constraints = ConstraintSet::build(&model);
        let brancher = Brancher::new(1, None);

        let outcome = search(
            &model,
            &constraints,
            &brancher,
            Deadline::new(Duration::from_secs(30)),
        );
        assert!(!outcome.timed_out);
        assert_eq!(outcome.best.map(|b| b.objective), Some(1));
    }

    #[test]
    fn test_parallel_infeasible() {
        let config = TournamentConfig::default()
            .with_participants(3)
            .with_resources(1)
            .with_timeslots(2)
            .with_matches(1)
            .with_min_gap(0);
        let model = DomainModel::new(&config).unwrap();
        let constraints = ConstraintSet::build(&model);
        let brancher = Brancher::new(1, None);

        let outcome = search(
            &model,
            &constraints,
            &brancher,
            Deadline::new(Duration::from_secs(30)),
        );
        assert!(!outcome.timed_out);
        assert!(outcome.best.is_none());
    }
}

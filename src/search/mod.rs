//! Branch-and-bound search for tournament schedules.
//!
//! # Algorithm
//!
//! The engine walks the tree of slot-variable decisions depth first:
//!
//! 1. Pick the incomplete participant with the fewest open slots and its
//!    most promising open slot (a resource it already plays on, then the
//!    earliest timeslot). Once every free (timeslot, resource) cell has to
//!    be filled, fill the earliest free cell instead, with the candidate
//!    that has the fewest spare spaced seats.
//! 2. Set the slot true and propagate; on backtrack, set it false.
//! 3. Once an incumbent exists, cut every subtree whose lower bound (used
//!    resources plus participants that must still open a new one) cannot
//!    beat it.
//!
//! The deadline is checked before every branching step. When it passes the
//! best incumbent is returned, flagged as not proven optimal.
//!
//! # Examples
//!
//! ```
//! use u_tournament::search::{SearchConfig, Solver};
//! use u_tournament::TournamentConfig;
//!
//! let config = TournamentConfig::default()
//!     .with_participants(4)
//!     .with_resources(2)
//!     .with_timeslots(4)
//!     .with_matches(2)
//!     .with_min_gap(1)
//!     .with_max_solve_seconds(10.0);
//!
//! let report = Solver::new(SearchConfig::default()).solve(&config).unwrap();
//! let solution = report.result.solution().unwrap();
//! assert!(solution.is_optimal);
//! assert_eq!(solution.objective, 4);
//! ```

mod branching;
mod config;
mod engine;
mod incumbent;
#[cfg(feature = "parallel")]
mod parallel;
mod stats;

pub use config::SearchConfig;
pub use engine::SearchPhase;
pub use stats::SearchStats;

use log::{debug, info, warn};

use crate::config::TournamentConfig;
use crate::constraints::{check_capacity, CapacityWarning, ConstraintSet};
use crate::error::TournamentError;
use crate::extract::Schedule;
use crate::model::DomainModel;
use crate::propagator::Propagator;
use crate::result::{NoSolution, NoSolutionReason, ScheduleResult, Solution, SolveReport};
use branching::Brancher;
use engine::{Deadline, SearchEngine};
use incumbent::{Incumbent, LocalIncumbent};

/// What a search produced, before it is turned into a result.
#[derive(Debug, Default)]
pub(crate) struct SearchOutcome {
    pub(crate) best: Option<Incumbent>,
    pub(crate) stats: SearchStats,
    pub(crate) timed_out: bool,
}

/// Tournament scheduler.
///
/// Holds only engine settings; every call to [`Solver::solve`] builds its
/// own model and search state and drops them on return.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SearchConfig,
}

impl Solver {
    /// Creates a solver with the given search options.
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// The search options in use.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Solves one tournament.
    ///
    /// Only an invalid configuration is an `Err`. Infeasible instances and
    /// timeouts come back as [`ScheduleResult::NoSolution`] or as a
    /// [`Solution`] with `is_optimal == false`.
    pub fn solve(&self, config: &TournamentConfig) -> Result<SolveReport, TournamentError> {
        let model = DomainModel::new(config)?;
        let deadline = Deadline::new(config.time_budget());
        info!(
            "solving {} participants x {} matches on {} resources x {} timeslots (gap {}, budget {}s)",
            config.participant_count,
            config.matches_per_participant,
            config.resource_count,
            config.timeslot_count,
            config.effective_gap(),
            config.max_solve_seconds
        );

        let warnings = check_capacity(config);
        for warning in &warnings {
            warn!("{warning}");
        }
        if self.config.capacity_precheck && warnings.iter().any(CapacityWarning::proves_infeasible) {
            info!("capacity check proves infeasibility, skipping search");
            let result = ScheduleResult::NoSolution(NoSolution {
                reason: NoSolutionReason::CapacityExceeded,
                elapsed_seconds: deadline.elapsed().as_secs_f64(),
                stats: SearchStats::default(),
            });
            return Ok(SolveReport { result, warnings });
        }

        let constraints = ConstraintSet::build(&model);
        debug!(
            "{} slot variables, {} constraints",
            model.space().len(),
            constraints.len()
        );
        let brancher = Brancher::new(config.resource_count, self.config.seed);
        let outcome = self.search(&model, &constraints, &brancher, deadline);
        let elapsed_seconds = deadline.elapsed().as_secs_f64();

        let result = match outcome.best {
            Some(best) => {
                let schedule = Schedule::from_values(model.space(), &best.values)?;
                let solution = Solution {
                    schedule,
                    objective: best.objective,
                    is_optimal: !outcome.timed_out,
                    elapsed_seconds,
                    stats: outcome.stats,
                };
                info!(
                    "{} solution, objective {} ({} nodes, {} backtracks, {:.3}s)",
                    if solution.is_optimal { "optimal" } else { "feasible" },
                    solution.objective,
                    solution.stats.nodes_explored,
                    solution.stats.backtracks,
                    elapsed_seconds
                );
                ScheduleResult::Solution(solution)
            }
            None => {
                let reason = if outcome.timed_out {
                    NoSolutionReason::TimeExpired
                } else {
                    NoSolutionReason::Exhausted
                };
                info!(
                    "no solution: {reason} ({} nodes, {:.3}s)",
                    outcome.stats.nodes_explored, elapsed_seconds
                );
                ScheduleResult::NoSolution(NoSolution {
                    reason,
                    elapsed_seconds,
                    stats: outcome.stats,
                })
            }
        };

        Ok(SolveReport { result, warnings })
    }

    fn search(
        &self,
        model: &DomainModel,
        constraints: &ConstraintSet,
        brancher: &Brancher,
        deadline: Deadline,
    ) -> SearchOutcome {
        if self.config.parallel {
            #[cfg(feature = "parallel")]
            {
                return parallel::search(model, constraints, brancher, deadline);
            }
            #[cfg(not(feature = "parallel"))]
            {
                warn!("parallel search requested without the `parallel` feature, searching sequentially");
            }
        }

        let prop = Propagator::new(model, constraints);
        let (run, incumbent) =
            SearchEngine::new(prop, brancher, LocalIncumbent::default(), deadline).run();
        SearchOutcome {
            best: incumbent.into_best(),
            stats: run.stats,
            timed_out: run.timed_out,
        }
    }
}

/// Solves `config` with the default [`SearchConfig`].
pub fn solve(config: &TournamentConfig) -> Result<SolveReport, TournamentError> {
    Solver::default().solve(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::check_solution;

    fn scenario_a() -> TournamentConfig {
        TournamentConfig::default()
            .with_participants(4)
            .with_resources(2)
            .with_timeslots(4)
            .with_matches(2)
            .with_min_gap(1)
            .with_max_solve_seconds(30.0)
    }

    #[test]
    fn test_scenario_a_optimal() {
        let config = scenario_a();
        let report = solve(&config).unwrap();
        let solution = report.result.solution().unwrap();
        assert!(solution.is_optimal);
        assert!(solution.objective <= 4);
        assert!(check_solution(&config, solution).is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_scenario_b_default_tournament() {
        let config = TournamentConfig::default();
        let report = solve(&config).unwrap();
        let solution = report.result.solution().unwrap();
        assert!(check_solution(&config, solution).is_empty());
        for (_, schedule) in solution.participant_view().iter() {
            assert_eq!(schedule.matches.len(), 4);
            assert!(schedule
                .matches
                .windows(2)
                .all(|w| w[1].timeslot > w[0].timeslot + 1));
        }
        // 48 matches fill all 48 cells
        assert!(matches!(
            report.warnings.as_slice(),
            [CapacityWarning::Tight { .. }]
        ));
    }

    #[test]
    fn test_scenario_c_over_capacity() {
        let config = TournamentConfig::default()
            .with_participants(10)
            .with_resources(2)
            .with_timeslots(4)
            .with_matches(4)
            .with_min_gap(0);
        let report = solve(&config).unwrap();
        match &report.result {
            ScheduleResult::NoSolution(none) => {
                assert_eq!(none.reason, NoSolutionReason::CapacityExceeded);
                assert_eq!(none.stats.nodes_explored, 0);
            }
            ScheduleResult::Solution(_) => panic!("over-capacity instance produced a solution"),
        }
        assert!(report.warnings.iter().any(|w| w.proves_infeasible()));
    }

    #[test]
    fn test_over_capacity_without_precheck_exhausts() {
        let config = TournamentConfig::default()
            .with_participants(10)
            .with_resources(2)
            .with_timeslots(4)
            .with_matches(4)
            .with_min_gap(0);
        let solver = Solver::new(SearchConfig::default().with_capacity_precheck(false));
        let report = solver.solve(&config).unwrap();
        match &report.result {
            ScheduleResult::NoSolution(none) => {
                assert_eq!(none.reason, NoSolutionReason::Exhausted)
            }
            ScheduleResult::Solution(_) => panic!("over-capacity instance produced a solution"),
        }
    }

    #[test]
    fn test_single_resource_full_timeslots_infeasible() {
        let config = TournamentConfig::default()
            .with_participants(2)
            .with_resources(1)
            .with_timeslots(5)
            .with_matches(5)
            .with_min_gap(0)
            .with_max_solve_seconds(1000.0);
        let solver = Solver::new(SearchConfig::default().with_capacity_precheck(false));
        let report = solver.solve(&config).unwrap();
        let ScheduleResult::NoSolution(none) = &report.result else {
            panic!("expected no solution");
        };
        assert_eq!(none.reason, NoSolutionReason::Exhausted);
        assert!(none.stats.nodes_explored <= 1);
    }

    #[test]
    fn test_invalid_config_is_error() {
        let config = TournamentConfig::default().with_matches(9);
        assert!(matches!(
            solve(&config),
            Err(TournamentError::Configuration(_))
        ));
    }

    #[test]
    fn test_same_objective_across_runs() {
        let config = TournamentConfig::default()
            .with_participants(6)
            .with_resources(3)
            .with_timeslots(6)
            .with_matches(3)
            .with_min_gap(1)
            .with_max_solve_seconds(30.0);
        let first = solve(&config).unwrap();
        let second = solve(&config).unwrap();
        let (a, b) = (
            first.result.solution().unwrap(),
            second.result.solution().unwrap(),
        );
        assert!(a.is_optimal && b.is_optimal);
        assert_eq!(a.objective, b.objective);
        assert!(check_solution(&config, a).is_empty());
        assert!(check_solution(&config, b).is_empty());
    }

    #[test]
    fn test_seeded_runs_agree_on_optimum() {
        let config = scenario_a();
        let plain = solve(&config).unwrap();
        let seeded = Solver::new(SearchConfig::default().with_seed(42))
            .solve(&config)
            .unwrap();
        assert_eq!(
            plain.result.solution().map(|s| s.objective),
            seeded.result.solution().map(|s| s.objective)
        );
    }

    #[test]
    fn test_parallel_request_is_served() {
        let config = scenario_a();
        let report = Solver::new(SearchConfig::default().with_parallel(true))
            .solve(&config)
            .unwrap();
        let solution = report.result.solution().unwrap();
        assert!(solution.is_optimal);
        assert_eq!(solution.objective, 4);
        assert!(check_solution(&config, solution).is_empty());
    }

    #[test]
    fn test_zero_time_budget_reports_time_expired() {
        let config = TournamentConfig::default().with_max_solve_seconds(1e-9);
        let report = solve(&config).unwrap();
        // a one-nanosecond budget expires before the first branching step
        let none = report
            .result
            .no_solution()
            .expect("no schedule without a single branch");
        assert_eq!(none.reason, NoSolutionReason::TimeExpired);
        assert_eq!(none.stats.nodes_explored, 0);
    }

    #[test]
    fn test_timeout_after_incumbent_is_not_optimal() {
        let config = TournamentConfig::default()
            .with_participants(20)
            .with_resources(8)
            .with_timeslots(10)
            .with_matches(4)
            .with_min_gap(1)
            .with_max_solve_seconds(1.0);
        let report = solve(&config).unwrap();
        let solution = report.result.solution().expect("a schedule within one second");
        assert!(!solution.is_optimal);
        assert!(solution.elapsed_seconds >= 1.0);
        assert!(!solution.stats.incumbent_history.is_empty());
        assert!(check_solution(&config, solution).is_empty());
    }

    fn tight(n: usize, r: usize) -> TournamentConfig {
        TournamentConfig::default()
            .with_participants(n)
            .with_resources(r)
            .with_timeslots(10)
            .with_matches(4)
            .with_min_gap(1)
            .with_max_solve_seconds(3.0)
    }

    #[test]
    fn test_tight_ten_participants_on_four_resources() {
        let config = tight(10, 4);
        let report = solve(&config).unwrap();
        let solution = report.result.solution().expect("40 matches fill 40 cells");
        assert!(check_solution(&config, solution).is_empty());
        assert_eq!(
            report.warnings,
            vec![CapacityWarning::Tight {
                demand: 40,
                capacity: 40
            }]
        );
    }

    #[test]
    fn test_tight_twenty_participants_on_eight_resources() {
        let config = tight(20, 8);
        let report = solve(&config).unwrap();
        let solution = report.result.solution().expect("80 matches fill 80 cells");
        assert!(check_solution(&config, solution).is_empty());
        assert!(matches!(
            report.warnings.as_slice(),
            [CapacityWarning::Tight { demand: 80, capacity: 80 }]
        ));
    }

    #[test]
    fn test_huge_gap_allows_one_match_each() {
        let config = TournamentConfig::default()
            .with_participants(2)
            .with_resources(1)
            .with_timeslots(3)
            .with_matches(1)
            .with_min_gap(usize::MAX)
            .with_max_solve_seconds(5.0);
        let report = solve(&config).unwrap();
        let solution = report.result.solution().unwrap();
        assert!(solution.is_optimal);
        assert_eq!(solution.objective, 2);
        assert!(check_solution(&config, solution).is_empty());
        assert!(report.warnings.is_empty());

        let crowded = config.with_matches(2);
        let report = Solver::new(SearchConfig::default().with_capacity_precheck(false))
            .solve(&crowded)
            .unwrap();
        assert_eq!(
            report.result.no_solution().map(|none| none.reason),
            Some(NoSolutionReason::Exhausted)
        );
    }
}

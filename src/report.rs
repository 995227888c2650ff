//! Human-readable rendering of a solve result.
//!
//! All ids are printed 1-based.

use std::fmt;

use crate::extract::ParticipantView;
use crate::result::{NoSolution, ScheduleResult, Solution, SolveReport};

/// Distribution of distinct-resource usage over participants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageSummary {
    pub participants: usize,
    /// Summed distinct resources, equal to the objective.
    pub total_usage: usize,
    pub average: f64,
    pub on_one: usize,
    pub on_two: usize,
    pub on_more: usize,
}

impl UsageSummary {
    /// Tallies resource usage from a participant view.
    pub fn from_view(view: &ParticipantView) -> Self {
        let mut summary = Self {
            participants: view.len(),
            total_usage: 0,
            average: 0.0,
            on_one: 0,
            on_two: 0,
            on_more: 0,
        };
        for (_, schedule) in view.iter() {
            let used = schedule.resource_count();
            summary.total_usage += used;
            match used {
                0 => {}
                1 => summary.on_one += 1,
                2 => summary.on_two += 1,
                _ => summary.on_more += 1,
            }
        }
        if summary.participants > 0 {
            summary.average = summary.total_usage as f64 / summary.participants as f64;
        }
        summary
    }
}

/// Display adapter for a [`SolveReport`].
///
/// # Examples
///
/// ```
/// use u_tournament::report::Report;
/// use u_tournament::TournamentConfig;
///
/// let config = TournamentConfig::default()
///     .with_participants(2)
///     .with_resources(1)
///     .with_timeslots(4)
///     .with_matches(2);
/// let report = u_tournament::solve(&config).unwrap();
/// let text = Report::new(&report).to_string();
/// assert!(text.contains("Timeslot 1"));
/// ```
pub struct Report<'a> {
    report: &'a SolveReport,
}

impl<'a> Report<'a> {
    /// Wraps a solve report for display.
    pub fn new(report: &'a SolveReport) -> Self {
        Self { report }
    }

    fn write_solution(&self, f: &mut fmt::Formatter<'_>, solution: &Solution) -> fmt::Result {
        let rule = "=".repeat(70);

        writeln!(f, "{rule}")?;
        writeln!(f, "SCHEDULE PER TIMESLOT")?;
        writeln!(f, "{rule}")?;
        for (timeslot, occupants) in solution.timeslot_view().iter() {
            writeln!(f)?;
            writeln!(f, "Timeslot {}:", timeslot + 1)?;
            if occupants.is_empty() {
                writeln!(f, "   (no matches)")?;
            }
            for occupant in occupants {
                writeln!(
                    f,
                    "   Resource {:2} -> Participant {:2}",
                    occupant.resource + 1,
                    occupant.participant + 1
                )?;
            }
        }

        writeln!(f)?;
        writeln!(f, "{rule}")?;
        writeln!(f, "SCHEDULE PER PARTICIPANT")?;
        writeln!(f, "{rule}")?;
        for (participant, schedule) in solution.participant_view().iter() {
            writeln!(f)?;
            writeln!(f, "Participant {}:", participant + 1)?;
            for m in &schedule.matches {
                writeln!(
                    f,
                    "   Timeslot {:2} -> Resource {:2}",
                    m.timeslot + 1,
                    m.resource + 1
                )?;
            }
            let resources: Vec<String> = schedule
                .resources
                .iter()
                .map(|r| (r + 1).to_string())
                .collect();
            writeln!(
                f,
                "   Uses {} resource(s): [{}]",
                schedule.resource_count(),
                resources.join(", ")
            )?;
        }

        let summary = UsageSummary::from_view(solution.participant_view());
        writeln!(f)?;
        writeln!(f, "{rule}")?;
        writeln!(f, "STATISTICS")?;
        writeln!(f, "{rule}")?;
        let status = if solution.is_optimal {
            "OPTIMAL"
        } else {
            "FEASIBLE"
        };
        writeln!(f, "Status: {status}")?;
        writeln!(f, "Solve time: {:.2} seconds", solution.elapsed_seconds)?;
        writeln!(f, "Objective: {}", solution.objective)?;
        writeln!(f, "Average resources per participant: {:.2}", summary.average)?;
        writeln!(f, "Participants on 1 resource: {}", summary.on_one)?;
        writeln!(f, "Participants on 2 resources: {}", summary.on_two)?;
        if summary.on_more > 0 {
            writeln!(f, "Participants on 3+ resources: {}", summary.on_more)?;
        }
        writeln!(f)?;
        writeln!(f, "Search:")?;
        writeln!(f, "  Nodes: {}", solution.stats.nodes_explored)?;
        writeln!(f, "  Backtracks: {}", solution.stats.backtracks)
    }

    fn write_no_solution(&self, f: &mut fmt::Formatter<'_>, none: &NoSolution) -> fmt::Result {
        writeln!(f, "NO SOLUTION FOUND ({})", none.reason)?;
        writeln!(f)?;
        writeln!(f, "Try:")?;
        writeln!(f, "   - more timeslots")?;
        writeln!(f, "   - fewer participants")?;
        writeln!(f, "   - a smaller minimum gap between matches")?;
        writeln!(f, "   - more resources")?;
        writeln!(f)?;
        writeln!(
            f,
            "Searched {} nodes in {:.2} seconds",
            none.stats.nodes_explored, none.elapsed_seconds
        )
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for warning in &self.report.warnings {
            writeln!(f, "warning: {warning}")?;
        }
        if !self.report.warnings.is_empty() {
            writeln!(f)?;
        }
        match &self.report.result {
            ScheduleResult::Solution(solution) => self.write_solution(f, solution),
            ScheduleResult::NoSolution(none) => self.write_no_solution(f, none),
        }
    }
}

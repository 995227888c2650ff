//! Search statistics.

use std::fmt;

/// Counters collected during one solve call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchStats {
    /// Branching nodes visited.
    pub nodes_explored: u64,
    /// Dead ends (contradiction or bound) that forced a backtrack.
    pub backtracks: u64,
    /// Complete assignments reached, improving or not.
    pub solutions_found: u64,
    /// Subtrees cut because the objective bound could not beat the incumbent.
    pub prunings_bound: u64,
    /// Subtrees cut because propagation hit a contradiction.
    pub prunings_infeasible: u64,
    /// Deepest decision level reached.
    pub max_depth: usize,
    /// Objective of every installed incumbent, in installation order.
    pub incumbent_history: Vec<usize>,
}

impl SearchStats {
    #[inline]
    pub(crate) fn on_node_explored(&mut self) {
        self.nodes_explored = self.nodes_explored.saturating_add(1);
    }

    #[inline]
    pub(crate) fn on_backtrack(&mut self) {
        self.backtracks = self.backtracks.saturating_add(1);
    }

    #[inline]
    pub(crate) fn on_solution_found(&mut self) {
        self.solutions_found = self.solutions_found.saturating_add(1);
    }

    #[inline]
    pub(crate) fn on_pruning_bound(&mut self) {
        self.prunings_bound = self.prunings_bound.saturating_add(1);
    }

    #[inline]
    pub(crate) fn on_pruning_infeasible(&mut self) {
        self.prunings_infeasible = self.prunings_infeasible.saturating_add(1);
    }

    #[inline]
    pub(crate) fn on_depth_update(&mut self, depth: usize) {
        self.max_depth = self.max_depth.max(depth);
    }

    pub(crate) fn on_incumbent(&mut self, objective: usize) {
        self.incumbent_history.push(objective);
    }

    /// Adds the counters of another run. Incumbent histories are not merged;
    /// the caller owns the authoritative one.
    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    pub(crate) fn absorb(&mut self, other: &SearchStats) {
        self.nodes_explored = self.nodes_explored.saturating_add(other.nodes_explored);
        self.backtracks = self.backtracks.saturating_add(other.backtracks);
        self.solutions_found = self.solutions_found.saturating_add(other.solutions_found);
        self.prunings_bound = self.prunings_bound.saturating_add(other.prunings_bound);
        self.prunings_infeasible = self
            .prunings_infeasible
            .saturating_add(other.prunings_infeasible);
        self.max_depth = self.max_depth.max(other.max_depth);
    }

    /// Best objective recorded, if any.
    pub fn best_objective(&self) -> Option<usize> {
        self.incumbent_history.last().copied()
    }
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Nodes explored:        {}", self.nodes_explored)?;
        writeln!(f, "Backtracks:            {}", self.backtracks)?;
        writeln!(f, "Solutions found:       {}", self.solutions_found)?;
        writeln!(f, "Prunings (bound):      {}", self.prunings_bound)?;
        writeln!(f, "Prunings (infeasible): {}", self.prunings_infeasible)?;
        writeln!(f, "Max depth:             {}", self.max_depth)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut stats = SearchStats::default();
        stats.on_node_explored();
        stats.on_node_explored();
        stats.on_backtrack();
        stats.on_depth_update(4);
        stats.on_depth_update(2);
        stats.on_incumbent(9);
        stats.on_incumbent(7);

        assert_eq!(stats.nodes_explored, 2);
        assert_eq!(stats.backtracks, 1);
        assert_eq!(stats.max_depth, 4);
        assert_eq!(stats.best_objective(), Some(7));
    }

    #[test]
    fn test_absorb_keeps_own_history() {
        let mut a = SearchStats::default();
        a.on_incumbent(5);
        let mut b = SearchStats {
            nodes_explored: 10,
            backtracks: 3,
            max_depth: 6,
            ..SearchStats::default()
        };
        b.on_incumbent(4);

        a.absorb(&b);
        assert_eq!(a.nodes_explored, 10);
        assert_eq!(a.backtracks, 3);
        assert_eq!(a.max_depth, 6);
        assert_eq!(a.incumbent_history, vec![5]);
    }

    #[test]
    fn test_display() {
        let stats = SearchStats {
            nodes_explored: 42,
            ..SearchStats::default()
        };
        assert!(stats.to_string().contains("Nodes explored:        42"));
    }
}

//! Counters from the last search, for logs and tuning.

use serde::{Deserialize, Serialize};

/// What one search did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Select-expand-simulate-backpropagate rounds completed.
    pub iterations: u32,

    /// Children added to the tree.
    pub nodes_expanded: u32,

    /// Expansions where no player's macro-action could be applied.
    pub failed_expansions: u32,

    /// Rollouts played.
    pub simulations: u32,

    /// Deepest node created.
    pub max_depth: u16,

    /// Wall-clock search time in microseconds.
    pub time_us: u64,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Throughput over the whole search; 0 before any time was recorded.
    #[must_use]
    pub fn iterations_per_second(&self) -> f64 {
        match self.time_us {
            0 => 0.0,
            us => f64::from(self.iterations) * 1e6 / us as f64,
        }
    }

    /// Share of expansion attempts that produced a node.
    #[must_use]
    pub fn expansion_success_rate(&self) -> f64 {
        match self.nodes_expanded + self.failed_expansions {
            0 => 0.0,
            attempts => f64::from(self.nodes_expanded) / f64::from(attempts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throughput() {
        let stats = SearchStats {
            iterations: 250,
            time_us: 500_000,
            ..SearchStats::default()
        };
        assert_eq!(stats.iterations_per_second(), 500.0);
        assert_eq!(SearchStats::new().iterations_per_second(), 0.0);
    }

    #[test]
    fn test_expansion_success_rate() {
        let mut stats = SearchStats::new();
        assert_eq!(stats.expansion_success_rate(), 0.0);

        stats.nodes_expanded = 3;
        stats.failed_expansions = 1;
        assert_eq!(stats.expansion_success_rate(), 0.75);

        stats.reset();
        assert_eq!(stats, SearchStats::default());
    }

    #[test]
    fn test_json_round_trip() {
        let stats = SearchStats {
            iterations: 42,
            failed_expansions: 3,
            ..SearchStats::default()
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(serde_json::from_str::<SearchStats>(&json).unwrap(), stats);
    }
}

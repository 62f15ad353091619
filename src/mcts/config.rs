//! Search parameters.

use serde::{Deserialize, Serialize};

/// Knobs of one `MctsSearch`. Serializable so hosts can load them with the
/// rest of their agent config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MctsConfig {
    /// Weight of the exploration term in UCT.
    pub exploration_constant: f64,

    /// Rollout length in plies.
    pub simulation_depth: u32,

    /// In-game milliseconds a simulated queue round advances the snapshot.
    pub simulation_pace_ms: u64,

    /// Tree size cap. At the cap, iterations keep simulating from the
    /// selected node but add no children.
    pub max_nodes: usize,

    /// Seed of the search RNG; equal seeds give equal iteration-bounded
    /// searches.
    pub seed: u64,

    /// Replace unknown terrain with a guess before searching. Off by
    /// default: a determinized root has no frontier left to explore.
    pub determinize: bool,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            exploration_constant: std::f64::consts::SQRT_2,
            simulation_depth: 20,
            simulation_pace_ms: 1250,
            max_nodes: 100_000,
            seed: 42,
            determinize: false,
        }
    }
}

impl MctsConfig {
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_simulation_depth(mut self, depth: u32) -> Self {
        self.simulation_depth = depth;
        self
    }

    pub fn with_simulation_pace(mut self, ms: u64) -> Self {
        self.simulation_pace_ms = ms;
        self
    }

    /// Caps below 1 are raised to 1 (the root).
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes.max(1);
        self
    }

    pub fn with_determinize(mut self, enabled: bool) -> Self {
        self.determinize = enabled;
        self
    }
}

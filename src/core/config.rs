//! Decision-loop configuration.
//!
//! Timing values are milliseconds. Defaults match a 1.25 s decision period
//! with a 100 ms slice for resolving and enqueuing the decided macro-action.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::ids::UnitTypeId;
use crate::mcts::MctsConfig;

/// Configuration of the real-time decision loop.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Fixed decision period; also the wall-clock budget of one search.
    pub decision_pace_ms: u64,

    /// Time reserved after search for resolving and enqueuing.
    pub macro_action_calc_ms: u64,

    /// Offset of the first dispatched action from the send base time.
    /// Subsequent actions in the same batch get +1 ms each.
    pub dispatch_offset_ms: u64,

    /// Units not listed in `fast_unit_types` dispatch on every n-th cycle.
    pub slow_unit_cadence: u64,

    /// Unit types that dispatch a step every cycle.
    pub fast_unit_types: FxHashSet<UnitTypeId>,

    /// Pick a random legal macro-action when search decides nothing.
    pub random_fallback: bool,

    /// Search parameters.
    pub mcts: MctsConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        let mut fast_unit_types = FxHashSet::default();
        fast_unit_types.insert(UnitTypeId::new(2));

        Self {
            decision_pace_ms: 1250,
            macro_action_calc_ms: 100,
            dispatch_offset_ms: 25,
            slow_unit_cadence: 2,
            fast_unit_types,
            random_fallback: true,
            mcts: MctsConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Set the decision period.
    #[must_use]
    pub fn with_decision_pace(mut self, ms: u64) -> Self {
        self.decision_pace_ms = ms;
        self
    }

    /// Set the post-search enqueue slice.
    #[must_use]
    pub fn with_macro_action_calc(mut self, ms: u64) -> Self {
        self.macro_action_calc_ms = ms;
        self
    }

    /// Set the dispatch cadence for slow units. Values below 1 are clamped.
    #[must_use]
    pub fn with_slow_unit_cadence(mut self, cadence: u64) -> Self {
        self.slow_unit_cadence = cadence.max(1);
        self
    }

    /// Replace the fast unit type set.
    #[must_use]
    pub fn with_fast_unit_types(mut self, types: impl IntoIterator<Item = UnitTypeId>) -> Self {
        self.fast_unit_types = types.into_iter().collect();
        self
    }

    /// Enable or disable the random no-decision fallback.
    #[must_use]
    pub fn with_random_fallback(mut self, enabled: bool) -> Self {
        self.random_fallback = enabled;
        self
    }

    /// Replace the search configuration.
    #[must_use]
    pub fn with_mcts(mut self, mcts: MctsConfig) -> Self {
        self.mcts = mcts;
        self
    }

    /// Total in-game time one cycle covers.
    #[must_use]
    pub fn cycle_ms(&self) -> u64 {
        self.decision_pace_ms + self.macro_action_calc_ms
    }

    /// Whether slow units dispatch on `turn`.
    #[must_use]
    pub fn is_slow_turn(&self, turn: u64) -> bool {
        turn % self.slow_unit_cadence.max(1) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert_eq!(config.decision_pace_ms, 1250);
        assert_eq!(config.macro_action_calc_ms, 100);
        assert_eq!(config.cycle_ms(), 1350);
        assert!(config.fast_unit_types.contains(&UnitTypeId::new(2)));
        assert!(config.random_fallback);
    }

    #[test]
    fn test_cadence() {
        let config = AgentConfig::default().with_slow_unit_cadence(3);
        assert!(config.is_slow_turn(0));
        assert!(!config.is_slow_turn(1));
        assert!(!config.is_slow_turn(2));
        assert!(config.is_slow_turn(3));

        let clamped = AgentConfig::default().with_slow_unit_cadence(0);
        assert!(clamped.is_slow_turn(1));
    }

    #[test]
    fn test_serialization() {
        let config = AgentConfig::default()
            .with_decision_pace(40)
            .with_fast_unit_types([UnitTypeId::new(5)]);

        let json = serde_json::to_string(&config).unwrap();
        let deserialized: AgentConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.decision_pace_ms, 40);
        assert!(deserialized.fast_unit_types.contains(&UnitTypeId::new(5)));
        assert_eq!(deserialized.mcts.seed, config.mcts.seed);
    }
}

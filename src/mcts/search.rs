//! Simultaneous-move MCTS over macro-actions.
//!
//! One search builds a fresh tree rooted at the projected snapshot and runs
//! select, expand, simulate, backpropagate until the budget is spent. Every
//! player acts simultaneously: an edge carries one macro-action per player.
//! Macro-actions are played out through a simulated `AgentState`, reset to
//! a clone of the real one at the start of each iteration and never seen
//! by dispatch.

use std::time::Instant;

use tracing::{debug, trace};

use crate::command::{drain_simulated, enqueue, AgentState};
use crate::core::{AgentError, GameRng, PlayerId, PlayerMap};
use crate::engine::Snapshot;
use crate::macros::{legal_macro_actions, MacroAction};
use crate::planning::determinized_copy;

use super::budget::SearchBudget;
use super::config::MctsConfig;
use super::node::NodeId;
use super::policy::{determine_winners, first_max, move_cmp, selection_cmp};
use super::stats::SearchStats;
use super::tree::{GameTree, TreeStats};

/// Outcome of one search.
#[derive(Clone, Debug, PartialEq)]
pub struct Decision {
    /// Macro-action for the searching player, if any.
    pub action: Option<MacroAction>,

    /// True when the action was picked at random because the tree offered
    /// none.
    pub fallback: bool,

    pub stats: SearchStats,

    pub tree: TreeStats,
}

/// Reusable search context: configuration, RNG and counters.
///
/// Owns the configuration and RNG; trees live only for one `search` call.
pub struct MctsSearch {
    /// Active configuration.
    config: MctsConfig,

    /// RNG for expansion picks, rollouts and the fallback.
    rng: GameRng,

    /// Pick a random legal macro-action when the tree has no answer.
    random_fallback: bool,

    /// Statistics of the last search.
    stats: SearchStats,
}

impl MctsSearch {
    /// Search state seeded from `config.seed`.
    pub fn new(config: MctsConfig) -> Self {
        let rng = GameRng::new(config.seed);
        Self {
            config,
            rng,
            random_fallback: true,
            stats: SearchStats::default(),
        }
    }

    pub fn with_random_fallback(mut self, enabled: bool) -> Self {
        self.random_fallback = enabled;
        self
    }

    #[must_use]
    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Statistics of the last search.
    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Search from `snapshot` for `agent` and decide a macro-action.
    ///
    /// `state` is the agent's real shadow state; it is only read.
    pub fn search<S: Snapshot>(
        &mut self,
        snapshot: &S,
        agent: PlayerId,
        state: &AgentState,
        budget: SearchBudget,
    ) -> Result<Decision, AgentError> {
        let tree = self.build_tree(snapshot, agent, state, budget)?;
        let (action, fallback) = self.decide(&tree, agent, state);

        debug!(
            iterations = self.stats.iterations,
            nodes = tree.len(),
            decision = ?action,
            fallback,
            "search finished"
        );
        Ok(Decision {
            action,
            fallback,
            stats: self.stats.clone(),
            tree: tree.stats(),
        })
    }

    /// Run iterations until `budget` is spent and return the tree.
    pub fn build_tree<S: Snapshot>(
        &mut self,
        snapshot: &S,
        agent: PlayerId,
        state: &AgentState,
        budget: SearchBudget,
    ) -> Result<GameTree<S>, AgentError> {
        let start = Instant::now();
        self.stats.reset();

        let root = if self.config.determinize {
            determinized_copy(snapshot, agent)
        } else {
            snapshot.copy()
        };
        let mut tree = GameTree::new(root, snapshot.player_count());

        while !budget.is_exhausted(self.stats.iterations) {
            self.iteration(&mut tree, agent, state, &budget)?;
            self.stats.iterations += 1;
        }

        self.stats.time_us = start.elapsed().as_micros() as u64;
        Ok(tree)
    }

    /// One pass of selection, joint expansion, rollout and propagation.
    fn iteration<S: Snapshot>(
        &mut self,
        tree: &mut GameTree<S>,
        agent: PlayerId,
        state: &AgentState,
        budget: &SearchBudget,
    ) -> Result<(), AgentError> {
        let mut sim_state = state.clone();

        // Selection
        let leaf = self.select(tree, agent);

        // Expansion
        let can_grow = tree.len() < self.config.max_nodes
            && !tree.get(leaf).snapshot.is_game_over();
        let expanded = if can_grow {
            self.expand(tree, leaf, &mut sim_state)?
        } else {
            None
        };
        let node = expanded.unwrap_or(leaf);

        // Simulation
        let winners = self.simulate(&tree.get(node).snapshot, &mut sim_state, budget);

        // Backpropagation
        tree.backpropagate(node, &winners);
        Ok(())
    }

    /// Descend from the root by UCT until reaching a node that can still
    /// grow or has no children.
    pub fn select<S: Snapshot>(&self, tree: &GameTree<S>, agent: PlayerId) -> NodeId {
        let exploration = self.config.exploration_constant;
        let mut current = tree.root();
        loop {
            let node = tree.get(current);
            if node.is_leaf() || node.is_expandable() {
                return current;
            }
            match first_max(&node.children, |a, b| selection_cmp(tree, a, b, agent, exploration)) {
                Some(best) => current = best,
                None => return current,
            }
        }
    }

    /// Add one child under `leaf` labelled with the macro-actions that could
    /// be applied, one untried pick per player.
    ///
    /// Players whose pick fails to resolve are left out of the label. Returns
    /// `None` when no player's pick could be applied.
    fn expand<S: Snapshot>(
        &mut self,
        tree: &mut GameTree<S>,
        leaf: NodeId,
        sim_state: &mut AgentState,
    ) -> Result<Option<NodeId>, AgentError> {
        let player_count = tree.player_count();

        if tree.get(leaf).untried.is_none() {
            let snapshot = &tree.get(leaf).snapshot;
            let untried = PlayerMap::new(player_count, |p| legal_macro_actions(snapshot, p, &*sim_state));
            tree.get_mut(leaf).untried = Some(untried);
        }

        let mut picks: PlayerMap<Option<MacroAction>> = PlayerMap::with_value(player_count, None);
        if let Some(untried) = tree.get_mut(leaf).untried.as_mut() {
            for (player, actions) in untried.iter_mut() {
                if actions.is_empty() {
                    continue;
                }
                let idx = self.rng.gen_range_usize(0..actions.len());
                picks[player] = Some(actions.swap_remove(idx));
            }
        }

        let mut snapshot = tree.get(leaf).snapshot.copy();
        let mut applied: PlayerMap<Option<MacroAction>> = PlayerMap::with_value(player_count, None);
        for (player, pick) in picks.iter() {
            let Some(action) = *pick else { continue };
            match enqueue(sim_state, action, &snapshot, player) {
                Ok(_) => applied[player] = Some(action),
                Err(err) => trace!(%player, %action, error = %err, "expansion pick failed"),
            }
        }

        if applied.iter().all(|(_, a)| a.is_none()) {
            self.stats.failed_expansions += 1;
            return Ok(None);
        }

        drain_simulated(sim_state, &mut snapshot, self.config.simulation_pace_ms);
        let child = tree.add_child(leaf, snapshot, applied)?;
        self.stats.nodes_expanded += 1;
        self.stats.max_depth = self.stats.max_depth.max(tree.get(child).depth);
        Ok(Some(child))
    }

    /// Random rollout from `start` and its winners.
    ///
    /// Each ply every player enqueues one random legal macro-action, then
    /// the simulated queues are played out. Stops after the configured
    /// depth, at the deadline, or when the game ends. Failures of single
    /// players are ignored.
    pub fn simulate<S: Snapshot>(
        &mut self,
        start: &S,
        sim_state: &mut AgentState,
        budget: &SearchBudget,
    ) -> PlayerMap<bool> {
        self.stats.simulations += 1;
        let pace = self.config.simulation_pace_ms;
        let mut snapshot = start.copy();

        for _ in 0..self.config.simulation_depth {
            if budget.is_past_deadline() || snapshot.is_game_over() {
                break;
            }
            for player in PlayerId::all(snapshot.player_count()) {
                let actions = legal_macro_actions(&snapshot, player, sim_state);
                let Some(&action) = self.rng.choose(&actions) else {
                    continue;
                };
                if let Err(err) = enqueue(sim_state, action, &snapshot, player) {
                    trace!(%player, %action, error = %err, "rollout pick failed");
                }
            }
            if drain_simulated(sim_state, &mut snapshot, pace) == 0 {
                if let Err(err) = snapshot.advance(pace) {
                    trace!(error = %err, "idle rollout step failed");
                }
            }
        }

        determine_winners(&snapshot)
    }

    /// Best root child's macro-action for `agent`, or a random legal one.
    ///
    /// Returns the action and whether it came from the fallback.
    pub fn decide<S: Snapshot>(
        &mut self,
        tree: &GameTree<S>,
        agent: PlayerId,
        state: &AgentState,
    ) -> (Option<MacroAction>, bool) {
        let root = tree.root_node();
        let best = first_max(&root.children, |a, b| move_cmp(tree, a, b, agent));
        if let Some(action) = best.and_then(|child| tree.get(child).action_of(agent)) {
            return (Some(action), false);
        }
        if !self.random_fallback {
            return (None, false);
        }

        let legal = legal_macro_actions(&root.snapshot, agent, state);
        match self.rng.choose(&legal) {
            Some(&action) => (Some(action), true),
            None => (None, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Position;
    use crate::games::skirmish::{SkirmishBuilder, SkirmishGame, INFANTRY};

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn duel() -> SkirmishGame {
        SkirmishBuilder::new(5, 5)
            .unit(P0, INFANTRY, Position::new(0, 0))
            .unit(P1, INFANTRY, Position::new(4, 4))
            .build()
    }

    #[test]
    fn test_search_decides_for_agent() {
        let game = duel();
        let mut search = MctsSearch::new(MctsConfig::default().with_simulation_depth(3));

        let decision = search
            .search(&game, P0, &AgentState::new(), SearchBudget::iterations(20))
            .unwrap();

        let action = decision.action.unwrap();
        assert_eq!(action.unit(), Some(crate::core::UnitId(1)));
        assert_eq!(decision.stats.iterations, 20);
        assert_eq!(decision.tree.root_visits, 20);
    }

    #[test]
    fn test_root_children_get_distinct_agent_actions() {
        let game = duel();
        let mut search = MctsSearch::new(MctsConfig::default().with_simulation_depth(2));
        let tree = search
            .build_tree(&game, P0, &AgentState::new(), SearchBudget::iterations(30))
            .unwrap();

        // Player 0 has two macro-actions here: explore and attack.
        let mut labels: Vec<_> = tree
            .child_actions(tree.root(), P0)
            .into_iter()
            .filter_map(|(_, a)| a)
            .collect();
        let before = labels.len();
        labels.sort_by_key(|a| format!("{a}"));
        labels.dedup();
        assert_eq!(labels.len(), before);
        assert!(before <= 2);
    }

    #[test]
    fn test_same_seed_same_decision() {
        let game = duel();
        let run = || {
            MctsSearch::new(MctsConfig::default().with_seed(9).with_simulation_depth(4))
                .search(&game, P0, &AgentState::new(), SearchBudget::iterations(25))
                .unwrap()
                .action
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_terminal_rollout_uses_utility() {
        let game = SkirmishBuilder::new(3, 3)
            .unit(P0, INFANTRY, Position::new(0, 0))
            .build();
        let mut search = MctsSearch::new(MctsConfig::default());
        let winners = search.simulate(&game, &mut AgentState::new(), &SearchBudget::iterations(1));

        assert_eq!(winners.as_slice(), &[true, false]);
    }

    #[test]
    fn test_node_limit_stops_growth() {
        let game = duel();
        let mut search = MctsSearch::new(MctsConfig::default().with_max_nodes(3).with_simulation_depth(1));
        let tree = search
            .build_tree(&game, P0, &AgentState::new(), SearchBudget::iterations(10))
            .unwrap();

        assert!(tree.len() <= 3);
        assert_eq!(tree.root_node().visits, 10);
    }

    #[test]
    fn test_fallback_without_children() {
        let game = duel();
        let mut search = MctsSearch::new(MctsConfig::default());
        let decision = search
            .search(&game, P0, &AgentState::new(), SearchBudget::iterations(0))
            .unwrap();

        assert!(decision.fallback);
        assert!(decision.action.is_some());

        let mut strict = MctsSearch::new(MctsConfig::default()).with_random_fallback(false);
        let decision = strict
            .search(&game, P0, &AgentState::new(), SearchBudget::iterations(0))
            .unwrap();
        assert_eq!(decision.action, None);
        assert!(!decision.fallback);
    }
}

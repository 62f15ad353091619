//! MCTS integration tests using the skirmish game.

use proptest::prelude::*;
use rts_macro_mcts::command::AgentState;
use rts_macro_mcts::core::{PlayerId, PlayerMap, Position, UnitId};
use rts_macro_mcts::games::skirmish::{SkirmishBuilder, SkirmishGame, CAVALRY, INFANTRY, SCOUT};
use rts_macro_mcts::macros::MacroAction;
use rts_macro_mcts::mcts::{uct, GameTree, MctsConfig, MctsSearch, NodeId, SearchBudget};

const P0: PlayerId = PlayerId::new(0);
const P1: PlayerId = PlayerId::new(1);

fn skirmish() -> SkirmishGame {
    SkirmishBuilder::new(8, 8)
        .unit(P0, INFANTRY, Position::new(0, 0))
        .unit(P0, SCOUT, Position::new(1, 0))
        .city(P0, Position::new(0, 1))
        .unit(P1, CAVALRY, Position::new(7, 7))
        .city(P1, Position::new(7, 6))
        .build()
}

fn config() -> MctsConfig {
    MctsConfig::default().with_simulation_depth(4)
}

// =============================================================================
// Basic Search Tests
// =============================================================================

#[test]
fn test_search_returns_action_for_agent() {
    let game = skirmish();
    let mut search = MctsSearch::new(config());

    let decision = search
        .search(&game, P0, &AgentState::new(), SearchBudget::iterations(60))
        .unwrap();

    let action = decision.action.expect("search should decide");
    let mine = action.unit().map_or(true, |u| u.raw() <= 2);
    assert!(mine, "decided {action} for another player");
    assert_eq!(decision.stats.iterations, 60);
    assert_eq!(decision.tree.root_visits, 60);
}

#[test]
fn test_search_for_second_player() {
    let game = skirmish();
    let mut search = MctsSearch::new(config());

    let decision = search
        .search(&game, P1, &AgentState::new(), SearchBudget::iterations(40))
        .unwrap();

    match decision.action.unwrap() {
        MacroAction::Build { city, .. } => assert_eq!(city, Position::new(7, 6)),
        other => assert_eq!(other.unit().map(|u| u.raw()), Some(3)),
    }
}

#[test]
fn test_deadline_budget_stops() {
    let game = skirmish();
    let mut search = MctsSearch::new(config());

    let decision = search
        .search(
            &game,
            P0,
            &AgentState::new(),
            SearchBudget::for_duration(std::time::Duration::from_millis(30)),
        )
        .unwrap();

    assert!(decision.stats.iterations > 0);
    assert!(decision.action.is_some());
}

#[test]
fn test_exploration_under_fog() {
    let game = SkirmishBuilder::new(8, 8)
        .unit(P0, INFANTRY, Position::new(0, 0))
        .unit(P1, INFANTRY, Position::new(7, 7))
        .fog(P0, 2)
        .build();
    let explore = MacroAction::Explore { unit: UnitId(1) };

    let mut search = MctsSearch::new(config());
    let decision = search
        .search(&game, P0, &AgentState::new(), SearchBudget::iterations(20))
        .unwrap();
    assert_eq!(decision.action, Some(explore));
    assert!(!decision.fallback);

    // A determinized root has no frontier left, so exploring is never
    // decided from the tree.
    let mut search = MctsSearch::new(config().with_determinize(true));
    let decision = search
        .search(&game, P0, &AgentState::new(), SearchBudget::iterations(20))
        .unwrap();
    let action = decision.action.unwrap();
    assert_eq!(action.unit(), Some(UnitId(1)));
    if !decision.fallback {
        assert_ne!(action, explore);
    }
}

// =============================================================================
// Determinism Tests
// =============================================================================

#[test]
fn test_search_deterministic_with_seed() {
    let game = skirmish();
    let decide = || {
        let mut search = MctsSearch::new(config().with_seed(12345));
        search
            .search(&game, P0, &AgentState::new(), SearchBudget::iterations(50))
            .unwrap()
    };

    let (a, b) = (decide(), decide());
    assert_eq!(a.action, b.action);
    assert_eq!(a.tree, b.tree);
}

// =============================================================================
// Tree Shape Tests
// =============================================================================

#[test]
fn test_tree_visits_are_consistent() {
    let game = skirmish();
    let mut search = MctsSearch::new(config());
    let tree = search
        .build_tree(&game, P0, &AgentState::new(), SearchBudget::iterations(80))
        .unwrap();

    assert_eq!(tree.root_node().visits, 80);
    for (id, node) in tree.iter() {
        let child_visits: u32 = node.children.iter().map(|&c| tree.get(c).visits).sum();
        assert!(node.visits >= child_visits, "node {id} has fewer visits than its children");
        for &child in &node.children {
            assert_eq!(tree.get(child).parent, Some(id));
            assert_eq!(tree.get(child).depth, node.depth + 1);
        }
    }
}

#[test]
fn test_node_budget_caps_tree() {
    let game = skirmish();
    let mut search = MctsSearch::new(config().with_max_nodes(5));
    let tree = search
        .build_tree(&game, P0, &AgentState::new(), SearchBudget::iterations(50))
        .unwrap();

    assert!(tree.len() <= 5);
    assert_eq!(tree.root_node().visits, 50);
}

#[test]
fn test_fallback_without_iterations() {
    let game = skirmish();

    let mut search = MctsSearch::new(config());
    let decision = search
        .search(&game, P0, &AgentState::new(), SearchBudget::iterations(0))
        .unwrap();
    assert!(decision.fallback);
    assert!(decision.action.is_some());

    let mut strict = MctsSearch::new(config()).with_random_fallback(false);
    let decision = strict
        .search(&game, P0, &AgentState::new(), SearchBudget::iterations(0))
        .unwrap();
    assert_eq!(decision.action, None);
    assert!(!decision.fallback);
}

#[test]
fn test_no_units_no_decision() {
    let game = SkirmishBuilder::new(4, 4)
        .unit(P1, INFANTRY, Position::new(3, 3))
        .build();
    let mut search = MctsSearch::new(config());

    let decision = search
        .search(&game, P0, &AgentState::new(), SearchBudget::iterations(10))
        .unwrap();
    assert_eq!(decision.action, None);
}

// =============================================================================
// Properties
// =============================================================================

/// Random tree: node `i + 1` hangs under `parents[i] % (i + 1)`.
fn random_tree(parents: &[usize]) -> (GameTree<()>, Vec<usize>) {
    let mut tree = GameTree::new((), 2);
    let mut parent_of = vec![0];
    for (i, &p) in parents.iter().enumerate() {
        let parent = p % (i + 1);
        tree.add_child(NodeId::new(parent as u32), (), PlayerMap::with_value(2, None))
            .unwrap();
        parent_of.push(parent);
    }
    (tree, parent_of)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every node on a propagated path gains one visit per propagation and
    /// one win per propagation that flagged the player.
    #[test]
    fn prop_backprop_counts(
        parents in proptest::collection::vec(any::<usize>(), 0..20),
        runs in proptest::collection::vec((any::<usize>(), any::<bool>(), any::<bool>()), 0..40),
    ) {
        let (mut tree, parent_of) = random_tree(&parents);
        let n = tree.len();
        let mut visits = vec![0u32; n];
        let mut wins = vec![[0u32; 2]; n];

        for &(from, w0, w1) in &runs {
            let from = from % n;
            tree.backpropagate(NodeId::new(from as u32), &PlayerMap::from_vec(vec![w0, w1]));

            let mut current = from;
            loop {
                visits[current] += 1;
                wins[current][0] += u32::from(w0);
                wins[current][1] += u32::from(w1);
                if current == 0 {
                    break;
                }
                current = parent_of[current];
            }
        }

        for i in 0..n {
            let node = tree.get(NodeId::new(i as u32));
            prop_assert_eq!(node.visits, visits[i]);
            prop_assert_eq!(node.wins[P0], wins[i][0]);
            prop_assert_eq!(node.wins[P1], wins[i][1]);
        }
    }

    /// More wins never lower the score at fixed visits.
    #[test]
    fn prop_uct_monotone_in_wins(
        visits in 1u32..1000,
        a in 0u32..1000,
        b in 0u32..1000,
        parent in 1u32..10_000,
        c in 0.0f64..3.0,
    ) {
        let (lo, hi) = (a.min(b).min(visits), a.max(b).min(visits));
        prop_assert!(uct(lo, visits, Some(parent), c) <= uct(hi, visits, Some(parent), c));
    }

    /// At a fixed win ratio and parent count, more visits never raise the
    /// score.
    #[test]
    fn prop_uct_antitone_in_visits(
        ratio_wins in 0u32..10,
        ratio_extra in 1u32..10,
        m1 in 1u32..50,
        m2 in 1u32..50,
        parent in 1u32..10_000,
        c in 0.0f64..3.0,
    ) {
        let den = ratio_wins + ratio_extra;
        let (small, large) = (m1.min(m2), m1.max(m2));
        let few = uct(ratio_wins * small, den * small, Some(parent), c);
        let many = uct(ratio_wins * large, den * large, Some(parent), c);
        prop_assert!(few >= many);
    }
}

//! Scoring and comparison rules used by the search.
//!
//! - `uct`: selection score
//! - `selection_cmp`: UCT, then the game's heuristic
//! - `move_cmp`: visits, then wins, then the game's heuristic
//! - `determine_winners`: rollout outcome on a snapshot
//!
//! Comparators are plain functions returning `Ordering`; `first_max` picks
//! the first of equally good candidates.

use std::cmp::Ordering;

use crate::core::{PlayerId, PlayerMap};
use crate::engine::Snapshot;

use super::node::{GameStateNode, NodeId};
use super::tree::GameTree;

/// UCT score: `w/n + c * sqrt(ln N / n)`.
///
/// `n` is clamped to at least 1. At the root there is no parent, so
/// `parent_visits` is `None` and `N = n`.
#[must_use]
pub fn uct(wins: u32, visits: u32, parent_visits: Option<u32>, exploration: f64) -> f64 {
    let n = f64::from(visits.max(1));
    let parent = parent_visits.map_or(n, |p| f64::from(p.max(1)));
    f64::from(wins) / n + exploration * (parent.ln() / n).sqrt()
}

fn heuristic_of<S: Snapshot>(node: &GameStateNode<S>, player: PlayerId) -> f64 {
    node.snapshot.heuristic_values()[player]
}

/// Order two children for selection: UCT for `player`, then heuristic.
pub fn selection_cmp<S: Snapshot>(
    tree: &GameTree<S>,
    a: NodeId,
    b: NodeId,
    player: PlayerId,
    exploration: f64,
) -> Ordering {
    let score = |id: NodeId| {
        let node = tree.get(id);
        let parent_visits = node.parent.map(|p| tree.get(p).visits);
        uct(node.wins[player], node.visits, parent_visits, exploration)
    };
    score(a)
        .total_cmp(&score(b))
        .then_with(|| heuristic_of(tree.get(a), player).total_cmp(&heuristic_of(tree.get(b), player)))
}

/// Order two root children for the final decision: visits, wins for
/// `player`, then heuristic.
pub fn move_cmp<S: Snapshot>(tree: &GameTree<S>, a: NodeId, b: NodeId, player: PlayerId) -> Ordering {
    let (na, nb) = (tree.get(a), tree.get(b));
    na.visits
        .cmp(&nb.visits)
        .then_with(|| na.wins[player].cmp(&nb.wins[player]))
        .then_with(|| heuristic_of(na, player).total_cmp(&heuristic_of(nb, player)))
}

/// First maximum of `items` under `cmp`; later items must be strictly
/// greater to win.
pub fn first_max<T: Copy>(items: &[T], mut cmp: impl FnMut(T, T) -> Ordering) -> Option<T> {
    let mut iter = items.iter().copied();
    let mut best = iter.next()?;
    for item in iter {
        if cmp(item, best) == Ordering::Greater {
            best = item;
        }
    }
    Some(best)
}

/// Rollout outcome on `snapshot`.
///
/// A finished game is won by every player with utility 1.0. Otherwise the
/// single player with the highest heuristic wins, the lowest index taking
/// ties.
#[must_use]
pub fn determine_winners<S: Snapshot>(snapshot: &S) -> PlayerMap<bool> {
    let player_count = snapshot.player_count();
    if snapshot.is_game_over() {
        let utility = snapshot.utility_values();
        return PlayerMap::new(player_count, |p| utility[p] == 1.0);
    }

    let heuristic = snapshot.heuristic_values();
    let mut best = PlayerId::new(0);
    for (player, value) in heuristic.iter() {
        if *value > heuristic[best] {
            best = player;
        }
    }
    PlayerMap::new(player_count, |p| p == best)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uct_root_uses_own_visits() {
        // ln(4)/4 under the root rule.
        let expected = 0.5 + std::f64::consts::SQRT_2 * (4f64.ln() / 4.0).sqrt();
        assert!((uct(2, 4, None, std::f64::consts::SQRT_2) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_uct_unvisited_is_finite() {
        let score = uct(0, 0, Some(10), 1.0);
        assert!(score.is_finite());
        assert!((score - 10f64.ln().sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_uct_exploration_term() {
        assert!(uct(1, 2, Some(100), 1.4) > uct(1, 2, Some(10), 1.4));
        assert_eq!(uct(1, 2, Some(10), 0.0), 0.5);
    }

    #[test]
    fn test_first_max_keeps_first_tie() {
        let items = [(0, 3), (1, 5), (2, 5), (3, 1)];
        assert_eq!(first_max(&items, |a, b| a.1.cmp(&b.1)), Some((1, 5)));
        assert_eq!(first_max::<(i32, i32)>(&[], |a, b| a.1.cmp(&b.1)), None);
    }
}

//! A* over the 4-connected grid.
//!
//! Costs are unit steps and the heuristic is Manhattan distance, which is
//! admissible on a 4-connected grid, so returned paths are shortest.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

use crate::core::{PlayerId, Position};
use crate::engine::Snapshot;

#[derive(Debug)]
struct OpenNode {
    f: u32,
    g: u32,
    pos: Position,
    tie: u64,
}

impl OpenNode {
    fn key(&self) -> (u32, u32, Position, u64) {
        (self.f, self.g, self.pos, self.tie)
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap pops the lowest f first.
        other.key().cmp(&self.key())
    }
}

/// Shortest route from `start` to `goal` for `player`, excluding `start`.
///
/// Every cell on the route is inside the map, known and movement-possible
/// for `player`. The start cell itself is not checked (the unit already
/// stands there). Returns `Some(vec![])` when `start == goal` and `None`
/// when the goal is unreachable. A board query that fails for one cell only
/// drops that neighbour.
pub fn find_path<S: Snapshot>(
    snapshot: &S,
    start: Position,
    goal: Position,
    player: PlayerId,
) -> Option<Vec<Position>> {
    if start == goal {
        return Some(Vec::new());
    }
    if !passable(snapshot, goal, player) {
        return None;
    }

    let mut open = BinaryHeap::new();
    let mut g_score: FxHashMap<Position, u32> = FxHashMap::default();
    let mut came_from: FxHashMap<Position, Position> = FxHashMap::default();
    let mut tie: u64 = 0;

    g_score.insert(start, 0);
    open.push(OpenNode {
        f: start.manhattan(goal),
        g: 0,
        pos: start,
        tie,
    });
    tie += 1;

    while let Some(node) = open.pop() {
        if node.pos == goal {
            return Some(reconstruct(&came_from, start, goal));
        }
        if g_score.get(&node.pos).is_some_and(|&g| node.g > g) {
            // Stale heap entry.
            continue;
        }

        for next in node.pos.neighbours() {
            if !passable(snapshot, next, player) {
                continue;
            }

            let tentative = node.g.saturating_add(1);
            if g_score.get(&next).is_some_and(|&g| tentative >= g) {
                continue;
            }
            came_from.insert(next, node.pos);
            g_score.insert(next, tentative);
            open.push(OpenNode {
                f: tentative.saturating_add(next.manhattan(goal)),
                g: tentative,
                pos: next,
                tie,
            });
            tie += 1;
        }
    }

    None
}

/// Known and open to `player`. Off-map cells are simply not passable.
fn passable<S: Snapshot>(snapshot: &S, pos: Position, player: PlayerId) -> bool {
    matches!(snapshot.is_known(pos), Ok(true))
        && matches!(snapshot.is_movement_possible(pos, player), Ok(true))
}

fn reconstruct(
    came_from: &FxHashMap<Position, Position>,
    start: Position,
    goal: Position,
) -> Vec<Position> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        if prev == start {
            break;
        }
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

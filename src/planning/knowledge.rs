//! What the agent knows about the map.
//!
//! The knowledge set comes from a flood fill over known cells starting at
//! one of the player's units; the cells it keeps are the occupiable ones.
//! It feeds exploration (cells on its edge border unknown terrain) and
//! determinization.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::core::{KnowledgeError, PlayerId, Position};
use crate::engine::Snapshot;

use super::pathfinding::find_path;

/// Flood fill from `player`'s first unit.
pub fn known_positions<S: Snapshot>(
    snapshot: &S,
    player: PlayerId,
) -> Result<FxHashSet<Position>, KnowledgeError> {
    let origin = snapshot
        .units_of(player)
        .first()
        .map(|u| u.position)
        .ok_or(KnowledgeError::NoOrigin)?;
    known_positions_from(snapshot, origin, player)
}

/// Flood fill from `origin` over 4-connected known cells inside the map.
///
/// Unknown cells stop the fill. Known cells `player` cannot occupy (walls,
/// enemy units) are crossed but left out of the result, as is the origin
/// when it is not occupiable.
pub fn known_positions_from<S: Snapshot>(
    snapshot: &S,
    origin: Position,
    player: PlayerId,
) -> Result<FxHashSet<Position>, KnowledgeError> {
    let occupiable = |pos: Position| {
        matches!(snapshot.is_known(pos), Ok(true))
            && matches!(snapshot.is_movement_possible(pos, player), Ok(true))
    };

    let mut valid = FxHashSet::default();
    let mut seen = FxHashSet::default();
    let mut queue = VecDeque::new();
    seen.insert(origin);
    queue.push_back(origin);

    while let Some(pos) = queue.pop_front() {
        if occupiable(pos) {
            valid.insert(pos);
        }
        for next in pos.neighbours() {
            if matches!(snapshot.is_known(next), Ok(true)) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }

    if valid.is_empty() {
        Err(KnowledgeError::Empty)
    } else {
        Ok(valid)
    }
}

/// Nearest reachable known cell bordering unknown terrain, as seen from
/// `from`.
///
/// Distance is Euclidean; equal distances keep the lowest position.
pub fn exploration_target<S: Snapshot>(
    snapshot: &S,
    from: Position,
    player: PlayerId,
) -> Result<Position, KnowledgeError> {
    let known = known_positions_from(snapshot, from, player)?;

    let mut frontier: Vec<Position> = known
        .into_iter()
        .filter(|&pos| pos != from)
        .filter(|pos| {
            pos.neighbours()
                .into_iter()
                .any(|n| matches!(snapshot.is_known(n), Ok(false)))
        })
        .collect();
    // The fill crosses walls, so the nearest frontier cell may be cut off.
    frontier.sort_by(|a, b| {
        from.euclidean(*a)
            .total_cmp(&from.euclidean(*b))
            .then_with(|| a.cmp(b))
    });
    frontier
        .into_iter()
        .find(|&pos| find_path(snapshot, from, pos, player).is_some())
        .ok_or(KnowledgeError::NoFrontier)
}

/// Copy of `snapshot` with unknown terrain replaced by a guess built from
/// `player`'s knowledge set.
pub fn determinized_copy<S: Snapshot>(snapshot: &S, player: PlayerId) -> S {
    let mut copy = snapshot.copy();
    let known = known_positions(snapshot, player).unwrap_or_default();
    copy.determinize(&known);
    copy
}

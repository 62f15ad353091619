//! Turn macro-actions into primitive sequences.
//!
//! Resolution only reads the snapshot and the production map. Putting the
//! result into a queue is the command module's job.

use std::collections::VecDeque;

use crate::command::ProductionMap;
use crate::core::{PlayerId, Position, PrimitiveAction, ResolveError, UnitId};
use crate::engine::{Snapshot, UnitView};
use crate::planning::{exploration_target, find_path};

use super::macro_action::MacroAction;

/// Ordered primitive steps a macro-action resolved to.
///
/// An empty sequence means the action is already in effect (a city already
/// producing the requested type).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub action: MacroAction,
    pub steps: VecDeque<PrimitiveAction>,
}

impl Resolution {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Resolve `action` for `player` against `snapshot`.
pub fn resolve<S: Snapshot>(
    action: MacroAction,
    snapshot: &S,
    player: PlayerId,
    production: &ProductionMap,
) -> Result<Resolution, ResolveError> {
    let steps = match action {
        MacroAction::Move { unit, destination, .. } => {
            let unit = own_unit(snapshot, unit, player)?;
            move_steps(snapshot, &unit, destination, player)?
        }
        MacroAction::Attack { unit, target, .. } => {
            let unit = own_unit(snapshot, unit, player)?;
            attack_steps(snapshot, &unit, target, player)?
        }
        MacroAction::Build { city, unit_type } => {
            if !snapshot.cities_of(player).iter().any(|c| c.position == city) {
                return Err(ResolveError::UnknownCity(city));
            }
            if !snapshot.producible_types(city).contains(&unit_type) {
                return Err(ResolveError::NotProducible { city, unit_type });
            }
            if production.is_producing(city, unit_type) {
                VecDeque::new()
            } else {
                VecDeque::from([PrimitiveAction::Produce { city, unit_type }])
            }
        }
        MacroAction::Explore { unit } => {
            let unit = own_unit(snapshot, unit, player)?;
            let target = exploration_target(snapshot, unit.position, player)?;
            move_steps(snapshot, &unit, target, player)?
        }
    };
    Ok(Resolution { action, steps })
}

fn own_unit<S: Snapshot>(snapshot: &S, id: UnitId, player: PlayerId) -> Result<UnitView, ResolveError> {
    snapshot
        .unit(id)
        .filter(|u| u.owner == player)
        .ok_or(ResolveError::UnknownUnit(id))
}

fn move_steps<S: Snapshot>(
    snapshot: &S,
    unit: &UnitView,
    destination: Position,
    player: PlayerId,
) -> Result<VecDeque<PrimitiveAction>, ResolveError> {
    if unit.position == destination {
        return Err(ResolveError::EmptyPath { unit: unit.id, at: destination });
    }
    let path = find_path(snapshot, unit.position, destination, player).ok_or(
        ResolveError::PathNotFound {
            from: unit.position,
            to: destination,
        },
    )?;
    Ok(path
        .into_iter()
        .map(|to| PrimitiveAction::Move { unit: unit.id, to })
        .collect())
}

fn attack_steps<S: Snapshot>(
    snapshot: &S,
    unit: &UnitView,
    target: UnitId,
    player: PlayerId,
) -> Result<VecDeque<PrimitiveAction>, ResolveError> {
    let target_pos = snapshot
        .unit(target)
        .filter(|t| t.owner != player)
        .map(|t| t.position)
        .ok_or(ResolveError::UnknownUnit(target))?;

    // Candidate tiles in neighbour order; the stable sort keeps that order
    // among equal distances.
    let mut candidates: Vec<(Position, f64)> = target_pos
        .all_neighbours()
        .into_iter()
        .filter(|&pos| {
            matches!(snapshot.is_known(pos), Ok(true))
                && matches!(snapshot.is_movement_possible(pos, player), Ok(true))
        })
        .map(|pos| (pos, unit.position.euclidean(pos)))
        .collect();
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

    for (tile, _) in candidates {
        if let Some(path) = find_path(snapshot, unit.position, tile, player) {
            let mut steps: VecDeque<PrimitiveAction> = path
                .into_iter()
                .map(|to| PrimitiveAction::Move { unit: unit.id, to })
                .collect();
            steps.push_back(PrimitiveAction::Attack {
                attacker: unit.id,
                target,
            });
            return Ok(steps);
        }
    }
    Err(ResolveError::NoAttackTile { target })
}

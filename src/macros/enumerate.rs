//! Legal macro-actions for a player.

use crate::command::AgentState;
use crate::core::{PlayerId, Position};
use crate::engine::Snapshot;

use super::macro_action::MacroAction;

/// Every macro-action `player` could start now.
///
/// Idle units may explore, attack any visible enemy, or regroup (forced
/// move) to their nearest own city when not standing on one. Cities may
/// build any producible type they are not already assigned. The order is
/// deterministic: units by id, then cities by position.
pub fn legal_macro_actions<S: Snapshot>(
    snapshot: &S,
    player: PlayerId,
    state: &AgentState,
) -> Vec<MacroAction> {
    let cities = snapshot.cities_of(player);
    let enemies = snapshot.visible_enemy_units(player);
    let mut actions = Vec::new();

    for unit in snapshot.units_of(player) {
        if !state.is_idle(unit.id) {
            continue;
        }
        actions.push(MacroAction::Explore { unit: unit.id });
        actions.extend(enemies.iter().map(|enemy| MacroAction::Attack {
            unit: unit.id,
            target: enemy.id,
            force: false,
        }));
        if let Some(home) = nearest(unit.position, cities.iter().map(|c| c.position)) {
            if home != unit.position {
                actions.push(MacroAction::Move {
                    unit: unit.id,
                    destination: home,
                    force: true,
                });
            }
        }
    }

    for city in &cities {
        for unit_type in snapshot.producible_types(city.position) {
            if !state.production.is_producing(city.position, unit_type) {
                actions.push(MacroAction::Build {
                    city: city.position,
                    unit_type,
                });
            }
        }
    }

    actions
}

fn nearest(from: Position, candidates: impl Iterator<Item = Position>) -> Option<Position> {
    let mut best: Option<(Position, f64)> = None;
    for pos in candidates {
        let distance = from.euclidean(pos);
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((pos, distance));
        }
    }
    best.map(|(pos, _)| pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::enqueue;
    use crate::core::UnitId;
    use crate::games::skirmish::{SkirmishBuilder, CAVALRY, INFANTRY, SCOUT};

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    #[test]
    fn test_enumeration_order_and_content() {
        let game = SkirmishBuilder::new(5, 5)
            .unit(P0, INFANTRY, Position::new(1, 1))
            .unit(P1, INFANTRY, Position::new(4, 4))
            .city(P0, Position::new(0, 0))
            .build();
        let actions = legal_macro_actions(&game, P0, &AgentState::new());

        assert_eq!(
            actions,
            vec![
                MacroAction::Explore { unit: UnitId(1) },
                MacroAction::Attack { unit: UnitId(1), target: UnitId(2), force: false },
                MacroAction::Move { unit: UnitId(1), destination: Position::new(0, 0), force: true },
                MacroAction::Build { city: Position::new(0, 0), unit_type: INFANTRY },
                MacroAction::Build { city: Position::new(0, 0), unit_type: SCOUT },
                MacroAction::Build { city: Position::new(0, 0), unit_type: CAVALRY },
            ]
        );
    }

    #[test]
    fn test_committed_units_and_assigned_cities_are_skipped() {
        let game = SkirmishBuilder::new(5, 5)
            .unit(P0, INFANTRY, Position::new(0, 0))
            .unit(P1, INFANTRY, Position::new(4, 4))
            .city(P0, Position::new(0, 0))
            .build();
        let mut state = AgentState::new();
        enqueue(&mut state, MacroAction::Attack { unit: UnitId(1), target: UnitId(2), force: false }, &game, P0).unwrap();
        enqueue(&mut state, MacroAction::Build { city: Position::new(0, 0), unit_type: SCOUT }, &game, P0).unwrap();

        let actions = legal_macro_actions(&game, P0, &state);
        assert_eq!(
            actions,
            vec![
                MacroAction::Build { city: Position::new(0, 0), unit_type: INFANTRY },
                MacroAction::Build { city: Position::new(0, 0), unit_type: CAVALRY },
            ]
        );
    }
}

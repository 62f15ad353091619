//! Primitive actions: the atomic orders sent to the game engine.
//!
//! A macro-action resolves into an ordered sequence of these. Each one
//! references exactly one unit or one city, which is how rejection
//! notifications are routed back to shadow state.

use serde::{Deserialize, Serialize};

use super::ids::{UnitId, UnitTypeId};
use super::position::Position;

/// A single order understood by the game engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveAction {
    /// Move `unit` one step onto the orthogonally adjacent cell `to`.
    Move { unit: UnitId, to: Position },
    /// `attacker` strikes `target`, which must be in contact range.
    Attack { attacker: UnitId, target: UnitId },
    /// Switch the city at `city` to producing `unit_type`.
    Produce { city: Position, unit_type: UnitTypeId },
}

impl PrimitiveAction {
    /// The unit this action orders, if any.
    #[must_use]
    pub fn unit(&self) -> Option<UnitId> {
        match *self {
            PrimitiveAction::Move { unit, .. } => Some(unit),
            PrimitiveAction::Attack { attacker, .. } => Some(attacker),
            PrimitiveAction::Produce { .. } => None,
        }
    }

    /// The city this action orders, if any.
    #[must_use]
    pub fn city(&self) -> Option<Position> {
        match *self {
            PrimitiveAction::Produce { city, .. } => Some(city),
            _ => None,
        }
    }

    /// Destination cell of a move step.
    #[must_use]
    pub fn destination(&self) -> Option<Position> {
        match *self {
            PrimitiveAction::Move { to, .. } => Some(to),
            _ => None,
        }
    }
}

impl std::fmt::Display for PrimitiveAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimitiveAction::Move { unit, to } => write!(f, "{unit} moves to {to}"),
            PrimitiveAction::Attack { attacker, target } => write!(f, "{attacker} attacks {target}"),
            PrimitiveAction::Produce { city, unit_type } => {
                write!(f, "city {city} produces {unit_type}")
            }
        }
    }
}

/// A primitive action stamped with the wall-clock time it is sent at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedAction {
    pub action: PrimitiveAction,
    /// Milliseconds since the Unix epoch.
    pub send_time_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_accessors() {
        let mv = PrimitiveAction::Move { unit: UnitId(4), to: Position::new(1, 2) };
        assert_eq!(mv.unit(), Some(UnitId(4)));
        assert_eq!(mv.city(), None);
        assert_eq!(mv.destination(), Some(Position::new(1, 2)));

        let attack = PrimitiveAction::Attack { attacker: UnitId(1), target: UnitId(9) };
        assert_eq!(attack.unit(), Some(UnitId(1)));
        assert_eq!(attack.destination(), None);

        let produce = PrimitiveAction::Produce {
            city: Position::new(2, 2),
            unit_type: UnitTypeId(3),
        };
        assert_eq!(produce.unit(), None);
        assert_eq!(produce.city(), Some(Position::new(2, 2)));
    }
}

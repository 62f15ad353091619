//! Macro-action definitions.

use serde::{Deserialize, Serialize};

use crate::core::{Position, UnitId, UnitTypeId};

/// Coarse player intent that resolves into a primitive sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MacroAction {
    /// Walk `unit` to `destination`.
    Move {
        unit: UnitId,
        destination: Position,
        /// Replace the unit's current command instead of queueing behind it.
        force: bool,
    },
    /// Walk next to `target` and hit it.
    Attack {
        unit: UnitId,
        target: UnitId,
        force: bool,
    },
    /// Start producing `unit_type` in the city at `city`.
    Build { city: Position, unit_type: UnitTypeId },
    /// Walk `unit` to the nearest cell bordering unknown terrain.
    Explore { unit: UnitId },
}

/// Discriminant of a `MacroAction`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MacroActionKind {
    Move,
    Attack,
    Build,
    Explore,
}

impl MacroAction {
    #[must_use]
    pub fn kind(&self) -> MacroActionKind {
        match self {
            MacroAction::Move { .. } => MacroActionKind::Move,
            MacroAction::Attack { .. } => MacroActionKind::Attack,
            MacroAction::Build { .. } => MacroActionKind::Build,
            MacroAction::Explore { .. } => MacroActionKind::Explore,
        }
    }

    /// Unit the action commands, if it is a unit action.
    #[must_use]
    pub fn unit(&self) -> Option<UnitId> {
        match *self {
            MacroAction::Move { unit, .. }
            | MacroAction::Attack { unit, .. }
            | MacroAction::Explore { unit } => Some(unit),
            MacroAction::Build { .. } => None,
        }
    }

    /// City the action commands, if it is a city action.
    #[must_use]
    pub fn city(&self) -> Option<Position> {
        match *self {
            MacroAction::Build { city, .. } => Some(city),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_forced(&self) -> bool {
        match *self {
            MacroAction::Move { force, .. } | MacroAction::Attack { force, .. } => force,
            MacroAction::Build { .. } | MacroAction::Explore { .. } => false,
        }
    }
}

impl std::fmt::Display for MacroAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bang = if self.is_forced() { "!" } else { "" };
        match self {
            MacroAction::Move { unit, destination, .. } => {
                write!(f, "Move{bang}({unit} -> {destination})")
            }
            MacroAction::Attack { unit, target, .. } => write!(f, "Attack{bang}({unit} -> {target})"),
            MacroAction::Build { city, unit_type } => write!(f, "Build({city}: {unit_type})"),
            MacroAction::Explore { unit } => write!(f, "Explore({unit})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let attack = MacroAction::Attack { unit: UnitId(1), target: UnitId(9), force: true };
        let build = MacroAction::Build { city: Position::new(2, 2), unit_type: UnitTypeId(3) };

        assert_eq!(attack.kind(), MacroActionKind::Attack);
        assert_eq!(attack.unit(), Some(UnitId(1)));
        assert_eq!(attack.city(), None);
        assert!(attack.is_forced());

        assert_eq!(build.unit(), None);
        assert_eq!(build.city(), Some(Position::new(2, 2)));
        assert!(!build.is_forced());
    }

    #[test]
    fn test_display() {
        let mv = MacroAction::Move { unit: UnitId(4), destination: Position::new(1, 2), force: false };
        assert_eq!(mv.to_string(), "Move(Unit(4) -> (1, 2))");
        assert_eq!(MacroAction::Explore { unit: UnitId(4) }.to_string(), "Explore(Unit(4))");
    }
}

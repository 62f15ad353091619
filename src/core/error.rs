//! Error taxonomy.
//!
//! Most of these are local and non-fatal: search skips whatever failed and
//! carries on. Only `AgentError` stops the decision loop.

use super::action::PrimitiveAction;
use super::ids::{UnitId, UnitTypeId};
use super::position::Position;

/// Board query on a cell that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("position {0} is not on the map")]
    OutOfBounds(Position),
}

/// A scheduled primitive action turned out to be illegal when the engine
/// advanced time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("action failed: {action} ({reason})")]
pub struct ActionFailed {
    pub action: PrimitiveAction,
    pub reason: String,
}

impl ActionFailed {
    pub fn new(action: PrimitiveAction, reason: impl Into<String>) -> Self {
        Self {
            action,
            reason: reason.into(),
        }
    }
}

/// No legal primitive sequence exists for a macro-action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("{0} is not a known unit")]
    UnknownUnit(UnitId),
    #[error("no city of this player at {0}")]
    UnknownCity(Position),
    #[error("city {city} cannot produce {unit_type}")]
    NotProducible { city: Position, unit_type: UnitTypeId },
    #[error("no tile to attack {target} from")]
    NoAttackTile { target: UnitId },
    #[error("no path from {from} to {to}")]
    PathNotFound { from: Position, to: Position },
    #[error("{unit} is already at {at}")]
    EmptyPath { unit: UnitId, at: Position },
    #[error("no exploration target: {0}")]
    NoExplorationTarget(#[from] KnowledgeError),
}

/// The knowledge flood fill found nothing usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum KnowledgeError {
    #[error("player has no unit to start the flood fill from")]
    NoOrigin,
    #[error("no known occupiable position")]
    Empty,
    #[error("no reachable cell borders unknown terrain")]
    NoFrontier,
}

/// Transport failure reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("host connection closed")]
    Closed,
    #[error("failed to send {action}: {reason}")]
    Send { action: PrimitiveAction, reason: String },
}

/// Conditions that terminate the decision loop.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("search exhausted its node budget of {0}")]
    ResourceExhausted(usize),
}

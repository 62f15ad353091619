//! Shadow state the agent keeps alongside the engine.
//!
//! The engine's view of a unit lags the agent's plan by a cycle or more, so
//! the agent tracks its own status per unit, the production it assigned per
//! city, and the queues of commands not yet sent. The real state and the
//! search's simulated state are two instances of `AgentState`.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{Position, UnitId, UnitTypeId};

use super::command::Command;

/// Shadow status of one unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitStatus {
    /// Free to receive a new macro-action.
    #[default]
    Idle,
    /// Working through a command.
    Committed,
}

/// City to unit type the agent last ordered it to build.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductionMap {
    assigned: FxHashMap<Position, UnitTypeId>,
}

impl ProductionMap {
    #[must_use]
    pub fn get(&self, city: Position) -> Option<UnitTypeId> {
        self.assigned.get(&city).copied()
    }

    #[must_use]
    pub fn is_producing(&self, city: Position, unit_type: UnitTypeId) -> bool {
        self.get(city) == Some(unit_type)
    }

    pub fn assign(&mut self, city: Position, unit_type: UnitTypeId) -> Option<UnitTypeId> {
        self.assigned.insert(city, unit_type)
    }

    /// Forget the assignment. Returns whether there was one.
    pub fn clear(&mut self, city: Position) -> bool {
        self.assigned.remove(&city).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

/// Per-unit and per-city FIFO command queues.
///
/// Empty queues are removed, so "has a queue" means "has a pending
/// command".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandQueues {
    pub(crate) units: FxHashMap<UnitId, VecDeque<Command>>,
    pub(crate) cities: FxHashMap<Position, VecDeque<Command>>,
}

impl CommandQueues {
    #[must_use]
    pub fn unit_queue(&self, unit: UnitId) -> Option<&VecDeque<Command>> {
        self.units.get(&unit)
    }

    #[must_use]
    pub fn city_queue(&self, city: Position) -> Option<&VecDeque<Command>> {
        self.cities.get(&city)
    }

    #[must_use]
    pub fn has_unit_queue(&self, unit: UnitId) -> bool {
        self.units.get(&unit).is_some_and(|q| !q.is_empty())
    }

    /// Units with a pending command, sorted by id.
    #[must_use]
    pub fn queued_units(&self) -> Vec<UnitId> {
        let mut ids: Vec<UnitId> = self
            .units
            .iter()
            .filter(|(_, q)| !q.is_empty())
            .map(|(&id, _)| id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Cities with a pending command, sorted by position.
    #[must_use]
    pub fn queued_cities(&self) -> Vec<Position> {
        let mut cities: Vec<Position> = self
            .cities
            .iter()
            .filter(|(_, q)| !q.is_empty())
            .map(|(&pos, _)| pos)
            .collect();
        cities.sort_unstable();
        cities
    }

    /// Drop a unit's queue. Returns whether it had one.
    pub fn remove_unit(&mut self, unit: UnitId) -> bool {
        self.units.remove(&unit).is_some()
    }

    /// Total number of queued commands.
    #[must_use]
    pub fn command_count(&self) -> usize {
        self.units.values().chain(self.cities.values()).map(VecDeque::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.command_count() == 0
    }
}

/// Everything the agent tracks between cycles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AgentState {
    pub queues: CommandQueues,
    pub production: ProductionMap,
    status: FxHashMap<UnitId, UnitStatus>,
}

impl AgentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status of a unit; units never seen are idle.
    #[must_use]
    pub fn status(&self, unit: UnitId) -> UnitStatus {
        self.status.get(&unit).copied().unwrap_or_default()
    }

    /// Set a unit's status, returning the previous one.
    pub fn set_status(&mut self, unit: UnitId, status: UnitStatus) -> UnitStatus {
        self.status.insert(unit, status).unwrap_or_default()
    }

    /// Can the unit take a new macro-action?
    ///
    /// A unit is idle unless it is committed and still has a command queued.
    #[must_use]
    pub fn is_idle(&self, unit: UnitId) -> bool {
        self.status(unit) == UnitStatus::Idle || !self.queues.has_unit_queue(unit)
    }

    /// Forget everything about a unit. Returns whether anything was known.
    pub fn forget_unit(&mut self, unit: UnitId) -> bool {
        let had_status = self.status.remove(&unit).is_some();
        let had_queue = self.queues.remove_unit(unit);
        had_status || had_queue
    }
}

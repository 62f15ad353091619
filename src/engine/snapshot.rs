//! The `Snapshot` trait: the agent's view of the game-rule engine.
//!
//! A snapshot is the whole game at one instant as seen by the agent. It is
//! deep-copyable and advanceable, and it owns all rules knowledge: legality,
//! terrain, movement, combat, production and evaluation. The agent never
//! duplicates those rules; it only asks.
//!
//! ## Implementation Notes
//!
//! - `copy` must be independent: advancing the copy never affects the source.
//! - `advance` processes scheduled actions in time order, skips illegal
//!   ones and reports the first of them in `ActionFailed`. The clock still
//!   moves by the full delta, so the snapshot stays usable afterwards.
//! - Board queries return `MapError::OutOfBounds` for cells off the map.
//!   Unknown (fogged) cells are inside the map but not `is_known`.

use rustc_hash::FxHashSet;

use crate::core::{
    ActionFailed, MapError, PlayerId, PlayerMap, Position, PrimitiveAction, UnitId, UnitTypeId,
};

/// Read model of a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitView {
    pub id: UnitId,
    pub owner: PlayerId,
    pub position: Position,
    pub unit_type: UnitTypeId,
    pub hp: u32,
}

/// Read model of a city.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CityView {
    pub position: Position,
    pub owner: PlayerId,
    /// Unit type currently in production, if any.
    pub producing: Option<UnitTypeId>,
}

/// Deep-copyable, advanceable game state.
pub trait Snapshot: Sized {
    /// Independent deep copy.
    fn copy(&self) -> Self;

    /// Number of players in the game.
    fn player_count(&self) -> usize;

    /// In-game clock.
    fn game_time_ms(&self) -> u64;

    /// Has the game ended?
    fn is_game_over(&self) -> bool;

    /// Terminal utility per player, each in `[0, 1]`.
    fn utility_values(&self) -> PlayerMap<f64>;

    /// Heuristic score per player for non-terminal states.
    fn heuristic_values(&self) -> PlayerMap<f64>;

    /// Could `player` legally issue `action` right now?
    fn is_valid_action(&self, action: &PrimitiveAction, player: PlayerId) -> bool;

    /// Queue `action` to be executed for `player` at in-game time `at_ms`.
    fn schedule_action(&mut self, player: PlayerId, action: PrimitiveAction, at_ms: u64);

    /// Advance the in-game clock by `delta_ms`.
    fn advance(&mut self, delta_ms: u64) -> Result<(), ActionFailed>;

    // === Board ===

    /// Map extents as `(width, height)`.
    fn map_size(&self) -> (i32, i32);

    /// Is the cell on the map?
    fn is_inside(&self, pos: Position) -> bool {
        let (w, h) = self.map_size();
        pos.x >= 0 && pos.y >= 0 && pos.x < w && pos.y < h
    }

    /// Does the agent have terrain data for the cell?
    fn is_known(&self, pos: Position) -> Result<bool, MapError>;

    /// Could a unit of `player` stand on the cell?
    fn is_movement_possible(&self, pos: Position, player: PlayerId) -> Result<bool, MapError>;

    // === Units and cities ===

    /// Look up a unit visible to the agent.
    fn unit(&self, id: UnitId) -> Option<UnitView>;

    /// All units of `player`, ordered by id.
    fn units_of(&self, player: PlayerId) -> Vec<UnitView>;

    /// Units of other players standing on known cells, ordered by id.
    fn visible_enemy_units(&self, player: PlayerId) -> Vec<UnitView>;

    /// All cities of `player`, ordered by position.
    fn cities_of(&self, player: PlayerId) -> Vec<CityView>;

    /// Unit types the city at `city` can produce.
    fn producible_types(&self, city: Position) -> Vec<UnitTypeId>;

    /// Replace unknown terrain with a concrete guess so rollouts run on a
    /// fully specified map. `known` is the agent's knowledge set.
    ///
    /// Default is a no-op for engines without fog.
    fn determinize(&mut self, known: &FxHashSet<Position>) {
        let _ = known;
    }
}

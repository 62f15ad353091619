//! Skirmish: a small real-time grid game with fog of war.
//!
//! Two or more players own units and cities on a rectangular map.
//! Units move one orthogonal cell per order and attack anything within one
//! cell (diagonals included). Cities produce units on a timer. A player with
//! no units and no cities is out.
//!
//! Used by the test suites and as the reference `Snapshot` implementation.

mod game;
mod host;

pub use game::{
    unit_type_spec, SkirmishBuilder, SkirmishGame, Terrain, UnitTypeSpec, CAVALRY, INFANTRY, SCOUT,
};
pub use host::LocalHost;

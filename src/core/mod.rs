//! Core value types: positions, players, ids, primitive actions, RNG,
//! configuration and errors.
//!
//! Nothing in here knows about search or command queues.

pub mod action;
pub mod config;
pub mod error;
pub mod ids;
pub mod player;
pub mod position;
pub mod rng;

pub use action::{PrimitiveAction, TimedAction};
pub use config::AgentConfig;
pub use error::{ActionFailed, AgentError, HostError, KnowledgeError, MapError, ResolveError};
pub use ids::{UnitId, UnitTypeId};
pub use player::{PlayerId, PlayerMap};
pub use position::Position;
pub use rng::GameRng;

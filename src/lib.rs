//! # rts-macro-mcts
//!
//! A real-time strategy agent that plans with Monte Carlo Tree Search over
//! macro-actions.
//!
//! ## Design Principles
//!
//! 1. **Macro-Actions, Not Clicks**: Search branches over Move, Attack,
//!    Build and Explore. Each resolves into a queue of primitive steps.
//!
//! 2. **N-Player First**: Every edge carries one macro-action per player.
//!    Nothing assumes two players.
//!
//! 3. **Engine-Agnostic**: The game rules live behind the `Snapshot` trait
//!    and the transport behind `Host`.
//!
//! ## Architecture
//!
//! - **Fixed Decision Period**: One search per cycle, bounded by a
//!   wall-clock deadline, then a single sleep to keep the period constant.
//!
//! - **Shadow State**: Command queues, production assignments and unit
//!   status are one `AgentState` value. The search works on clones.
//!
//! - **Tolerant Search**: Under fog of war illegal steps are expected, so
//!   search skips them. The loop itself fails fast.
//!
//! ## Modules
//!
//! - `core`: Positions, players, IDs, primitive actions, RNG, config, errors
//! - `engine`: `Snapshot` and `Host` traits, host events
//! - `games`: Reference skirmish game implementing `Snapshot`
//! - `planning`: A* path planner, knowledge flood fill, determinization
//! - `macros`: Macro-actions, their resolution and enumeration
//! - `command`: Command queues, dispatch and corrections
//! - `mcts`: Monte Carlo Tree Search over simultaneous macro-actions
//! - `agent`: The real-time decision loop

pub mod core;
pub mod engine;
pub mod games;
pub mod planning;
pub mod macros;
pub mod command;
pub mod mcts;
pub mod agent;

// Re-export commonly used types
pub use crate::core::{
    AgentConfig, AgentError, GameRng, PlayerId, PlayerMap, Position,
    PrimitiveAction, TimedAction, UnitId, UnitTypeId,
};

pub use crate::engine::{Host, HostEvent, HostEventSender, Snapshot};

pub use crate::macros::{MacroAction, Resolution};

pub use crate::command::{AgentState, Command, EnqueueOutcome, UnitStatus};

pub use crate::mcts::{Decision, MctsConfig, MctsSearch, SearchBudget, SearchStats, TreeStats};

pub use crate::agent::{CycleReport, DecisionLoop, ShutdownHandle};

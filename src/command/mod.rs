//! Command queues: the agent's plan between decision and dispatch.
//!
//! ## Key Types
//!
//! - `Command`: a macro-action and the primitive steps left to send
//! - `CommandQueues`: FIFO of commands per unit and per city
//! - `ProductionMap`: production the agent assigned per city
//! - `AgentState`: queues, production map and shadow unit status together
//!
//! ## Operations
//!
//! - `enqueue`: resolve and place a macro-action (force replaces the front)
//! - `peek_ready`: next legal step, repairing stale commands
//! - `dispatch_batch`: one step per eligible queue with increasing send times
//! - `drain_simulated`: play queued commands out on a search snapshot
//! - `apply_host_event`: rejection and vanish corrections

mod command;
pub mod queue;
pub mod state;

pub use command::Command;
pub use queue::{
    apply_host_event, dispatch_batch, drain_simulated, enqueue, peek_ready, peek_ready_city,
    EnqueueOutcome,
};
pub use state::{AgentState, CommandQueues, ProductionMap, UnitStatus};

//! Real-time agent: the decision loop and its stop signal.
//!
//! ## Cycle
//!
//! 1. Apply host corrections (rejections, vanished units)
//! 2. Copy the game and replay orders still in flight
//! 3. Search until the decision deadline
//! 4. Resolve and enqueue the decided macro-action
//! 5. Sleep out the period, then dispatch ready steps

pub mod decision_loop;
pub mod shutdown;

pub use decision_loop::{CycleReport, DecisionLoop};
pub use shutdown::ShutdownHandle;

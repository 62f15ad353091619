//! Path planning and map knowledge.
//!
//! Both are pure functions of a snapshot: terrain and ownership rules are
//! asked of the `Snapshot`, never duplicated here.

pub mod knowledge;
pub mod pathfinding;

pub use knowledge::{determinized_copy, exploration_target, known_positions, known_positions_from};
pub use pathfinding::find_path;

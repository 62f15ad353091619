//! Monte Carlo Tree Search over macro-actions.
//!
//! ## Overview
//!
//! - **Simultaneous moves**: each edge carries one macro-action per player
//! - **Arena tree**: nodes are indexed by `NodeId`, parents are back-references
//! - **Fresh tree per decision**: nothing persists across cycles
//! - **Tolerant rollouts**: a player's failed macro-action is skipped, not fatal
//! - **Deterministic**: every random choice goes through a seeded `GameRng`
//!
//! ## Usage
//!
//! ```rust
//! use rts_macro_mcts::command::AgentState;
//! use rts_macro_mcts::core::{PlayerId, Position};
//! use rts_macro_mcts::games::skirmish::{SkirmishBuilder, INFANTRY};
//! use rts_macro_mcts::mcts::{MctsConfig, MctsSearch, SearchBudget};
//!
//! let game = SkirmishBuilder::new(5, 5)
//!     .unit(PlayerId::new(0), INFANTRY, Position::new(0, 0))
//!     .unit(PlayerId::new(1), INFANTRY, Position::new(4, 4))
//!     .build();
//!
//! let mut search = MctsSearch::new(MctsConfig::default());
//! let decision = search
//!     .search(&game, PlayerId::new(0), &AgentState::new(), SearchBudget::iterations(50))
//!     .unwrap();
//! println!("decided {:?} after {} iterations", decision.action, decision.stats.iterations);
//! ```

pub mod budget;
pub mod config;
pub mod node;
pub mod policy;
pub mod search;
pub mod stats;
pub mod tree;

// Re-exports
pub use budget::SearchBudget;
pub use config::MctsConfig;
pub use node::{GameStateNode, NodeId};
pub use policy::{determine_winners, first_max, move_cmp, selection_cmp, uct};
pub use search::{Decision, MctsSearch};
pub use stats::SearchStats;
pub use tree::{GameTree, TreeStats};

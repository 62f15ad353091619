//! Macro-actions: coarse intents the search plans over.
//!
//! A `MacroAction` is resolved into an ordered primitive sequence by
//! `resolve`, using the path planner where movement is needed.
//! `legal_macro_actions` lists what a player could start right now.

pub mod enumerate;
pub mod macro_action;
pub mod resolver;

pub use enumerate::legal_macro_actions;
pub use macro_action::{MacroAction, MacroActionKind};
pub use resolver::{resolve, Resolution};

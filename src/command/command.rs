//! A resolved macro-action waiting in a queue.

use std::collections::VecDeque;

use crate::core::{PlayerId, Position, PrimitiveAction};
use crate::macros::{MacroAction, Resolution};

/// A macro-action plus the primitive steps still to send for it.
///
/// Steps are consumed front to back. The owner is kept so a simulated drain
/// schedules the steps for the right player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub action: MacroAction,
    pub owner: PlayerId,
    pub steps: VecDeque<PrimitiveAction>,
}

impl Command {
    pub fn new(resolution: Resolution, owner: PlayerId) -> Self {
        Self {
            action: resolution.action,
            owner,
            steps: resolution.steps,
        }
    }

    /// Next step to send.
    #[must_use]
    pub fn front(&self) -> Option<&PrimitiveAction> {
        self.steps.front()
    }

    pub fn pop_step(&mut self) -> Option<PrimitiveAction> {
        self.steps.pop_front()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.steps.is_empty()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }

    /// Cell the command ends on, if it moves at all.
    #[must_use]
    pub fn final_destination(&self) -> Option<Position> {
        self.steps.iter().rev().find_map(|s| match *s {
            PrimitiveAction::Move { to, .. } => Some(to),
            _ => None,
        })
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{} steps left]", self.action, self.steps.len())
    }
}

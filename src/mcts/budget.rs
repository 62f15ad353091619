//! Search time budget.

use std::time::{Duration, Instant};

/// How long a search may run: a wall-clock deadline, an iteration cap, or
/// both. Checked between iterations and between rollout plies, never
/// preemptively.
#[derive(Clone, Copy, Debug)]
pub struct SearchBudget {
    deadline: Option<Instant>,
    max_iterations: Option<u32>,
}

impl SearchBudget {
    /// Run until `deadline`.
    #[must_use]
    pub fn until(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            max_iterations: None,
        }
    }

    /// Run for `duration` from now.
    #[must_use]
    pub fn for_duration(duration: Duration) -> Self {
        Self::until(Instant::now() + duration)
    }

    /// Run exactly `n` iterations regardless of time.
    #[must_use]
    pub fn iterations(n: u32) -> Self {
        Self {
            deadline: None,
            max_iterations: Some(n),
        }
    }

    /// Also stop after `n` iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, n: u32) -> Self {
        self.max_iterations = Some(n);
        self
    }

    /// Has the wall-clock deadline passed?
    #[must_use]
    pub fn is_past_deadline(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Should the search stop before starting iteration `done + 1`?
    #[must_use]
    pub fn is_exhausted(&self, done: u32) -> bool {
        self.max_iterations.is_some_and(|max| done >= max) || self.is_past_deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_budget() {
        let budget = SearchBudget::iterations(3);
        assert!(!budget.is_past_deadline());
        assert!(!budget.is_exhausted(2));
        assert!(budget.is_exhausted(3));
    }

    #[test]
    fn test_deadline_budget() {
        assert!(SearchBudget::until(Instant::now()).is_exhausted(0));
        let later = SearchBudget::for_duration(Duration::from_secs(60)).with_max_iterations(5);
        assert!(!later.is_exhausted(4));
        assert!(later.is_exhausted(5));
    }
}

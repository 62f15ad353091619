//! Players and dense per-player tables.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Zero-based seat of a player in the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    #[must_use]
    pub const fn new(seat: u8) -> Self {
        Self(seat)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Seats `0..player_count` in order.
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count).map(|seat| PlayerId(seat as u8))
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// One slot per player, addressed by `PlayerId`.
///
/// Holds win counters and the macro-action labels on tree edges, and carries
/// the utility and heuristic vectors a snapshot reports.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    slots: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Fill each slot with `fill(player)`.
    ///
    /// # Panics
    ///
    /// If `player_count` is zero or does not fit a `PlayerId`.
    pub fn new(player_count: usize, fill: impl FnMut(PlayerId) -> T) -> Self {
        assert!(
            (1..=usize::from(u8::MAX)).contains(&player_count),
            "player count {player_count} out of range"
        );
        Self {
            slots: PlayerId::all(player_count).map(fill).collect(),
        }
    }

    pub fn with_value(player_count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::new(player_count, |_| value.clone())
    }

    /// Slots in seat order.
    ///
    /// # Panics
    ///
    /// If `slots` is empty.
    pub fn from_vec(slots: Vec<T>) -> Self {
        assert!(!slots.is_empty(), "player count 0 out of range");
        Self { slots }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.slots.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        PlayerId::all(self.slots.len()).zip(&self.slots)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        PlayerId::all(self.slots.len()).zip(&mut self.slots)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.slots
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &T {
        &self.slots[player.index()]
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.slots[player.index()]
    }
}

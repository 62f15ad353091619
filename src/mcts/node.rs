//! Game-state tree nodes.
//!
//! Uses arena-based allocation with index references (NodeId). A node owns
//! its child handles; the parent handle is a back-reference for upward
//! walks only.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{PlayerId, PlayerMap};
use crate::macros::MacroAction;

/// Index into the GameTree node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The root of every tree.
    pub const ROOT: NodeId = NodeId(0);

    /// Handle for arena slot `id`.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Arena index.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// A snapshot plus the joint macro-action that led to it.
#[derive(Clone, Debug)]
pub struct GameStateNode<S> {
    /// Game state after the edge's macro-actions were played out.
    pub snapshot: S,

    /// Macro-action each player committed on the edge from the parent.
    /// `None` for players that had nothing or whose action failed.
    pub actions: PlayerMap<Option<MacroAction>>,

    /// Backpropagations through this node.
    pub visits: u32,

    /// Rollouts each player won through this node.
    pub wins: PlayerMap<u32>,

    /// Parent node (None for root).
    pub parent: Option<NodeId>,

    /// Children in creation order.
    pub children: SmallVec<[NodeId; 8]>,

    /// Edges from the root.
    pub depth: u16,

    /// Macro-actions per player not yet tried from this node.
    /// `None` until the node is first expanded.
    pub untried: Option<PlayerMap<Vec<MacroAction>>>,
}

impl<S> GameStateNode<S> {
    /// Child node reached by the joint `actions`.
    pub fn new(
        snapshot: S,
        actions: PlayerMap<Option<MacroAction>>,
        parent: Option<NodeId>,
        depth: u16,
    ) -> Self {
        let player_count = actions.player_count();
        Self {
            snapshot,
            actions,
            visits: 0,
            wins: PlayerMap::with_value(player_count, 0),
            parent,
            children: SmallVec::new(),
            depth,
            untried: None,
        }
    }

    /// Root over `snapshot`, with no incoming edge.
    pub fn root(snapshot: S, player_count: usize) -> Self {
        Self::new(snapshot, PlayerMap::with_value(player_count, None), None, 0)
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Could another child still be created here?
    ///
    /// True for nodes never expanded and for nodes with untried
    /// macro-actions left for some player.
    #[must_use]
    pub fn is_expandable(&self) -> bool {
        match &self.untried {
            None => true,
            Some(untried) => untried.iter().any(|(_, actions)| !actions.is_empty()),
        }
    }

    /// Wins for `player` over visits, 0 when unvisited.
    #[must_use]
    pub fn win_rate(&self, player: PlayerId) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            f64::from(self.wins[player]) / f64::from(self.visits)
        }
    }

    /// Macro-action `player` took to reach this node.
    #[must_use]
    pub fn action_of(&self, player: PlayerId) -> Option<MacroAction> {
        self.actions[player]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UnitId;

    #[test]
    fn test_handle_display() {
        let id = NodeId::new(12);
        assert_eq!(id.raw(), 12);
        assert_eq!(format!("{}", id), "NodeId(12)");
        assert_eq!(NodeId::ROOT, NodeId::new(0));
    }

    #[test]
    fn test_root_starts_unvisited() {
        let node = GameStateNode::root((), 2);

        assert!(node.is_root());
        assert!(node.is_leaf());
        assert!(node.is_expandable());
        assert_eq!(node.depth, 0);
        assert_eq!(node.visits, 0);
        assert_eq!(node.action_of(PlayerId::new(1)), None);
    }

    #[test]
    fn test_expandable_tracks_untried() {
        let mut node = GameStateNode::root((), 2);
        let explore = MacroAction::Explore { unit: UnitId(1) };

        node.untried = Some(PlayerMap::from_vec(vec![vec![explore], vec![]]));
        assert!(node.is_expandable());

        node.untried = Some(PlayerMap::with_value(2, Vec::new()));
        assert!(!node.is_expandable());
    }

    #[test]
    fn test_win_rate() {
        let mut node = GameStateNode::root((), 2);
        assert_eq!(node.win_rate(PlayerId::new(0)), 0.0);

        node.visits = 4;
        node.wins[PlayerId::new(0)] = 3;
        node.wins[PlayerId::new(1)] = 1;

        assert_eq!(node.win_rate(PlayerId::new(0)), 0.75);
        assert_eq!(node.win_rate(PlayerId::new(1)), 0.25);
    }
}

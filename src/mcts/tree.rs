//! Arena-based game-state tree.
//!
//! Uses a flat `Vec<GameStateNode>` with index-based references. The arena
//! is the only owner of nodes and is dropped wholesale each decision cycle.

use std::fmt;

use super::node::{GameStateNode, NodeId};
use crate::core::{AgentError, PlayerId, PlayerMap};
use crate::macros::MacroAction;

/// Arena-based game-state tree.
#[derive(Clone, Debug)]
pub struct GameTree<S> {
    /// All nodes in the tree; the root is at index 0.
    nodes: Vec<GameStateNode<S>>,

    /// Players with a slot on every edge.
    player_count: usize,
}

impl<S> GameTree<S> {
    /// Create a new tree around a root snapshot.
    pub fn new(root: S, player_count: usize) -> Self {
        Self {
            nodes: vec![GameStateNode::root(root, player_count)],
            player_count,
        }
    }

    /// Handle of the root, always index 0.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Node behind `id`. Panics on a handle from another tree.
    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> &GameStateNode<S> {
        &self.nodes[id.0 as usize]
    }

    /// Mutable access to `id`.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut GameStateNode<S> {
        &mut self.nodes[id.0 as usize]
    }

    /// Append a child under `parent`, returning its ID.
    ///
    /// Allocation failure is reported instead of aborting.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        snapshot: S,
        actions: PlayerMap<Option<MacroAction>>,
    ) -> Result<NodeId, AgentError> {
        self.nodes
            .try_reserve(1)
            .map_err(|_| AgentError::ResourceExhausted(self.nodes.len()))?;

        let id = NodeId::new(self.nodes.len() as u32);
        let depth = self.get(parent).depth + 1;
        self.nodes
            .push(GameStateNode::new(snapshot, actions, Some(parent), depth));
        self.get_mut(parent).children.push(id);
        Ok(id)
    }

    /// Nodes allocated, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Players with a slot on every edge.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.player_count
    }

    /// The root node.
    #[must_use]
    pub fn root_node(&self) -> &GameStateNode<S> {
        self.get(self.root())
    }

    /// IDs from `id` up to the root, inclusive.
    pub fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = self.get(id).parent;
        while let Some(parent) = current {
            path.push(parent);
            current = self.get(parent).parent;
        }
        path
    }

    /// Count one visit on every node from `from` up to the root, and one win
    /// for each flagged player.
    pub fn backpropagate(&mut self, from: NodeId, winners: &PlayerMap<bool>) {
        let mut current = Some(from);
        while let Some(id) = current {
            let node = self.get_mut(id);
            node.visits += 1;
            for (player, &won) in winners.iter() {
                if won {
                    node.wins[player] += 1;
                }
            }
            current = node.parent;
        }
    }

    /// Children of `id` with the player's macro-action on each edge.
    pub fn child_actions(&self, id: NodeId, player: PlayerId) -> Vec<(NodeId, Option<MacroAction>)> {
        self.get(id)
            .children
            .iter()
            .map(|&c| (c, self.get(c).action_of(player)))
            .collect()
    }

    /// Nodes with their handles, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &GameStateNode<S>)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId::new(i as u32), n))
    }

    /// Shape summary.
    #[must_use]
    pub fn stats(&self) -> TreeStats {
        let max_depth = self.nodes.iter().map(|n| n.depth).max().unwrap_or(0);
        let leaf_count = self.nodes.iter().filter(|n| n.is_leaf()).count();
        let root_children = self.root_node().children.len();

        TreeStats {
            node_count: self.nodes.len(),
            max_depth,
            leaf_count,
            root_children,
            root_visits: self.root_node().visits,
        }
    }

    fn fmt_subtree(&self, f: &mut fmt::Formatter<'_>, id: NodeId, level: usize) -> fmt::Result {
        let node = self.get(id);
        write!(f, "{:indent$}[v={} w=", "", node.visits, indent = level * 2)?;
        for (player, wins) in node.wins.iter() {
            if player.index() > 0 {
                write!(f, "/")?;
            }
            write!(f, "{wins}")?;
        }
        write!(f, "]")?;
        for (player, action) in node.actions.iter() {
            if let Some(action) = action {
                write!(f, " P{}:{action}", player.index())?;
            }
        }
        writeln!(f)?;
        for &child in &node.children {
            self.fmt_subtree(f, child, level + 1)?;
        }
        Ok(())
    }
}

impl<S> fmt::Display for GameTree<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_subtree(f, self.root(), 0)
    }
}

/// Statistics about the game-state tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Nodes allocated, root included.
    pub node_count: usize,

    /// Deepest node below the root.
    pub max_depth: u16,

    /// Nodes without children.
    pub leaf_count: usize,

    /// Direct children of the root (decision candidates).
    pub root_children: usize,

    /// Visits through the root (one per iteration).
    pub root_visits: u32,
}

impl TreeStats {
    /// Average children per internal node.
    #[must_use]
    pub fn branching_factor(&self) -> f64 {
        let internal = self.node_count - self.leaf_count;
        if internal == 0 {
            0.0
        } else {
            (self.node_count - 1) as f64 / internal as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UnitId;

    fn explore(unit: u32) -> PlayerMap<Option<MacroAction>> {
        PlayerMap::from_vec(vec![Some(MacroAction::Explore { unit: UnitId(unit) }), None])
    }

    #[test]
    fn test_fresh_tree_has_only_root() {
        let tree = GameTree::new((), 2);

        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
        assert_eq!(tree.player_count(), 2);
        assert_eq!(tree.root(), NodeId::new(0));
        assert!(tree.root_node().is_root());
    }

    #[test]
    fn test_add_child_links_both_ways() {
        let mut tree = GameTree::new((), 2);
        let child = tree.add_child(tree.root(), (), explore(1)).unwrap();
        let grandchild = tree.add_child(child, (), explore(2)).unwrap();

        assert_eq!(child, NodeId::new(1));
        assert_eq!(tree.get(child).parent, Some(NodeId::ROOT));
        assert_eq!(tree.get(grandchild).depth, 2);
        assert_eq!(tree.root_node().children.as_slice(), &[child]);
        assert_eq!(tree.path_to_root(grandchild), vec![grandchild, child, NodeId::ROOT]);
    }

    #[test]
    fn test_backpropagate_to_root() {
        let mut tree = GameTree::new((), 2);
        let a = tree.add_child(tree.root(), (), explore(1)).unwrap();
        let b = tree.add_child(tree.root(), (), explore(2)).unwrap();
        let winners = PlayerMap::from_vec(vec![true, false]);

        tree.backpropagate(a, &winners);
        tree.backpropagate(a, &PlayerMap::from_vec(vec![false, true]));

        assert_eq!(tree.get(a).visits, 2);
        assert_eq!(tree.get(a).wins.as_slice(), &[1, 1]);
        assert_eq!(tree.root_node().visits, 2);
        assert_eq!(tree.get(b).visits, 0);
    }

    #[test]
    fn test_shape_summary() {
        let mut tree = GameTree::new((), 2);
        let a = tree.add_child(tree.root(), (), explore(1)).unwrap();
        tree.add_child(tree.root(), (), explore(2)).unwrap();
        tree.add_child(a, (), explore(3)).unwrap();

        let stats = tree.stats();
        assert_eq!(stats.node_count, 4);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.leaf_count, 2);
        assert_eq!(stats.root_children, 2);
        assert_eq!(stats.branching_factor(), 1.5);
    }

    #[test]
    fn test_display() {
        let mut tree = GameTree::new((), 2);
        let a = tree.add_child(tree.root(), (), explore(1)).unwrap();
        tree.backpropagate(a, &PlayerMap::from_vec(vec![true, false]));

        let rendered = tree.to_string();
        assert_eq!(rendered, "[v=1 w=1/0]\n  [v=1 w=1/0] P0:Explore(Unit(1))\n");
    }
}

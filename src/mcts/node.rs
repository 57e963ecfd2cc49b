//! Search tree for one decision.
//!
//! Nodes live in an arena ([`Tree`]) and refer to each other by [`NodeId`]:
//! a child stores its parent's index, a parent stores its children's indices.
//! The whole arena is dropped when the decision returns, so nothing is reused
//! across decisions.

use rand::Rng;

use crate::game::game_state::{accumulate, empty_utilities, GameState, Player, Utilities};

/// Index of a node inside its [`Tree`].
pub type NodeId = usize;

/// A node in the search tree
#[derive(Debug, Clone)]
pub struct Node<G: GameState> {
    /// Parent node, `None` for the root
    pub parent: Option<NodeId>,

    /// Move that led from the parent to this node, `None` for the root
    pub move_from_parent: Option<G::Move>,

    /// Game state owned by this node
    pub state: G,

    /// Number of backpropagation passes through this node
    pub visit_count: u32,

    /// For every player, sum of the utilities backpropagated through this node.
    /// Index 0 is the unused sentinel slot.
    pub score_sums: Utilities,

    /// Expanded children, in expansion order
    pub children: Vec<NodeId>,

    /// Legal moves for which no child exists yet
    pub unexpanded_moves: Vec<G::Move>,
}

impl<G: GameState> Node<G> {
    /// Creates a node with every legal move of `state` still unexpanded.
    pub fn new(parent: Option<NodeId>, move_from_parent: Option<G::Move>, state: G) -> Self {
        let unexpanded_moves = if state.is_terminal() {
            Vec::new()
        } else {
            state.legal_moves()
        };

        Self {
            parent,
            move_from_parent,
            score_sums: empty_utilities(state.num_players()),
            state,
            visit_count: 0,
            children: Vec::new(),
            unexpanded_moves,
        }
    }

    /// The player to act at this node.
    pub fn mover(&self) -> Player {
        self.state.mover()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn has_unexpanded_moves(&self) -> bool {
        !self.unexpanded_moves.is_empty()
    }

    /// Average utility for `player`, or 0 for an unvisited node.
    pub fn average_value(&self, player: Player) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.score_sums[player] / f64::from(self.visit_count)
        }
    }
}

/// Arena owning every node of one decision's search tree.
#[derive(Debug, Clone)]
pub struct Tree<G: GameState> {
    nodes: Vec<Node<G>>,
}

impl<G: GameState> Tree<G> {
    /// Index of the root node.
    pub const ROOT: NodeId = 0;

    /// Creates a tree holding only the root node for `root_state`.
    pub fn new(root_state: G) -> Self {
        Self {
            nodes: vec![Node::new(None, None, root_state)],
        }
    }

    pub fn root(&self) -> &Node<G> {
        &self.nodes[Self::ROOT]
    }

    pub fn node(&self, id: NodeId) -> &Node<G> {
        &self.nodes[id]
    }

    /// Number of nodes in the tree, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of `id` as node references.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &Node<G>)> + '_ {
        self.nodes[id]
            .children
            .iter()
            .map(move |&child| (child, &self.nodes[child]))
    }

    /// Expands one uniformly random unexpanded move of `parent`.
    ///
    /// Returns `None` when `parent` has no unexpanded move left.
    pub fn expand<R: Rng>(&mut self, parent: NodeId, rng: &mut R) -> Option<NodeId> {
        let remaining = self.nodes[parent].unexpanded_moves.len();
        if remaining == 0 {
            return None;
        }
        Some(self.add_child(parent, rng.random_range(0..remaining)))
    }

    /// Removes the unexpanded move at `move_index` from `parent`, applies it to
    /// a copy of the parent's state and appends the resulting child.
    ///
    /// # Panics
    /// Panics if `move_index` is out of bounds.
    pub fn add_child(&mut self, parent: NodeId, move_index: usize) -> NodeId {
        let (mv, state) = {
            let parent_node = &mut self.nodes[parent];
            let mv = parent_node.unexpanded_moves.remove(move_index);
            let state = parent_node.state.successor(&mv);
            (mv, state)
        };

        let child = self.nodes.len();
        self.nodes.push(Node::new(Some(parent), Some(mv), state));
        self.nodes[parent].children.push(child);
        child
    }

    /// Adds `utilities` to every node from `leaf` up to the root inclusive and
    /// counts one visit on each of them.
    pub fn backpropagate(&mut self, leaf: NodeId, utilities: &[f64]) {
        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = &mut self.nodes[id];
            node.visit_count += 1;
            accumulate(&mut node.score_sums, utilities);
            current = node.parent;
        }
    }
}

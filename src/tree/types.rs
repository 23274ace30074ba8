//! Nodes, edges and the arena that owns them.

use std::collections::BTreeSet;

use serde::Serialize;
use shakmaty::Color;

use crate::error::Error;
use crate::pgn::MoveText;

pub type NodeId = usize;

/// Id of the node for the initial position.
pub const ROOT_NODE_ID: NodeId = 0;

/// Edge index of the structural main line at any node.
pub const MAINLINE_INDEX: usize = 0;

/// Color of the player making the half-move numbered `half_move`.
pub fn player_for_half_move(half_move: u32) -> Color {
    if half_move % 2 == 1 {
        Color::White
    } else {
        Color::Black
    }
}

pub fn fullmove_for_half_move(half_move: u32) -> u32 {
    (half_move + 1) / 2
}

/// A move leading out of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub notation: MoveText,
    /// Numeric annotation codes, in source order.
    pub annotations: Vec<u8>,
    pub destination: NodeId,
    /// Index within the owning node's edge list at creation; never changes.
    pub reference_index: usize,
}

/// Where a node was reached from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Origin {
    pub node_id: NodeId,
    pub choice_index: usize,
}

/// A position reached in the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: NodeId,
    /// Variation nesting level; the root and the main line are at depth 0.
    pub depth: usize,
    /// Half-move number of the moves leading out of this node.
    pub half_move_number: u32,
    /// `None` only for the root.
    pub origin: Option<Origin>,
    /// Comment written at the start of a variation, before this node's move.
    pub preceding_comment: Option<String>,
    /// Comment written after this node's move.
    pub comment: Option<String>,
    pub position_key: String,
    pub edges: Vec<Edge>,
}

impl Node {
    pub fn is_terminal(&self) -> bool {
        self.edges.is_empty()
    }

    /// Player whose moves lead out of this node.
    pub fn player(&self) -> Color {
        player_for_half_move(self.half_move_number)
    }

    pub fn fullmove_number(&self) -> u32 {
        fullmove_for_half_move(self.half_move_number)
    }
}

/// The game tree: an arena of nodes addressed by id, plus index sets gathered while building.
///
/// Immutable once built and safe to share between threads.
#[derive(Debug, Clone, Serialize)]
pub struct GameTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) nonterminal_ids: BTreeSet<NodeId>,
    pub(crate) max_out_degree: usize,
}

impl GameTree {
    pub fn node(&self, id: NodeId) -> Result<&Node, Error> {
        self.nodes.get(id).ok_or(Error::UnknownNode(id))
    }

    pub fn root(&self) -> &Node {
        &self.nodes[ROOT_NODE_ID]
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id < self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Never true for a built tree, which always holds the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        0..self.nodes.len()
    }

    pub fn nonterminal_ids(&self) -> &BTreeSet<NodeId> {
        &self.nonterminal_ids
    }

    pub fn terminal_ids(&self) -> BTreeSet<NodeId> {
        self.node_ids()
            .filter(|id| !self.nonterminal_ids.contains(id))
            .collect()
    }

    pub fn max_out_degree(&self) -> usize {
        self.max_out_degree
    }

    /// The edge whose move produced `id`, or `None` for the root.
    pub fn edge_into(&self, id: NodeId) -> Result<Option<&Edge>, Error> {
        let node = self.node(id)?;
        match node.origin {
            Some(origin) => {
                let parent = self.node(origin.node_id)?;
                Ok(parent.edges.get(origin.choice_index))
            }
            None => Ok(None),
        }
    }
}

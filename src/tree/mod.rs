//! The canonical game tree: an index-based arena of positions connected by moves.

mod builder;
pub mod position;
pub mod types;

pub use position::{MoveApplier, ShakmatyApplier};
pub use types::{
    fullmove_for_half_move, player_for_half_move, Edge, GameTree, Node, NodeId, Origin,
    MAINLINE_INDEX, ROOT_NODE_ID,
};

//! Read-only traversals of a built tree: which overrides reach a node, and which rows the
//! variations table shows under those overrides.

pub mod deviation;
pub mod rows;

pub use deviation::{deviations_to_reach, Deviations};
pub use rows::{display_order, Cell, DisplayRow, MoveRow, RowCompiler};

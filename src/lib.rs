//! Navigable variations table for a single annotated chess game.
//!
//! The first game of a PGN file is tokenized, built once into an immutable tree of positions and
//! then traversed on demand: any node can be elevated to the main line, which yields the rows of
//! a variations table with the displaced moves listed as alternatives.

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod pgn;
pub mod report;
pub mod server;
pub mod traverse;
pub mod tree;
pub mod view;

#[cfg(test)]
mod test_support;

pub use error::Error;

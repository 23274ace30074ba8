//! Variations table rows.
//!
//! Rows are compiled lazily while walking forward from the root along the displayed main line.
//! A White move with no alternatives is carried over and shares a row with Black's reply; any
//! node with alternatives gets its own row. The display order of each visited node's edges is
//! recorded on the compiler, never on the tree.

use std::collections::BTreeMap;

use shakmaty::Color;

use super::deviation::Deviations;
use crate::tree::{Edge, GameTree, NodeId, ROOT_NODE_ID};

/// Edge indices in display order: `choice` first, then every other index ascending. The structural
/// main line (index 0) therefore always leads the alternatives when it is not the choice.
pub fn display_order(edge_count: usize, choice: usize) -> Vec<usize> {
    if edge_count == 0 {
        return Vec::new();
    }
    let mut order = Vec::with_capacity(edge_count);
    order.push(choice);
    order.extend((0..edge_count).filter(|index| *index != choice));
    order
}

/// One half-move slot of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell<'a> {
    Move(&'a Edge),
    /// White's move was shown on an earlier row.
    Ellipsis,
    /// Black's move follows on a later row.
    Deferred,
    /// No move at all: the line ended after White's move.
    Empty,
}

impl<'a> Cell<'a> {
    pub fn edge(&self) -> Option<&'a Edge> {
        match self {
            Cell::Move(edge) => Some(edge),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRow<'a> {
    /// Node the row was compiled from; its player owns the alternatives.
    pub node_id: NodeId,
    pub player: Color,
    pub fullmove_number: u32,
    pub white: Cell<'a>,
    pub black: Cell<'a>,
    pub alternatives: Vec<&'a Edge>,
}

impl MoveRow<'_> {
    /// `"12."` when the row shows a White move, blank otherwise.
    pub fn fullmove_label(&self) -> String {
        match self.white {
            Cell::Move(_) => format!("{}.", self.fullmove_number),
            _ => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayRow<'a> {
    /// Width-stabilizing first row with empty alternative slots; not part of the tree.
    Invisible { alternative_slots: usize },
    Moves(MoveRow<'a>),
}

/// Forward-only iterator over the rows of the variations table for one set of deviations.
pub struct RowCompiler<'a> {
    tree: &'a GameTree,
    deviations: &'a Deviations,
    alternative_slots: usize,
    started: bool,
    current: Option<NodeId>,
    carryover: Option<&'a Edge>,
    display_orders: BTreeMap<NodeId, Vec<usize>>,
}

impl<'a> RowCompiler<'a> {
    pub fn new(tree: &'a GameTree, deviations: &'a Deviations, min_alternative_slots: usize) -> Self {
        Self {
            tree,
            deviations,
            alternative_slots: min_alternative_slots
                .max(tree.max_out_degree().saturating_sub(1)),
            started: false,
            current: Some(ROOT_NODE_ID),
            carryover: None,
            display_orders: BTreeMap::new(),
        }
    }

    /// Display order of every node visited so far.
    pub fn display_orders(&self) -> &BTreeMap<NodeId, Vec<usize>> {
        &self.display_orders
    }

    pub fn alternative_slots(&self) -> usize {
        self.alternative_slots
    }
}

impl<'a> Iterator for RowCompiler<'a> {
    type Item = DisplayRow<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            return Some(DisplayRow::Invisible {
                alternative_slots: self.alternative_slots,
            });
        }

        loop {
            let node = self.tree.node(self.current?).ok()?;

            if node.is_terminal() {
                self.current = None;
                // Flush a White move still waiting for a Black reply that never came.
                let white = self.carryover.take()?;
                return Some(DisplayRow::Moves(MoveRow {
                    node_id: node.id,
                    player: Color::White,
                    fullmove_number: node.fullmove_number(),
                    white: Cell::Move(white),
                    black: Cell::Empty,
                    alternatives: Vec::new(),
                }));
            }

            let choice = self.deviations.effective_choice(node);
            let order = display_order(node.edges.len(), choice);
            let mainline = &node.edges[choice];
            let alternatives: Vec<&'a Edge> =
                order[1..].iter().map(|index| &node.edges[*index]).collect();
            self.display_orders.insert(node.id, order);
            self.current = Some(mainline.destination);

            let player = node.player();
            if player == Color::White && alternatives.is_empty() {
                self.carryover = Some(mainline);
                continue;
            }

            let (white, black) = match player {
                Color::White => (Cell::Move(mainline), Cell::Deferred),
                Color::Black => (
                    self.carryover.take().map_or(Cell::Ellipsis, Cell::Move),
                    Cell::Move(mainline),
                ),
            };
            return Some(DisplayRow::Moves(MoveRow {
                node_id: node.id,
                player,
                fullmove_number: node.fullmove_number(),
                white,
                black,
                alternatives,
            }));
        }
    }
}

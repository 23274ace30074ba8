//! Presentation model of one variations-table page: rows of linked cells, the comments box and
//! the board shown next to the table.

use std::fmt::Write as _;

use log::{debug, warn};
use serde::Serialize;
use shakmaty::{fen::Fen, CastlingMode, Chess, Color, Position};

use crate::traverse::{deviations_to_reach, Cell, Deviations, DisplayRow, MoveRow, RowCompiler};
use crate::tree::{Edge, GameTree, NodeId, ROOT_NODE_ID};

pub const WHITE_MOVE_ELLIPSIS: &str = ". . . ";
pub const BLACK_MOVE_DEFERRED: &str = ". . . ";
pub const BLACK_ALTERNATIVE_PREFIX: &str = "…";
pub const DEFAULT_WELCOME_TEXT: &str =
    "Click any move to make it part of the main line. Click a main-line move to show its position.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    pub min_alternative_slots: usize,
    pub welcome_text: String,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            min_alternative_slots: 4,
            welcome_text: DEFAULT_WELCOME_TEXT.to_string(),
        }
    }
}

/// Glyph for a numeric annotation code, or `$n` for codes without one.
pub fn nag_glyph(code: u8) -> String {
    let glyph = match code {
        1 => "!",
        2 => "?",
        3 => "!!",
        4 => "??",
        5 => "!?",
        6 => "?!",
        7 => "□",
        10 => "=",
        13 => "∞",
        14 => "⩲",
        15 => "⩱",
        16 => "±",
        17 => "∓",
        18 => "+−",
        19 => "−+",
        22 | 23 => "⨀",
        146 => "N",
        _ => return format!("${}", code),
    };
    glyph.to_string()
}

/// Annotation text appended to a move: move assessments attach directly, the rest after a space.
pub fn annotation_suffix(annotations: &[u8]) -> String {
    let mut suffix = String::new();
    for code in annotations {
        if !(1..=7).contains(code) {
            suffix.push(' ');
        }
        suffix.push_str(&nag_glyph(*code));
    }
    suffix
}

/// Navigation target of a cell: the node to elevate and the node to show on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Link {
    pub target: NodeId,
    pub board: NodeId,
}

impl Link {
    pub fn path(&self) -> String {
        format!("/node/{}/{}", self.target, self.board)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellView {
    pub text: String,
    pub link: Option<Link>,
    pub classes: Vec<String>,
}

impl CellView {
    fn blank(classes: Vec<String>) -> Self {
        Self {
            text: String::new(),
            link: None,
            classes,
        }
    }

    pub fn class_string(&self) -> String {
        self.classes.join(" ")
    }
}

fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

fn mainline_cell(cell: Cell, color: Color, target: NodeId, board: NodeId) -> CellView {
    let side = format!("mainline-{}", color_name(color));
    match cell {
        Cell::Move(edge) => {
            let mut classes = vec![
                "mainline".to_string(),
                side.clone(),
                format!("{}-nonnull", side),
                format!("alt-{}", edge.reference_index),
            ];
            if edge.destination == board {
                classes.push("focus".to_string());
            }
            CellView {
                text: format!(
                    "{}{}",
                    edge.notation.mainline(),
                    annotation_suffix(&edge.annotations)
                ),
                link: Some(Link {
                    target,
                    board: edge.destination,
                }),
                classes,
            }
        }
        Cell::Ellipsis | Cell::Deferred | Cell::Empty => {
            let text = match color {
                Color::White => WHITE_MOVE_ELLIPSIS,
                Color::Black => BLACK_MOVE_DEFERRED,
            };
            CellView {
                text: text.to_string(),
                link: None,
                classes: vec!["mainline".to_string(), side.clone(), format!("{}-null", side)],
            }
        }
    }
}

fn alternative_cell(edge: &Edge, color: Color) -> CellView {
    let prefix = match color {
        Color::White => "",
        Color::Black => BLACK_ALTERNATIVE_PREFIX,
    };
    CellView {
        text: format!(
            "{}{}{}",
            prefix,
            edge.notation.alternative(),
            annotation_suffix(&edge.annotations)
        ),
        link: Some(Link {
            target: edge.destination,
            board: edge.destination,
        }),
        classes: vec![
            "alt".to_string(),
            format!("alt-{}", color_name(color)),
            format!("alt-{}", edge.reference_index),
        ],
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    /// Width-stabilizing row that renderers should hide.
    pub invisible: bool,
    pub fullmove: String,
    pub white: CellView,
    pub black: CellView,
    pub alternatives: Vec<CellView>,
}

impl RowView {
    fn invisible(alternative_slots: usize) -> Self {
        Self {
            invisible: true,
            fullmove: String::new(),
            white: CellView::blank(vec!["mainline".to_string(), "mainline-white".to_string()]),
            black: CellView::blank(vec!["mainline".to_string(), "mainline-black".to_string()]),
            alternatives: (0..alternative_slots)
                .map(|index| CellView::blank(vec!["alt".to_string(), format!("alt-{}", index)]))
                .collect(),
        }
    }

    fn from_moves(row: &MoveRow, target: NodeId, board: NodeId) -> Self {
        Self {
            invisible: false,
            fullmove: row.fullmove_label(),
            white: mainline_cell(row.white, Color::White, target, board),
            black: mainline_cell(row.black, Color::Black, target, board),
            alternatives: row
                .alternatives
                .iter()
                .map(|edge| alternative_cell(edge, row.player))
                .collect(),
        }
    }
}

/// Text shown in the comments box for the board-focus node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextComments {
    /// Long algebraic notation of the move into the node; empty at the root.
    pub movetext: String,
    pub preceding: String,
    pub trailing: String,
}

impl TextComments {
    pub fn for_node(tree: &GameTree, board: NodeId, welcome_text: &str) -> Self {
        let (Ok(node), Ok(edge)) = (tree.node(board), tree.edge_into(board)) else {
            return Self::default();
        };
        let root_comment = tree.root().comment.clone();
        match (node.origin, edge) {
            (Some(origin), Some(edge)) => {
                // The comment before the first move is stored on the root; a first move opening
                // a variation keeps its own.
                let preceding = match node.preceding_comment.clone() {
                    Some(comment) => Some(comment),
                    None if origin.node_id == ROOT_NODE_ID => root_comment,
                    None => None,
                };
                Self {
                    movetext: edge.notation.comment_heading().to_string(),
                    preceding: preceding.unwrap_or_default(),
                    trailing: node.comment.clone().unwrap_or_default(),
                }
            }
            _ => Self {
                movetext: String::new(),
                preceding: root_comment.unwrap_or_else(|| welcome_text.to_string()),
                trailing: String::new(),
            },
        }
    }
}

/// What the board next to the table shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardFocus {
    pub node_id: NodeId,
    pub fen: String,
    /// UCI of the move into the node, for highlighting.
    pub last_move: Option<String>,
    /// Square of the king in check, if any.
    pub check: Option<String>,
}

impl BoardFocus {
    pub fn for_node(tree: &GameTree, board: NodeId) -> Self {
        let fen = tree
            .node(board)
            .map(|node| node.position_key.clone())
            .unwrap_or_default();
        let last_move = tree
            .edge_into(board)
            .ok()
            .flatten()
            .map(|edge| edge.notation.machine().to_string());
        let check = checked_king(&fen);
        Self {
            node_id: board,
            fen,
            last_move,
            check,
        }
    }
}

fn checked_king(fen: &str) -> Option<String> {
    let position: Chess = match Fen::from_ascii(fen.as_bytes()) {
        Ok(parsed) => match parsed.into_position(CastlingMode::Standard) {
            Ok(position) => position,
            Err(e) => {
                debug!("Position key {:?} is not a legal position: {}", fen, e);
                return None;
            }
        },
        Err(e) => {
            debug!("Position key {:?} is not a FEN: {}", fen, e);
            return None;
        }
    };
    if !position.is_check() {
        return None;
    }
    position
        .board()
        .king_of(position.turn())
        .map(|square| square.to_string())
}

/// Everything needed to render one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub target: NodeId,
    pub board: NodeId,
    pub flash: String,
    /// Set when a requested node did not exist and the root was used instead.
    pub notice: Option<String>,
    pub deviations: Deviations,
    pub rows: Vec<RowView>,
    pub comments: TextComments,
    pub board_focus: BoardFocus,
}

impl PageView {
    /// Compose the page that elevates `target` to the main line with `board` shown on the board.
    /// Unknown node ids fall back to the root.
    pub fn compose(tree: &GameTree, target: NodeId, board: NodeId, options: &ViewOptions) -> Self {
        let mut notices = Vec::new();
        let target = if tree.contains(target) {
            target
        } else {
            warn!("Requested target node {} does not exist; using the root", target);
            notices.push(format!("Node {} does not exist; showing the original main line.", target));
            ROOT_NODE_ID
        };
        let board = if tree.contains(board) {
            board
        } else {
            warn!("Requested board node {} does not exist; using the root", board);
            notices.push(format!("Node {} does not exist; showing the initial position.", board));
            ROOT_NODE_ID
        };

        let deviations = deviations_to_reach(tree, target).unwrap_or_default();
        let rows = RowCompiler::new(tree, &deviations, options.min_alternative_slots)
            .map(|row| match row {
                DisplayRow::Invisible { alternative_slots } => RowView::invisible(alternative_slots),
                DisplayRow::Moves(row) => RowView::from_moves(&row, target, board),
            })
            .collect();

        let flash = if target == ROOT_NODE_ID {
            "The game tree has been reset to the original main line.".to_string()
        } else {
            format!("Node {} has been elevated to the main line.", target)
        };

        Self {
            target,
            board,
            flash,
            notice: if notices.is_empty() {
                None
            } else {
                Some(notices.join(" "))
            },
            rows,
            comments: TextComments::for_node(tree, board, &options.welcome_text),
            board_focus: BoardFocus::for_node(tree, board),
            deviations,
        }
    }

    /// Plain-text rendering: one table line per visible row, alternatives followed by their link.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.flash);
        if let Some(notice) = &self.notice {
            let _ = writeln!(out, "{}", notice);
        }
        for row in self.rows.iter().filter(|row| !row.invisible) {
            let _ = write!(out, "{:>4} {:<12} {:<12}", row.fullmove, cell_text(&row.white), cell_text(&row.black));
            for alternative in &row.alternatives {
                let _ = write!(out, " {}", cell_text(alternative));
            }
            out.push('\n');
        }
        let _ = writeln!(out, "\nBoard (node {}): {}", self.board, self.board_focus.fen);
        if !self.comments.movetext.is_empty() {
            let _ = writeln!(out, "Move: {}", self.comments.movetext);
        }
        if !self.comments.preceding.is_empty() {
            let _ = writeln!(out, "{}", self.comments.preceding);
        }
        if !self.comments.trailing.is_empty() {
            let _ = writeln!(out, "{}", self.comments.trailing);
        }
        out
    }
}

fn cell_text(cell: &CellView) -> String {
    match cell.link {
        Some(link) if cell.classes.iter().any(|c| c == "alt") => {
            format!("{} [{}]", cell.text, link.target)
        }
        _ => cell.text.clone(),
    }
}

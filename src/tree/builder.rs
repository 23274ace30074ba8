//! Single-pass construction of the game tree from a token stream.
//!
//! The interpretation of a move depends on the token immediately before it: after a variation
//! opening the move is an alternative at the branch point recorded for the new depth, after a
//! variation closing it continues the line that was interrupted, and otherwise it continues from
//! the node created last. Bookkeeping is kept per nesting depth because the walk returns to
//! shallower depths and resumes them.

use std::collections::BTreeSet;

use log::{debug, info};

use super::position::MoveApplier;
use super::types::{Edge, GameTree, Node, NodeId, Origin, ROOT_NODE_ID};
use crate::error::Error;
use crate::pgn::{tokenize_first_game, MoveText, Token, TokenKind};

#[derive(Debug, Clone, Copy)]
struct DepthState {
    half_move: u32,
    originating: NodeId,
    latest_mainline_destination: Option<NodeId>,
}

/// Variation marker seen since the last move, if any. Survives an intervening comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    None,
    Opened,
    Closed,
}

struct TreeBuilder<'a, A: MoveApplier + ?Sized> {
    applier: &'a A,
    nodes: Vec<Node>,
    nonterminal_ids: BTreeSet<NodeId>,
    max_out_degree: usize,
    depth: usize,
    levels: Vec<DepthState>,
    last: TokenKind,
    branch: Branch,
    pending_comment: Option<String>,
    last_created: NodeId,
    /// (node, edge index) of the edge created last.
    last_edge: Option<(NodeId, usize)>,
}

impl<'a, A: MoveApplier + ?Sized> TreeBuilder<'a, A> {
    fn new(applier: &'a A) -> Self {
        let root = Node {
            id: ROOT_NODE_ID,
            depth: 0,
            half_move_number: 1,
            origin: None,
            preceding_comment: None,
            comment: None,
            position_key: applier.initial_position(),
            edges: Vec::new(),
        };
        Self {
            applier,
            nodes: vec![root],
            nonterminal_ids: BTreeSet::new(),
            max_out_degree: 0,
            depth: 0,
            levels: vec![DepthState {
                half_move: 1,
                originating: ROOT_NODE_ID,
                latest_mainline_destination: None,
            }],
            last: TokenKind::Start,
            branch: Branch::None,
            pending_comment: None,
            last_created: ROOT_NODE_ID,
            last_edge: None,
        }
    }

    fn seen_move(&self) -> bool {
        self.last_edge.is_some()
    }

    fn malformed(&self, reason: &str, token: &Token) -> Error {
        Error::MalformedSequence {
            reason: reason.to_string(),
            token: token.to_string(),
            half_move: self.levels[self.depth].half_move,
        }
    }

    fn consume(&mut self, token: &Token) -> Result<(), Error> {
        debug!("depth {} after {:?}: {}", self.depth, self.last, token);
        if !self.seen_move() && !matches!(token, Token::Move(_) | Token::Comment(_)) {
            return Err(self.malformed("token encountered before the first move", token));
        }
        match token {
            Token::Move(text) => self.push_move(text, token)?,
            Token::Nag(code) => self.push_nag(*code, token)?,
            Token::Comment(text) => self.push_comment(text, token)?,
            Token::VariationOpen => self.open_variation(token)?,
            Token::VariationClose => self.close_variation(token)?,
        }
        self.last = token.kind();
        Ok(())
    }

    fn push_move(&mut self, text: &MoveText, token: &Token) -> Result<(), Error> {
        let depth = self.depth;
        match self.branch {
            // Depth and half-move number were set up when the variation opened.
            Branch::Opened => {}
            Branch::Closed => {
                let latest = self.levels[depth].latest_mainline_destination.ok_or_else(|| {
                    self.malformed("no line to resume after closing a variation", token)
                })?;
                let level = &mut self.levels[depth];
                level.half_move += 1;
                level.originating = latest;
            }
            Branch::None => {
                let last_created = self.last_created;
                let level = &mut self.levels[depth];
                level.half_move += 1;
                level.originating = last_created;
            }
        }
        self.branch = Branch::None;

        let DepthState {
            half_move,
            originating,
            ..
        } = self.levels[depth];
        let position_key = self
            .applier
            .apply(&self.nodes[originating].position_key, text.machine())?;

        let id = self.nodes.len();
        let origin_node = &mut self.nodes[originating];
        let choice_index = origin_node.edges.len();
        origin_node.edges.push(Edge {
            notation: text.clone(),
            annotations: Vec::new(),
            destination: id,
            reference_index: choice_index,
        });
        self.max_out_degree = self.max_out_degree.max(origin_node.edges.len());
        self.nonterminal_ids.insert(originating);

        self.nodes.push(Node {
            id,
            depth,
            half_move_number: half_move,
            origin: Some(Origin {
                node_id: originating,
                choice_index,
            }),
            preceding_comment: self.pending_comment.take(),
            comment: None,
            position_key,
            edges: Vec::new(),
        });

        self.levels[depth].latest_mainline_destination = Some(id);
        self.last_created = id;
        self.last_edge = Some((originating, choice_index));
        Ok(())
    }

    fn push_nag(&mut self, code: u8, token: &Token) -> Result<(), Error> {
        if self.last != TokenKind::Move {
            return Err(self.malformed("annotation does not follow a move", token));
        }
        if let Some((node_id, index)) = self.last_edge {
            self.nodes[node_id].edges[index].annotations.push(code);
        }
        Ok(())
    }

    fn push_comment(&mut self, text: &str, token: &Token) -> Result<(), Error> {
        match self.last {
            TokenKind::Comment => {
                return Err(self.malformed("comment immediately follows another comment", token))
            }
            TokenKind::VariationClose => {
                return Err(self.malformed("comment immediately follows a variation close", token))
            }
            _ => {}
        }
        if !self.seen_move() {
            self.nodes[ROOT_NODE_ID].comment = Some(text.to_string());
        } else if self.last == TokenKind::VariationOpen {
            self.pending_comment = Some(text.to_string());
        } else {
            self.nodes[self.last_created].comment = Some(text.to_string());
        }
        Ok(())
    }

    fn open_variation(&mut self, token: &Token) -> Result<(), Error> {
        if self.last == TokenKind::VariationOpen {
            return Err(self.malformed("two consecutive variation openings", token));
        }
        // Only a comment can sit between the two openings; the outer variation would have no move.
        if self.branch == Branch::Opened {
            return Err(self.malformed("variation opens before its enclosing variation has a move", token));
        }
        // An alternative shares its parent's branch point and ply.
        let parent = self.levels[self.depth];
        self.depth += 1;
        let level = DepthState {
            half_move: parent.half_move,
            originating: parent.originating,
            latest_mainline_destination: None,
        };
        if self.levels.len() > self.depth {
            self.levels[self.depth] = level;
        } else {
            self.levels.push(level);
        }
        self.branch = Branch::Opened;
        Ok(())
    }

    fn close_variation(&mut self, token: &Token) -> Result<(), Error> {
        if self.depth == 0 {
            return Err(self.malformed("variation close without a matching open", token));
        }
        // Tentative: an immediately following opening re-enters this depth for a sibling.
        self.depth -= 1;
        self.branch = Branch::Closed;
        Ok(())
    }

    fn finish(self) -> Result<GameTree, Error> {
        if self.depth != 0 {
            return Err(Error::MalformedSequence {
                reason: format!("{} variation(s) left open at end of stream", self.depth),
                token: "end of stream".to_string(),
                half_move: self.levels[self.depth].half_move,
            });
        }
        Ok(GameTree {
            nodes: self.nodes,
            nonterminal_ids: self.nonterminal_ids,
            max_out_degree: self.max_out_degree,
        })
    }
}

impl GameTree {
    /// Build the tree from a token stream in one pass. Fails on the first malformed token or
    /// rejected move; no partial tree is returned.
    pub fn build<A: MoveApplier + ?Sized>(tokens: &[Token], applier: &A) -> Result<GameTree, Error> {
        let mut builder = TreeBuilder::new(applier);
        for token in tokens {
            builder.consume(token)?;
        }
        let tree = builder.finish()?;
        info!(
            "Built game tree: {} nodes, {} lines, max out-degree {}",
            tree.len(),
            tree.len() - tree.nonterminal_ids.len(),
            tree.max_out_degree
        );
        Ok(tree)
    }

    /// Tokenize the first game of `pgn` and build its tree.
    pub fn from_pgn<A: MoveApplier + ?Sized>(pgn: &str, applier: &A) -> Result<GameTree, Error> {
        let game = tokenize_first_game(pgn)?;
        Self::build(&game.tokens, applier)
    }
}

//! Shared fixtures for unit tests.

use crate::error::Error;
use crate::pgn::{MoveText, Token};
use crate::tree::{GameTree, MoveApplier, Node, ShakmatyApplier};

/// Node ids of [`DEMO_PGN`], in creation order:
///
/// ```text
///  0 root      1 e4        2 e5        3 c5        4 Nf3 (Sicilian)
///  5 d6        6 Nc6       7 d4        8 d4        9 e6
/// 10 d4       11 d5       12 Nf3      13 Nc6      14 Bb5
/// 15 Bc4      16 Bc5      17 a6
/// ```
pub const DEMO_PGN: &str = "[Event \"Demo\"]
[White \"White\"]
[Black \"Black\"]

{A short repertoire} 1. e4 e5 (1... c5 {Sicilian} 2. Nf3 d6 (2... Nc6 3. d4) 3. d4) (1... e6 2. d4 d5) 2. Nf3 Nc6 3. Bb5 $1 (3. Bc4 Bc5) 3... a6 *
";

pub fn demo_tree() -> GameTree {
    GameTree::from_pgn(DEMO_PGN, &ShakmatyApplier).unwrap()
}

pub fn tree_from_pgn(pgn: &str) -> GameTree {
    GameTree::from_pgn(pgn, &ShakmatyApplier).unwrap()
}

/// Applier that records the move sequence instead of computing chess positions.
pub struct TraceApplier;

impl MoveApplier for TraceApplier {
    fn initial_position(&self) -> String {
        "start".to_string()
    }

    fn apply(&self, position: &str, uci: &str) -> Result<String, Error> {
        Ok(format!("{} {}", position, uci))
    }
}

/// Applier that rejects one specific move.
pub struct RejectingApplier(pub &'static str);

impl MoveApplier for RejectingApplier {
    fn initial_position(&self) -> String {
        "start".to_string()
    }

    fn apply(&self, position: &str, uci: &str) -> Result<String, Error> {
        if uci == self.0 {
            return Err(Error::MoveApplication {
                position: position.to_string(),
                uci: uci.to_string(),
                reason: "rejected".to_string(),
            });
        }
        Ok(format!("{} {}", position, uci))
    }
}

pub fn mv(text: &str) -> Token {
    Token::Move(MoveText::new(text, text, text))
}

pub fn comment(text: &str) -> Token {
    Token::Comment(text.to_string())
}

/// Every non-root node is the destination of the edge it claims to come from, and the terminal
/// set is exactly the nodes without edges.
pub fn assert_tree_invariants(tree: &GameTree) {
    for node in tree.nodes() {
        if let Some(origin) = node.origin {
            let parent = tree.node(origin.node_id).unwrap();
            assert_eq!(parent.edges[origin.choice_index].destination, node.id);
            assert_eq!(parent.edges[origin.choice_index].reference_index, origin.choice_index);
        } else {
            assert_eq!(node.id, 0);
        }
        assert_eq!(tree.nonterminal_ids().contains(&node.id), !node.edges.is_empty());
    }
    let terminal: Vec<usize> = tree.terminal_ids().into_iter().collect();
    let expected: Vec<usize> = tree
        .nodes()
        .filter(|n: &&Node| n.edges.is_empty())
        .map(|n| n.id)
        .collect();
    assert_eq!(terminal, expected);
}

//! Token types fed to the tree builder.
//!
//! A game is reduced to a flat, order-dependent stream of five token kinds. The builder relies on
//! adjacency between tokens (what came immediately before a move), so the stream is kept exactly in
//! the order the movetext was read.

use std::fmt;

use serde::{Deserialize, Serialize};
use shakmaty::{
    san::{SanPlus, Suffix},
    CastlingMode, CastlingSide, Chess, Move, Role,
};

/// Alternative textual representations of a single move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveText {
    /// Standard algebraic notation, e.g. `Nf3`.
    pub san: String,
    /// Long algebraic notation, e.g. `Ng1-f3`.
    pub lan: String,
    /// UCI notation, e.g. `g1f3`. Used to recompute positions.
    pub uci: String,
}

impl MoveText {
    pub fn new(san: impl Into<String>, lan: impl Into<String>, uci: impl Into<String>) -> Self {
        Self {
            san: san.into(),
            lan: lan.into(),
            uci: uci.into(),
        }
    }

    /// Describe a legal move played from `position`.
    pub fn describe(position: &Chess, m: &Move) -> Self {
        let mut after = position.clone();
        let san_plus = SanPlus::from_move_and_play_unchecked(&mut after, m);
        Self {
            san: san_plus.to_string(),
            lan: long_algebraic(m, san_plus.suffix),
            uci: m.to_uci(CastlingMode::Standard).to_string(),
        }
    }

    /// Text shown when the move sits on the displayed main line.
    pub fn mainline(&self) -> &str {
        &self.san
    }

    /// Text shown when the move is listed as an alternative.
    pub fn alternative(&self) -> &str {
        &self.san
    }

    /// Text shown above the comments of a focused position.
    pub fn comment_heading(&self) -> &str {
        &self.lan
    }

    /// Machine-readable move identifier handed to the move applier.
    pub fn machine(&self) -> &str {
        &self.uci
    }
}

fn long_algebraic(m: &Move, suffix: Option<Suffix>) -> String {
    let mut lan = match m.castling_side() {
        Some(CastlingSide::KingSide) => "O-O".to_string(),
        Some(CastlingSide::QueenSide) => "O-O-O".to_string(),
        None => {
            let mut lan = String::new();
            if m.role() != Role::Pawn {
                lan.push(m.role().upper_char());
            }
            if let Some(from) = m.from() {
                lan.push_str(&from.to_string());
            }
            lan.push(if m.is_capture() { 'x' } else { '-' });
            lan.push_str(&m.to().to_string());
            if let Some(promotion) = m.promotion() {
                lan.push('=');
                lan.push(promotion.upper_char());
            }
            lan
        }
    };
    if let Some(suffix) = suffix {
        lan.push_str(&suffix.to_string());
    }
    lan
}

/// One element of the movetext stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Token {
    Move(MoveText),
    /// Numeric annotation glyph code (`$n`).
    Nag(u8),
    Comment(String),
    VariationOpen,
    VariationClose,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Move(_) => TokenKind::Move,
            Token::Nag(_) => TokenKind::Nag,
            Token::Comment(_) => TokenKind::Comment,
            Token::VariationOpen => TokenKind::VariationOpen,
            Token::VariationClose => TokenKind::VariationClose,
        }
    }

    pub fn is_move(&self) -> bool {
        matches!(self, Token::Move(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Move(text) => write!(f, "{}", text.san),
            Token::Nag(code) => write!(f, "${}", code),
            Token::Comment(text) => write!(f, "{{{}}}", text),
            Token::VariationOpen => write!(f, "("),
            Token::VariationClose => write!(f, ")"),
        }
    }
}

/// Payload-free discriminant of [`Token`], used for adjacency checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Start of stream; no token seen yet.
    Start,
    Move,
    Nag,
    Comment,
    VariationOpen,
    VariationClose,
}

/// Headers and movetext tokens of a single game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizedGame {
    pub headers: Vec<(String, String)>,
    pub tokens: Vec<Token>,
}

impl TokenizedGame {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn move_count(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_move()).count()
    }
}

/// One human-readable line per token.
pub fn describe_tokens(tokens: &[Token]) -> Vec<String> {
    tokens
        .iter()
        .map(|token| match token {
            Token::Move(text) => format!("» MOVE » {}, {}, {}", text.san, text.lan, text.uci),
            Token::Nag(code) => format!("» NAG » ${}", code),
            Token::Comment(text) => format!("» COMMENT » “{}”", text),
            Token::VariationOpen | Token::VariationClose => {
                format!("» VARIATION DELIMITER: {}", token)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::{uci::UciMove, Position};

    fn describe_uci(position: &Chess, uci: &str) -> MoveText {
        let uci = UciMove::from_ascii(uci.as_bytes()).unwrap();
        let m = uci.to_move(position).unwrap();
        MoveText::describe(position, &m)
    }

    #[test]
    fn test_describe_pawn_and_piece_moves() {
        let start = Chess::default();
        assert_eq!(describe_uci(&start, "e2e4"), MoveText::new("e4", "e2-e4", "e2e4"));
        assert_eq!(describe_uci(&start, "g1f3"), MoveText::new("Nf3", "Ng1-f3", "g1f3"));
    }

    #[test]
    fn test_describe_capture_with_check() {
        // 1. e4 d5 2. exd5 Qxd5 3. Nc3 Qe5+
        let mut pos = Chess::default();
        for uci in ["e2e4", "d7d5", "e4d5", "d8d5", "b1c3"] {
            let m = UciMove::from_ascii(uci.as_bytes()).unwrap().to_move(&pos).unwrap();
            pos.play_unchecked(&m);
        }
        let text = describe_uci(&pos, "d5e5");
        assert_eq!(text.san, "Qe5+");
        assert_eq!(text.lan, "Qd5-e5+");

        let mut pos = Chess::default();
        for uci in ["e2e4", "d7d5"] {
            let m = UciMove::from_ascii(uci.as_bytes()).unwrap().to_move(&pos).unwrap();
            pos.play_unchecked(&m);
        }
        assert_eq!(describe_uci(&pos, "e4d5").lan, "e4xd5");
    }

    #[test]
    fn test_token_display_and_kind() {
        assert_eq!(Token::Nag(14).to_string(), "$14");
        assert_eq!(Token::VariationOpen.to_string(), "(");
        assert_eq!(Token::Comment("sharp".into()).to_string(), "{sharp}");
        assert_eq!(Token::VariationClose.kind(), TokenKind::VariationClose);
        assert!(Token::Move(MoveText::new("e4", "e2-e4", "e2e4")).is_move());
    }

    #[test]
    fn test_describe_tokens() {
        let lines = describe_tokens(&[
            Token::Move(MoveText::new("e4", "e2-e4", "e2e4")),
            Token::Nag(1),
            Token::VariationOpen,
        ]);
        assert_eq!(lines[0], "» MOVE » e4, e2-e4, e2e4");
        assert_eq!(lines[1], "» NAG » $1");
        assert_eq!(lines[2], "» VARIATION DELIMITER: (");
    }
}

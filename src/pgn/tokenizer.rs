//! PGN movetext to token stream.
//!
//! The reader handles header stripping, comment braces and move numbers. This visitor only keeps a
//! stack of positions so that every SAN can be resolved into its LAN and UCI forms.

use log::{debug, log_enabled, warn, Level};
use pgn_reader::{BufferedReader, Nag, RawComment, RawHeader, SanPlus, Skip, Visitor};
use shakmaty::{Chess, Color, Position};

use super::tokens::{describe_tokens, MoveText, Token, TokenizedGame};
use crate::error::Error;

/// Ply number of the next move to be played from `position`.
fn next_half_move(position: &Chess) -> u32 {
    let base = (position.fullmoves().get() - 1) * 2;
    match position.turn() {
        Color::White => base + 1,
        Color::Black => base + 2,
    }
}

/// Visitor collecting the tokens of a single game.
pub struct PgnTokenizer {
    game: TokenizedGame,
    /// Position before the most recent move at the current nesting level.
    before: Chess,
    current: Chess,
    stack: Vec<(Chess, Chess)>,
    error: Option<Error>,
}

impl PgnTokenizer {
    pub fn new() -> Self {
        Self {
            game: TokenizedGame::default(),
            before: Chess::default(),
            current: Chess::default(),
            stack: Vec::new(),
            error: None,
        }
    }
}

impl Default for PgnTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Visitor for PgnTokenizer {
    type Result = Result<TokenizedGame, Error>;

    fn begin_game(&mut self) {
        *self = Self::new();
    }

    fn header(&mut self, key: &[u8], value: RawHeader<'_>) {
        let key = String::from_utf8_lossy(key).into_owned();
        if key == "FEN" || key == "SetUp" {
            warn!("Ignoring {} header; games always start from the initial position", key);
        }
        self.game
            .headers
            .push((key, value.decode_utf8_lossy().into_owned()));
    }

    fn san(&mut self, san_plus: SanPlus) {
        if self.error.is_some() {
            return;
        }
        match san_plus.san.to_move(&self.current) {
            Ok(m) => {
                let text = MoveText::describe(&self.current, &m);
                self.before = self.current.clone();
                self.current.play_unchecked(&m);
                self.game.tokens.push(Token::Move(text));
            }
            Err(e) => {
                debug!("Cannot resolve {}: {}", san_plus, e);
                self.error = Some(Error::IllegalSan {
                    san: san_plus.to_string(),
                    half_move: next_half_move(&self.current),
                });
            }
        }
    }

    fn nag(&mut self, nag: Nag) {
        self.game.tokens.push(Token::Nag(nag.0));
    }

    fn comment(&mut self, comment: RawComment<'_>) {
        let text = String::from_utf8_lossy(comment.as_bytes()).trim().to_string();
        if !text.is_empty() {
            self.game.tokens.push(Token::Comment(text));
        }
    }

    fn begin_variation(&mut self) -> Skip {
        // A variation replaces the move just played, so rewind by one move.
        self.stack.push((self.before.clone(), self.current.clone()));
        self.current = self.before.clone();
        self.game.tokens.push(Token::VariationOpen);
        Skip(false)
    }

    fn end_variation(&mut self) {
        if let Some((before, current)) = self.stack.pop() {
            self.before = before;
            self.current = current;
        }
        self.game.tokens.push(Token::VariationClose);
    }

    fn end_game(&mut self) -> Self::Result {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        let game = std::mem::take(&mut self.game);
        if game.move_count() == 0 {
            return Err(Error::NoMovetext);
        }
        Ok(game)
    }
}

/// Tokenize the first game found in `pgn`. Any further games are ignored.
pub fn tokenize_first_game(pgn: &str) -> Result<TokenizedGame, Error> {
    let mut reader = BufferedReader::new_cursor(pgn.as_bytes());
    let mut tokenizer = PgnTokenizer::new();
    let game = reader
        .read_game(&mut tokenizer)?
        .ok_or(Error::NoMovetext)??;
    debug!(
        "Tokenized game: {} headers, {} tokens, {} moves",
        game.headers.len(),
        game.tokens.len(),
        game.move_count()
    );
    if log_enabled!(Level::Debug) {
        for line in describe_tokens(&game.tokens) {
            debug!("{}", line);
        }
    }
    Ok(game)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pgn::tokens::TokenKind;

    fn kinds(game: &TokenizedGame) -> Vec<TokenKind> {
        game.tokens.iter().map(Token::kind).collect()
    }

    #[test]
    fn test_tokenize_with_variations() {
        let pgn = "[Event \"Demo\"]\n[White \"A\"]\n\n1. e4 e5 (1... c5 2. Nf3) 2. Nf3 *\n";
        let game = tokenize_first_game(pgn).unwrap();
        assert_eq!(game.header("Event"), Some("Demo"));
        assert_eq!(
            kinds(&game),
            vec![
                TokenKind::Move,
                TokenKind::Move,
                TokenKind::VariationOpen,
                TokenKind::Move,
                TokenKind::Move,
                TokenKind::VariationClose,
                TokenKind::Move,
            ]
        );
        match &game.tokens[3] {
            Token::Move(text) => assert_eq!(text.uci, "c7c5"),
            other => panic!("unexpected token {:?}", other),
        }
        // Position is restored after the variation closes.
        match &game.tokens[6] {
            Token::Move(text) => assert_eq!(text.lan, "Ng1-f3"),
            other => panic!("unexpected token {:?}", other),
        }
    }

    #[test]
    fn test_tokenize_comments_and_nags() {
        let pgn = "{Opening remarks} 1. e4 $1 {best by test} e5 ({A comment first} 1... c6) *";
        let game = tokenize_first_game(pgn).unwrap();
        assert_eq!(game.tokens[0], Token::Comment("Opening remarks".to_string()));
        assert_eq!(game.tokens[2], Token::Nag(1));
        assert_eq!(game.tokens[3], Token::Comment("best by test".to_string()));
        assert_eq!(game.tokens[5], Token::VariationOpen);
        assert_eq!(game.tokens[6], Token::Comment("A comment first".to_string()));
    }

    #[test]
    fn test_sibling_variations_rewind_to_same_position() {
        let pgn = "1. e4 (1. d4) (1. c4) 1... e5 *";
        let game = tokenize_first_game(pgn).unwrap();
        let ucis: Vec<&str> = game
            .tokens
            .iter()
            .filter_map(|t| match t {
                Token::Move(text) => Some(text.uci.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(ucis, vec!["e2e4", "d2d4", "c2c4", "e7e5"]);
    }

    #[test]
    fn test_only_first_game_is_read() {
        let pgn = "[Event \"One\"]\n\n1. e4 *\n\n[Event \"Two\"]\n\n1. d4 d5 *\n";
        let game = tokenize_first_game(pgn).unwrap();
        assert_eq!(game.move_count(), 1);
    }

    #[test]
    fn test_illegal_san_is_reported() {
        let err = tokenize_first_game("1. e4 e5 2. Ke3 *").unwrap_err();
        match err {
            Error::IllegalSan { san, half_move } => {
                assert_eq!(san, "Ke3");
                assert_eq!(half_move, 3);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_empty_movetext() {
        assert!(matches!(
            tokenize_first_game("[Event \"Nothing\"]\n\n*\n"),
            Err(Error::NoMovetext)
        ));
    }

    #[test]
    fn test_next_half_move() {
        let mut pos = Chess::default();
        assert_eq!(next_half_move(&pos), 1);
        let m = "e4".parse::<shakmaty::san::San>().unwrap().to_move(&pos).unwrap();
        pos.play_unchecked(&m);
        assert_eq!(next_half_move(&pos), 2);
    }
}

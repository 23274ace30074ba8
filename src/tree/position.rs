//! Move application: computes the position reached by playing a move.
//!
//! Positions are carried through the tree as opaque keys. The shakmaty implementation uses FEN.

use shakmaty::{fen::Fen, uci::UciMove, CastlingMode, Chess, EnPassantMode, Position};

use crate::error::Error;

/// Collaborator that computes resulting positions while the tree is built.
pub trait MoveApplier {
    /// Key of the position the game starts from.
    fn initial_position(&self) -> String;

    /// Play `uci` in `position` and return the key of the resulting position.
    fn apply(&self, position: &str, uci: &str) -> Result<String, Error>;
}

/// [`MoveApplier`] backed by shakmaty, keyed by FEN.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShakmatyApplier;

impl ShakmatyApplier {
    fn play(position: &str, uci: &str) -> Result<String, Error> {
        let fen = Fen::from_ascii(position.as_bytes())?;
        let mut chess: Chess = fen.into_position(CastlingMode::Standard)?;
        let uci = UciMove::from_ascii(uci.as_bytes())?;
        let m = uci.to_move(&chess)?;
        chess.play_unchecked(&m);
        Ok(Fen::from_setup(chess.into_setup(EnPassantMode::Legal)).to_string())
    }
}

impl MoveApplier for ShakmatyApplier {
    fn initial_position(&self) -> String {
        Fen::from_setup(Chess::default().into_setup(EnPassantMode::Legal)).to_string()
    }

    fn apply(&self, position: &str, uci: &str) -> Result<String, Error> {
        Self::play(position, uci).map_err(|e| Error::MoveApplication {
            position: position.to_string(),
            uci: uci.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_initial_position() {
        assert_eq!(ShakmatyApplier.initial_position(), START);
    }

    #[test]
    fn test_apply_legal_move() {
        let fen = ShakmatyApplier.apply(START, "e2e4").unwrap();
        assert_eq!(fen, "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1");
    }

    #[test]
    fn test_apply_illegal_move_fails() {
        let err = ShakmatyApplier.apply(START, "e2e5").unwrap_err();
        match err {
            Error::MoveApplication { uci, position, .. } => {
                assert_eq!(uci, "e2e5");
                assert_eq!(position, START);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_apply_rejects_garbage_position() {
        assert!(matches!(
            ShakmatyApplier.apply("not a fen", "e2e4"),
            Err(Error::MoveApplication { .. })
        ));
    }
}

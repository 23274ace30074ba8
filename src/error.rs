use serde::Serialize;

use crate::tree::NodeId;

/// Error type shared by the tokenizer, the tree builder, the traversal code and the service.
///
/// Nothing in this crate retries. Build-time variants abort the build and no partial tree is
/// ever returned to the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed token sequence at half-move {half_move}: {reason} (token: {token})")]
    MalformedSequence {
        reason: String,
        token: String,
        half_move: u32,
    },

    #[error("Unknown node id: {0}")]
    UnknownNode(NodeId),

    #[error("Cannot apply move {uci} to position {position}: {reason}")]
    MoveApplication {
        position: String,
        uci: String,
        reason: String,
    },

    #[error("Illegal move {san} at half-move {half_move}")]
    IllegalSan { san: String, half_move: u32 },

    #[error("No movetext found in PGN")]
    NoMovetext,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("FEN parsing error: {0}")]
    FenParsing(#[from] shakmaty::fen::ParseFenError),

    #[error("Position setup error: {0}")]
    PositionSetup(#[from] shakmaty::PositionError<shakmaty::Chess>),

    #[error("UCI move parsing error: {0}")]
    UciMoveParsing(#[from] shakmaty::uci::ParseUciMoveError),

    #[error("Illegal UCI move: {0}")]
    IllegalUciMove(#[from] shakmaty::uci::IllegalUciMoveError),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    /// True for errors caused by the caller's input rather than by the game source.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::UnknownNode(_))
    }
}

impl Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}

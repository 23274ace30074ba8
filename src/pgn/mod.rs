//! PGN reading: turns the first game of a PGN document into a flat token stream.

pub mod tokenizer;
pub mod tokens;

pub use tokenizer::{tokenize_first_game, PgnTokenizer};
pub use tokens::{describe_tokens, MoveText, Token, TokenKind, TokenizedGame};

//! Error taxonomy for the engine/collaborator boundary.
//!
//! Board-level parsing errors are composed in via `From`; the remaining
//! variants cover collaborator I/O (book, tablebase, NNUE file loads) and a
//! `Corruption` case for data that parsed but didn't make sense (a Polyglot
//! move that decodes to no legal move, a truncated NNUE header, ...).

use std::fmt;
use std::io;

use crate::board::{FenError, MoveParseError};

#[derive(Debug)]
pub enum EngineError {
    FenParseError(FenError),
    InvalidMove(MoveParseError),
    BookIoError(io::Error),
    TbIoError(io::Error),
    NnueIoError(io::Error),
    Corruption(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::FenParseError(e) => write!(f, "FEN parse error: {e}"),
            EngineError::InvalidMove(e) => write!(f, "invalid move: {e}"),
            EngineError::BookIoError(e) => write!(f, "opening book I/O error: {e}"),
            EngineError::TbIoError(e) => write!(f, "tablebase I/O error: {e}"),
            EngineError::NnueIoError(e) => write!(f, "NNUE network I/O error: {e}"),
            EngineError::Corruption(msg) => write!(f, "corrupt collaborator data: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::FenParseError(e) => Some(e),
            EngineError::InvalidMove(e) => Some(e),
            EngineError::BookIoError(e) | EngineError::TbIoError(e) | EngineError::NnueIoError(e) => {
                Some(e)
            }
            EngineError::Corruption(_) => None,
        }
    }
}

impl From<FenError> for EngineError {
    fn from(e: FenError) -> Self {
        EngineError::FenParseError(e)
    }
}

impl From<MoveParseError> for EngineError {
    fn from(e: MoveParseError) -> Self {
        EngineError::InvalidMove(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_wraps_source_message() {
        let err = EngineError::Corruption("polyglot move decoded to no legal move".to_string());
        assert!(err.to_string().contains("polyglot move"));
    }
}

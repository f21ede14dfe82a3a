use thiserror::Error;

use crate::search::time_management::DurationParseError;

pub type ChessResult<T> = Result<T, ChessError>;

/// Represents all error kinds surfaced by the engine core.
///
/// Input problems (`InvalidDuration`, `InvalidFen`, `InvalidMove`,
/// `InvalidOption`) are reported before any search work begins.
/// `InvariantViolation` means a corrupted position and aborts the search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    #[error("invalid duration: {0}")]
    InvalidDuration(#[from] DurationParseError),

    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("invalid move: {0}")]
    InvalidMove(String),

    #[error("invalid option {name}={value}: {reason}")]
    InvalidOption {
        name: String,
        value: String,
        reason: String,
    },

    #[error("position invariant violated: {0}")]
    InvariantViolation(String),
}

impl ChessError {
    #[inline]
    pub fn is_input_error(&self) -> bool {
        !matches!(self, ChessError::InvariantViolation(_))
    }
}

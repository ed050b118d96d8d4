//! Error types for the chess core.
//!
//! Three failure kinds cross the public boundary; everything else is a
//! precondition violation reported through debug assertions.

use thiserror::Error;

/// Errors surfaced by board queries and game mutations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChessError {
    /// Index query outside the board.
    #[error("position ({row}, {col}) is outside the board")]
    OutOfBounds { row: i32, col: i32 },

    /// Rejected move request: bad source, or no legal move matches (src, dst).
    #[error("invalid move: ({from_row}, {from_col}) to ({to_row}, {to_col})")]
    InvalidMove {
        from_row: i32,
        from_col: i32,
        to_row: i32,
        to_col: i32,
    },

    /// Undo requested with an empty move history.
    #[error("no move to undo")]
    InvalidUndo,
}

/// Result type alias for chess core operations.
pub type ChessResult<T> = Result<T, ChessError>;

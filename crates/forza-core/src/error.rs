//! Error types for move-sequence parsing and board-code decoding.

/// Errors from building or parsing a move sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveSeqError {
    /// A character in a move string is not a decimal digit.
    #[error("invalid move character {character:?} at ply {ply}")]
    InvalidMoveChar {
        /// The offending character.
        character: char,
        /// Zero-based position within the sequence.
        ply: usize,
    },
    /// A column index is 7 or greater.
    #[error("column {column} out of range at ply {ply}")]
    ColumnOutOfRange {
        /// The offending column index.
        column: u8,
        /// Zero-based position within the sequence.
        ply: usize,
    },
    /// A column already holds six stones.
    #[error("column {column} is full at ply {ply}")]
    ColumnFull {
        /// The full column.
        column: u8,
        /// Zero-based position within the sequence.
        ply: usize,
    },
}

/// Errors from decoding a 49-bit board code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A column field holds a code no column configuration produces.
    #[error("invalid column code {code} in column {column}")]
    InvalidColumnCode {
        /// The offending column.
        column: usize,
        /// The 7-bit code found there.
        code: u8,
    },
    /// The board code does not fit in 49 bits.
    #[error("board code {board:#x} exceeds 49 bits")]
    CodeOutOfRange {
        /// The offending code.
        board: u64,
    },
}

//! Core Connect-Four types: players, move sequences, and the 49-bit board
//! code with its 42-cell display form.

mod codec;
mod error;
mod moveseq;
mod player;

/// Board width in columns.
pub const WIDTH: usize = 7;
/// Board height in rows.
pub const HEIGHT: usize = 6;
/// Total number of cells.
pub const CELLS: usize = WIDTH * HEIGHT;
/// Maximum number of moves in a game.
pub const MAX_PLIES: usize = CELLS;

pub use codec::{BOARD_BITS, Grid, PrettyGrid};
pub use error::{DecodeError, MoveSeqError};
pub use moveseq::MoveSeq;
pub use player::Player;

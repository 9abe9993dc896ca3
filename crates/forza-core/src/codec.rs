//! Decoding 49-bit board codes back into display grids.
//!
//! The encoding packs one 7-bit code per column: `(2^h - 1) + pattern`,
//! where `h` is the column height and bit `i` of `pattern` (bottom = 0) is
//! set for an O stone. Codes 0..=126 are exactly the 127 reachable column
//! configurations; 127 never appears. The inverse is
//! `h = floor(log2(code + 1))`, `pattern = code - (2^h - 1)`.

use std::fmt;

use crate::error::DecodeError;
use crate::moveseq::MoveSeq;
use crate::player::Player;
use crate::{CELLS, HEIGHT, WIDTH};

/// Number of bits a board code occupies.
pub const BOARD_BITS: u32 = 49;

/// Highest valid column code: a full column of O stones.
const MAX_COL_CODE: u64 = (1 << (HEIGHT + 1)) - 2;

/// A 42-cell board, rows top-to-bottom, columns left-to-right.
///
/// Display form only: the search works on [`MoveSeq`] and board codes, and
/// decodes to a `Grid` for diagnostics and the shutdown scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    cells: [Option<Player>; CELLS],
}

impl Grid {
    /// The empty board.
    pub fn empty() -> Self {
        Self { cells: [None; CELLS] }
    }

    /// Rebuild the cell grid from a 49-bit board code.
    pub fn decode(board: u64) -> Result<Self, DecodeError> {
        if board >= 1 << BOARD_BITS {
            return Err(DecodeError::CodeOutOfRange { board });
        }

        let mut cells = [None; CELLS];
        for col in 0..WIDTH {
            let code = (board >> (7 * col)) & 0x7F;
            if code > MAX_COL_CODE {
                return Err(DecodeError::InvalidColumnCode { column: col, code: code as u8 });
            }

            let h = (code + 1).ilog2() as usize;
            let pattern = code - ((1 << h) - 1);
            for i in 0..h {
                let row = HEIGHT - 1 - i;
                let player = if (pattern >> i) & 1 == 1 { Player::O } else { Player::X };
                cells[row * WIDTH + col] = Some(player);
            }
        }
        Ok(Self { cells })
    }

    /// Build the grid by straightforward row/column simulation of a move
    /// sequence. Reference implementation for the codec round-trip.
    pub fn from_moves(moves: &MoveSeq) -> Self {
        let mut cells = [None; CELLS];
        let mut heights = [0usize; WIDTH];
        for (ply, &col) in moves.moves().iter().enumerate() {
            let c = col as usize;
            let row = HEIGHT - 1 - heights[c];
            cells[row * WIDTH + c] = Some(Player::from_ply(ply));
            heights[c] += 1;
        }
        Self { cells }
    }

    /// The cell at `row` (0 = top) and `col` (0 = left).
    pub fn get(&self, row: usize, col: usize) -> Option<Player> {
        self.cells[row * WIDTH + col]
    }

    /// Number of occupied cells: the ply of the position.
    pub fn stone_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Multi-line rendering for diagnostics.
    pub fn pretty(&self) -> PrettyGrid<'_> {
        PrettyGrid(self)
    }
}

impl fmt::Display for Grid {
    /// The flat 42-character string over `{'.', 'x', 'o'}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cell in &self.cells {
            match cell {
                Some(player) => write!(f, "{}", player.glyph())?,
                None => write!(f, ".")?,
            }
        }
        Ok(())
    }
}

/// Wrapper for pretty-printing a grid as a 6x7 block.
pub struct PrettyGrid<'a>(&'a Grid);

impl fmt::Display for PrettyGrid<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..HEIGHT {
            for col in 0..WIDTH {
                let c = match self.0.get(row, col) {
                    Some(player) => player.glyph(),
                    None => '.',
                };
                if col < WIDTH - 1 {
                    write!(f, "{c} ")?;
                } else {
                    write!(f, "{c}")?;
                }
            }
            writeln!(f)?;
        }
        write!(f, "0 1 2 3 4 5 6")
    }
}

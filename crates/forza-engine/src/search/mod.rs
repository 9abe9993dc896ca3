//! Search: the oracle-guided driver and its transposition table.

pub mod driver;
pub mod tt;

use forza_core::{DecodeError, Grid, MAX_PLIES};

use tt::TranspositionTable;

/// Bin every cached position by ply, 0..=42.
///
/// The shutdown scan: each occupied slot's key decodes back to a board
/// whose stone count is the position's depth.
pub fn ply_histogram(tt: &TranspositionTable) -> Result<[u64; MAX_PLIES + 1], DecodeError> {
    let mut counts = [0u64; MAX_PLIES + 1];
    for (key, _) in tt.occupied() {
        let grid = Grid::decode(key)?;
        counts[grid.stone_count()] += 1;
    }
    Ok(counts)
}

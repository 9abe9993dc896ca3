//! Search and caching for the forza solver.

pub mod search;

pub use search::driver::{Bounds, MOVE_ORDER, SearchError, Solver};
pub use search::ply_histogram;
pub use search::tt::{TableError, TranspositionTable};

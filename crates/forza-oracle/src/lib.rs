//! The WDL oracle: compact line protocol and subprocess handle.

mod error;
mod protocol;
mod server;

pub use error::OracleError;
pub use protocol::{WdlResponse, parse_compact_line};
pub use server::WdlServer;

use forza_core::MoveSeq;

/// A win/draw/loss oracle for Connect-Four positions.
///
/// For the position reached by `moves`, a query reports whether the game
/// is over there and, for each playable column, the value of playing it
/// from the mover's perspective. The search driver is generic over this
/// trait; the production implementation is [`WdlServer`].
pub trait Oracle {
    /// Look up the position reached by `moves`.
    fn query(&mut self, moves: &MoveSeq) -> Result<WdlResponse, OracleError>;
}

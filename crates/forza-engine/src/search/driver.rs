//! The oracle-guided negamax driver.
//!
//! The oracle answers every per-move value exactly, so the recursion does
//! not discover the root value so much as prove it, visiting and caching
//! every node the proof touches. The window logic still follows the
//! classical PVS shape: the first best child is verified with a null
//! window, siblings with the full window, and fail-high nodes store
//! lower-bound records. That keeps the cached bounds classified correctly
//! and keeps the driver usable should the oracle ever be replaced by a
//! heuristic evaluator.

use tracing::debug;

use forza_core::{MAX_PLIES, MoveSeq, MoveSeqError, WIDTH};
use forza_oracle::{Oracle, OracleError, WdlResponse};

use crate::search::tt::{TableError, TranspositionTable};

/// Column preference, center outward. Used both to pick the first child
/// and to iterate the remaining children.
pub const MOVE_ORDER: [usize; WIDTH] = [3, 2, 4, 1, 5, 0, 6];

/// Errors that abort a search run.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// A move could not be applied to the internal stack.
    #[error(transparent)]
    Moves(#[from] MoveSeqError),

    /// The oracle failed or answered out of protocol.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// The transposition table rejected an access.
    #[error(transparent)]
    Table(#[from] TableError),

    /// The oracle reported a non-terminal position with no legal column.
    #[error("no legal child at \"{moves}\"")]
    NoChildren {
        /// The position's move sequence.
        moves: String,
    },

    /// A recursive result disagreed with the oracle's predicted value.
    #[error(
        "child {column} of \"{moves}\": oracle predicted {expected}, search returned {got}"
    )]
    ChildMismatch {
        /// The parent position's move sequence.
        moves: String,
        /// The child column.
        column: usize,
        /// The oracle's value for the child.
        expected: i8,
        /// The recursion's value for the child.
        got: i8,
    },

    /// A fail-high child came back below the cutoff bound.
    #[error("cutoff child {column} of \"{moves}\" returned {got}, below beta {beta}")]
    CutoffBelowBeta {
        /// The parent position's move sequence.
        moves: String,
        /// The child column.
        column: usize,
        /// The recursion's value for the child.
        got: i8,
        /// The cutoff bound.
        beta: i8,
    },

    /// A null-window verification came back at or above beta.
    #[error("pv child {column} of \"{moves}\" returned {got}, at or above beta {beta}")]
    PvChildAtBeta {
        /// The parent position's move sequence.
        moves: String,
        /// The child column.
        column: usize,
        /// The recursion's value for the child.
        got: i8,
        /// The window's upper bound.
        beta: i8,
    },

    /// A sibling search came back above alpha.
    #[error("sibling {column} of \"{moves}\" returned {got}, above alpha {alpha}")]
    SiblingAboveAlpha {
        /// The parent position's move sequence.
        moves: String,
        /// The sibling column.
        column: usize,
        /// The recursion's value for the sibling.
        got: i8,
        /// The window's lower bound.
        alpha: i8,
    },
}

/// A pair of value bounds, each in -1..=1.
///
/// Exact records have `lower == upper`; fail-high records pair the proven
/// lower bound with whatever upper bound was previously known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    /// Proven lower bound on the node value.
    pub lower: i8,
    /// Proven upper bound on the node value.
    pub upper: i8,
}

impl Bounds {
    /// An exact record.
    pub fn exact(value: i8) -> Self {
        Self { lower: value, upper: value }
    }

    /// Pack into the low 8 bits of a table value:
    /// `(lower + 1) + 16 * (upper + 1)`.
    pub fn pack(self) -> u16 {
        (self.lower + 1) as u16 + 16 * (self.upper + 1) as u16
    }

    /// Unpack from a table value.
    pub fn unpack(packed: u16) -> Self {
        Self {
            lower: (packed % 16) as i8 - 1,
            upper: (packed / 16) as i8 - 1,
        }
    }
}

/// Oracle-guided solver owning the transposition table, the oracle
/// handle, and the move stack of the position under search.
pub struct Solver<O: Oracle> {
    tt: TranspositionTable,
    oracle: O,
    moves: MoveSeq,
}

impl<O: Oracle> Solver<O> {
    /// Create a solver over a fresh table with `tt_capacity` slots.
    pub fn new(oracle: O, tt_capacity: usize) -> Self {
        Self {
            tt: TranspositionTable::new(tt_capacity),
            oracle,
            moves: MoveSeq::new(),
        }
    }

    /// The transposition table.
    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    /// Release the table and the oracle handle.
    pub fn into_parts(self) -> (TranspositionTable, O) {
        (self.tt, self.oracle)
    }

    /// Reassemble a solver from a previously built table and oracle.
    pub fn from_parts(tt: TranspositionTable, oracle: O) -> Self {
        Self {
            tt,
            oracle,
            moves: MoveSeq::new(),
        }
    }

    /// Prove the value of the initial position over the full window.
    pub fn search_root(&mut self) -> Result<i8, SearchError> {
        self.search(MoveSeq::new(), -1, 1)
    }

    /// Negamax value of `moves` within the fail-soft window `[alpha, beta]`.
    ///
    /// The result is from the side to move's perspective and may fall
    /// outside the window when a cutoff allows.
    ///
    /// # Panics
    ///
    /// Panics unless `alpha < beta`.
    pub fn search(&mut self, moves: MoveSeq, alpha: i8, beta: i8) -> Result<i8, SearchError> {
        assert!(alpha < beta, "search window must be non-empty");
        debug!(moves = %moves, alpha, beta, "search start");
        self.moves = moves;
        self.node(alpha, beta)
    }

    fn node(&mut self, mut alpha: i8, mut beta: i8) -> Result<i8, SearchError> {
        let key = self.moves.encode();

        let mut prior_upper: i8 = 1;
        if let Some(packed) = self.tt.get(key)? {
            let bounds = Bounds::unpack(packed);
            if bounds.lower >= beta {
                return Ok(bounds.lower);
            }
            if bounds.upper <= alpha {
                return Ok(bounds.upper);
            }
            alpha = alpha.max(bounds.lower);
            beta = beta.min(bounds.upper);
            prior_upper = bounds.upper;
        }

        let reply = self.oracle.query(&self.moves)?;

        if reply.terminal {
            let value = self.terminal_value()?;
            self.tt.set(key, Bounds::exact(value).pack())?;
            return Ok(value);
        }

        let value = reply.best().ok_or_else(|| SearchError::NoChildren {
            moves: self.moves.to_string(),
        })?;

        if beta <= value {
            // A cutoff is inevitable; proving one best child suffices.
            self.expand_cutoff(&reply, value, alpha, beta)?;
            self.tt
                .set(key, Bounds { lower: value, upper: prior_upper }.pack())?;
        } else {
            self.expand_pv(&reply, value, alpha, beta)?;
            self.tt.set(key, Bounds::exact(value).pack())?;
        }
        Ok(value)
    }

    /// Value of a terminal node.
    ///
    /// The oracle's terminal flag at a full board conflates draws and
    /// losses, so 42-ply terminals consult the parent's move values: if
    /// the parent had a winning move the full board is a loss, otherwise
    /// a draw. Every other terminal is a loss for the side to move.
    fn terminal_value(&mut self) -> Result<i8, SearchError> {
        if self.moves.len() < MAX_PLIES {
            return Ok(-1);
        }
        let Some(last) = self.moves.pop() else {
            // A 42-ply sequence is never empty.
            return Ok(-1);
        };
        let parent_reply = self.oracle.query(&self.moves);
        let parent_moves = self.moves.to_string();
        self.moves.push(last)?;

        let best = parent_reply?
            .best()
            .ok_or(SearchError::NoChildren { moves: parent_moves })?;
        Ok(if best == 1 { -1 } else { 0 })
    }

    /// Fail-high expansion: recurse into the single preferred child whose
    /// predicted value matches the node value.
    fn expand_cutoff(
        &mut self,
        reply: &WdlResponse,
        value: i8,
        alpha: i8,
        beta: i8,
    ) -> Result<(), SearchError> {
        for &column in &MOVE_ORDER {
            if reply.children[column] != Some(value) {
                continue;
            }
            let got = self.recurse(column, -beta, -alpha)?;
            if got != value {
                return Err(SearchError::ChildMismatch {
                    moves: self.moves.to_string(),
                    column,
                    expected: value,
                    got,
                });
            }
            if got < beta {
                return Err(SearchError::CutoffBelowBeta {
                    moves: self.moves.to_string(),
                    column,
                    got,
                    beta,
                });
            }
            return Ok(());
        }
        Err(SearchError::NoChildren {
            moves: self.moves.to_string(),
        })
    }

    /// PV expansion: verify the best child with a null window, then search
    /// every other legal child with the full window.
    fn expand_pv(
        &mut self,
        reply: &WdlResponse,
        value: i8,
        mut alpha: i8,
        beta: i8,
    ) -> Result<(), SearchError> {
        let mut first = None;
        for &column in &MOVE_ORDER {
            if reply.children[column] != Some(value) {
                continue;
            }
            let got = self.recurse(column, -alpha - 1, -alpha)?;
            if got != value {
                return Err(SearchError::ChildMismatch {
                    moves: self.moves.to_string(),
                    column,
                    expected: value,
                    got,
                });
            }
            if got >= beta {
                return Err(SearchError::PvChildAtBeta {
                    moves: self.moves.to_string(),
                    column,
                    got,
                    beta,
                });
            }
            alpha = alpha.max(value);
            first = Some(column);
            break;
        }
        let Some(first) = first else {
            return Err(SearchError::NoChildren {
                moves: self.moves.to_string(),
            });
        };

        for &column in &MOVE_ORDER {
            if column == first || reply.children[column].is_none() {
                continue;
            }
            let got = self.recurse(column, -beta, -alpha)?;
            if got > alpha {
                return Err(SearchError::SiblingAboveAlpha {
                    moves: self.moves.to_string(),
                    column,
                    got,
                    alpha,
                });
            }
        }
        Ok(())
    }

    /// Push `column`, search the child with the given window, pop, negate.
    fn recurse(&mut self, column: usize, alpha: i8, beta: i8) -> Result<i8, SearchError> {
        self.moves.push(column as u8)?;
        let result = self.node(alpha, beta);
        self.moves.pop();
        Ok(-result?)
    }
}

impl<O: Oracle> std::fmt::Debug for Solver<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solver").field("tt", &self.tt).finish()
    }
}

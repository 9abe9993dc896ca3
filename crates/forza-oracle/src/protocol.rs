//! The compact line protocol.
//!
//! One request line (the move sequence as a digit string) yields one
//! response line of exactly 8 whitespace-separated tokens: a "0"/"1"
//! terminal flag, then seven per-column values, "." for an illegal column
//! or a decimal -1/0/1 otherwise. Anything else on the oracle's stdout is
//! chatter and is skipped by the server handle.

use forza_core::WIDTH;

use crate::error::OracleError;

/// One oracle reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WdlResponse {
    /// Whether the game is over at the queried position.
    pub terminal: bool,
    /// Per column: `None` if the column is illegal, otherwise the value of
    /// playing it, from the mover's perspective.
    pub children: [Option<i8>; WIDTH],
}

impl WdlResponse {
    /// The best defined child value, if any column is playable.
    pub fn best(&self) -> Option<i8> {
        self.children.iter().flatten().copied().max()
    }
}

/// Whether a stdout line has the shape of a response: 8 tokens with a
/// leading "0" or "1".
pub(crate) fn is_candidate(line: &str) -> bool {
    let mut tokens = line.split_whitespace();
    matches!(tokens.next(), Some("0") | Some("1")) && tokens.count() == WIDTH
}

/// Parse a compact response line.
pub fn parse_compact_line(line: &str) -> Result<WdlResponse, OracleError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != WIDTH + 1 {
        return Err(OracleError::BadTokenCount {
            found: tokens.len(),
            line: line.to_string(),
        });
    }

    let terminal = match tokens[0] {
        "0" => false,
        "1" => true,
        other => {
            return Err(OracleError::BadTerminalFlag {
                flag: other.to_string(),
                line: line.to_string(),
            });
        }
    };

    let mut children = [None; WIDTH];
    for (col, token) in tokens[1..].iter().enumerate() {
        if *token == "." {
            continue;
        }
        let value: i8 = token.parse().map_err(|_| OracleError::BadWdlToken {
            token: token.to_string(),
            line: line.to_string(),
        })?;
        if !(-1..=1).contains(&value) {
            return Err(OracleError::BadWdlToken {
                token: token.to_string(),
                line: line.to_string(),
            });
        }
        children[col] = Some(value);
    }

    Ok(WdlResponse { terminal, children })
}

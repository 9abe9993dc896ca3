//! Oracle subprocess and protocol errors.

/// Errors that can occur while talking to the WDL oracle.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// The oracle binary could not be started.
    #[error("failed to spawn wdl server {binary:?}: {source}")]
    Spawn {
        /// Path of the binary that failed to start.
        binary: String,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// An I/O error on the oracle's stdin or stdout.
    #[error("I/O error talking to wdl server: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The oracle's stdout closed before a response arrived.
    #[error("wdl server terminated unexpectedly; stderr:\n{stderr}")]
    ServerDied {
        /// Whatever the child wrote to stderr before dying.
        stderr: String,
    },

    /// A response line does not have exactly 8 tokens.
    #[error("bad token count: expected 8, found {found} in {line:?}")]
    BadTokenCount {
        /// Number of tokens found.
        found: usize,
        /// The offending line.
        line: String,
    },

    /// The terminal flag token is not "0" or "1".
    #[error("bad terminal flag {flag:?} in {line:?}")]
    BadTerminalFlag {
        /// The offending token.
        flag: String,
        /// The offending line.
        line: String,
    },

    /// A per-column token is neither "." nor -1/0/1.
    #[error("bad wdl token {token:?} in {line:?}")]
    BadWdlToken {
        /// The offending token.
        token: String,
        /// The offending line.
        line: String,
    },
}

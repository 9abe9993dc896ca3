//! Handle to the WDL oracle subprocess.

use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use forza_core::MoveSeq;

use crate::Oracle;
use crate::error::OracleError;
use crate::protocol::{WdlResponse, is_candidate, parse_compact_line};

/// How long shutdown waits for the child before killing it.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// A running oracle subprocess speaking the compact line protocol.
///
/// Exchanges are strictly request/response: one digit-string line goes out
/// on the child's stdin, lines come back on its stdout until a compact
/// response arrives. Stderr is captured and surfaced if the child dies.
/// Dropping the handle closes stdin and reaps the child, so the subprocess
/// is cleaned up on abort paths too.
pub struct WdlServer {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl WdlServer {
    /// Spawn `<binary> <solution_dir> --server --compact [-Xmmap]`.
    pub fn start(
        binary: &Path,
        solution_dir: &Path,
        in_memory: bool,
    ) -> Result<WdlServer, OracleError> {
        let mut command = Command::new(binary);
        command
            .arg(solution_dir)
            .arg("--server")
            .arg("--compact")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if in_memory {
            command.arg("-Xmmap");
        }

        let mut child = command.spawn().map_err(|source| OracleError::Spawn {
            binary: binary.display().to_string(),
            source,
        })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            // Stdio::piped above guarantees both handles; treat a missing
            // one as a failed spawn.
            let _ = child.kill();
            let _ = child.wait();
            return Err(OracleError::Spawn {
                binary: binary.display().to_string(),
                source: std::io::Error::other("child spawned without piped stdin/stdout"),
            });
        };

        info!(binary = %binary.display(), solution_dir = %solution_dir.display(), "wdl server started");
        Ok(WdlServer {
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
        })
    }

    /// Close the child's stdin and reap it, killing after a grace period.
    pub fn shutdown(mut self) -> Result<(), OracleError> {
        self.teardown()?;
        Ok(())
    }

    /// Build the terminated-unexpectedly error, draining stderr for context.
    fn died(&mut self) -> OracleError {
        let mut stderr = String::new();
        if let Some(pipe) = self.child.stderr.as_mut() {
            let _ = pipe.read_to_string(&mut stderr);
        }
        OracleError::ServerDied { stderr }
    }

    fn teardown(&mut self) -> std::io::Result<()> {
        drop(self.stdin.take());
        if self.wait_with_grace()?.is_none() {
            warn!("wdl server did not exit within {SHUTDOWN_GRACE:?}, killing");
            self.child.kill()?;
            self.child.wait()?;
        }
        info!("wdl server stopped");
        Ok(())
    }

    fn wait_with_grace(&mut self) -> std::io::Result<Option<ExitStatus>> {
        let deadline = Instant::now() + SHUTDOWN_GRACE;
        loop {
            if let Some(status) = self.child.try_wait()? {
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            std::thread::sleep(Duration::from_millis(25));
        }
    }
}

impl Oracle for WdlServer {
    /// Send one query line, then read lines until a compact response
    /// arrives. Blank lines and non-response chatter are skipped.
    fn query(&mut self, moves: &MoveSeq) -> Result<WdlResponse, OracleError> {
        if let Some(stdin) = self.stdin.as_mut() {
            let sent = writeln!(stdin, "{moves}").and_then(|()| stdin.flush());
            if let Err(err) = sent {
                if err.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(err.into());
                }
                // The child is gone; the read loop below reports the
                // death with stderr context.
            }
        }

        loop {
            let mut line = String::new();
            if self.stdout.read_line(&mut line)? == 0 {
                return Err(self.died());
            }
            let trimmed = line.trim();
            if trimmed.is_empty() || !is_candidate(trimmed) {
                continue;
            }
            let response = parse_compact_line(trimmed)?;
            debug!(moves = %moves, terminal = response.terminal, "wdl query");
            return Ok(response);
        }
    }
}

impl Drop for WdlServer {
    fn drop(&mut self) {
        // Already torn down if shutdown() ran: stdin is gone then.
        if self.stdin.is_some() {
            if let Err(err) = self.teardown() {
                warn!(error = %err, "failed to reap wdl server");
            }
        }
    }
}

impl std::fmt::Debug for WdlServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WdlServer")
            .field("pid", &self.child.id())
            .finish()
    }
}

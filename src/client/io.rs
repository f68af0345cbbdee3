//! Low-level I/O: command transmission, buffered response-line reads,
//! dot-terminated multi-line handling, timeouts, cancellation

use super::NntpConnection;
use crate::commands;
use crate::error::{NntpfsError, Result};
use crate::response::NntpResponse;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tracing::trace;

const SINGLE_LINE_TIMEOUT: Duration = Duration::from_secs(60);
const BODY_LINE_TIMEOUT: Duration = Duration::from_secs(180);

/// Stray lines tolerated while hunting for a status line
const MAX_JUNK_LINES: usize = 32;

impl NntpConnection {
    /// Send one CRLF-terminated command line
    pub(super) async fn send_command(&mut self, command: &str) -> Result<()> {
        trace!("Sending command: {}", command.trim_end());
        self.stream.get_mut().write_all(command.as_bytes()).await?;
        self.stream.get_mut().flush().await?;
        Ok(())
    }

    /// Read one line, stripped of its CRLF
    ///
    /// The cancellation token is consulted before the read, never mid-line;
    /// a cancelled or failed read poisons the connection so the pool will
    /// not reuse it.
    async fn read_line_with_timeout(&mut self, limit: Duration) -> Result<String> {
        if self.cancel.is_cancelled() {
            self.mark_broken();
            return Err(NntpfsError::Cancelled);
        }

        let mut line_bytes = Vec::with_capacity(512);
        let read = timeout(limit, self.stream.read_until(b'\n', &mut line_bytes)).await;
        let n = match read {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => {
                self.mark_broken();
                return Err(e.into());
            }
            Err(_) => {
                self.mark_broken();
                return Err(NntpfsError::Timeout);
            }
        };

        if n == 0 {
            self.mark_broken();
            return Err(NntpfsError::ConnectionClosed);
        }

        // Strip exactly the line terminator; trailing spaces are data
        // (uuencoded lines may legitimately end with pad characters)
        if line_bytes.last() == Some(&b'\n') {
            line_bytes.pop();
            if line_bytes.last() == Some(&b'\r') {
                line_bytes.pop();
            }
        }

        let line = String::from_utf8_lossy(&line_bytes).into_owned();
        trace!("Received: {}", line);
        Ok(line)
    }

    /// Read one response line with the single-line timeout
    pub(super) async fn read_response_line(&mut self) -> Result<String> {
        self.read_line_with_timeout(SINGLE_LINE_TIMEOUT).await
    }

    /// Read a status response, skipping any stray non-status lines
    pub(crate) async fn read_response(&mut self) -> Result<NntpResponse> {
        for _ in 0..MAX_JUNK_LINES {
            let line = self.read_response_line().await?;
            if let Ok(response) = commands::parse_single_response(&line) {
                return Ok(response);
            }
            trace!("Ignoring non-status line before response");
        }
        self.mark_broken();
        Err(NntpfsError::InvalidResponse(
            "no status line in response".to_string(),
        ))
    }

    /// One command round-trip: send, then read the status line
    pub(crate) async fn command(&mut self, command: &str) -> Result<NntpResponse> {
        self.send_command(command).await?;
        self.read_response().await
    }

    /// Next line of a dot-terminated multi-line response
    ///
    /// Returns `None` at the lone-`.` terminator. Dot-stuffed lines
    /// (leading `..`) come back unstuffed.
    pub(crate) async fn next_multiline_line(&mut self) -> Result<Option<String>> {
        let line = self.read_line_with_timeout(BODY_LINE_TIMEOUT).await?;
        if line == "." {
            return Ok(None);
        }
        if line.starts_with("..") {
            // Byte-stuffed line: the first dot is transport framing
            return Ok(Some(line[1..].to_string()));
        }
        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_values() {
        assert_eq!(SINGLE_LINE_TIMEOUT, Duration::from_secs(60));
        assert_eq!(BODY_LINE_TIMEOUT, Duration::from_secs(180));
        assert!(BODY_LINE_TIMEOUT > SINGLE_LINE_TIMEOUT);
    }

    #[test]
    fn test_junk_line_bound() {
        assert!(MAX_JUNK_LINES >= 8);
    }
}

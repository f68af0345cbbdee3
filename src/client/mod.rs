//! NNTP wire protocol: connection, authentication, command round-trips
//!
//! One [`NntpConnection`] owns one socket plus its response-parsing state.
//! Connections are never shared between concurrent callers; ownership moves
//! wholly between the pool and whoever acquired it.

mod auth;
mod connection;
mod group_ops;
mod io;
mod state;

use crate::config::ServerIdentity;
use connection::NntpStream;
use state::ConnectionState;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// One live NNTP connection
///
/// # Example
///
/// ```no_run
/// use nntpfs::{NntpConnection, ServerIdentity, SiteConfig};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let identity = ServerIdentity::anonymous("news.example.com", 119);
/// let mut conn =
///     NntpConnection::connect(&identity, &SiteConfig::default(), CancellationToken::new())
///         .await?;
/// let info = conn.select_group("alt.binaries.test").await?;
/// println!("group spans {}-{}", info.first, info.last);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub struct NntpConnection {
    /// Buffered stream; the reader keeps any bytes past the line just
    /// sliced off, so small status lines and long bodies interleave freely
    stream: BufReader<NntpStream>,
    /// Identity this connection was created for (the pool key)
    identity: ServerIdentity,
    /// Protocol state
    state: ConnectionState,
    /// Currently selected newsgroup
    current_group: Option<String>,
    /// Whether the session is still unauthenticated
    anonymous: bool,
    /// Set when the connection can no longer be trusted (garbage response,
    /// I/O failure, cancelled mid-command); broken connections never return
    /// to the pool
    broken: bool,
    /// Caller-supplied cancellation token, checked between line reads
    cancel: CancellationToken,
}

impl NntpConnection {
    /// Identity this connection serves
    pub fn identity(&self) -> &ServerIdentity {
        &self.identity
    }

    /// Whether the session has not authenticated
    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    /// Whether the session has completed authentication
    pub fn is_authenticated(&self) -> bool {
        matches!(
            self.state,
            ConnectionState::Authenticated | ConnectionState::GroupSelected
        )
    }

    /// Currently selected newsgroup, if any
    pub fn current_group(&self) -> Option<&str> {
        self.current_group.as_deref()
    }

    /// Check if this connection should be discarded instead of pooled
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    pub(crate) fn mark_broken(&mut self) {
        self.broken = true;
        self.state = ConnectionState::Closed;
    }
}

impl Drop for NntpConnection {
    fn drop(&mut self) {
        debug!("NntpConnection to {} dropped", self.identity.host);
    }
}

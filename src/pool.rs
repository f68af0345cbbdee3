//! Connection pooling keyed by server identity
//!
//! The pool maps a [`ServerIdentity`] to a list of idle connections.
//! Acquiring pops an idle connection and probes it with MODE READER,
//! reconnecting if the probe fails; releasing appends the connection back
//! instead of closing it. There is no maximum pool size and no eviction
//! timer — connections live until a probe finds them dead or the pool is
//! dropped.
//!
//! The mutex guards only the list splice. Probes and command traffic happen
//! outside the lock, on a connection owned exclusively by the caller.

use crate::client::NntpConnection;
use crate::config::{ServerIdentity, SiteConfig};
use crate::error::Result;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Pool of idle NNTP connections, one list per server identity
///
/// # Example
///
/// ```no_run
/// use nntpfs::{ConnectionPool, ServerIdentity, SiteConfig};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = ConnectionPool::new(SiteConfig::default());
/// let identity = ServerIdentity::anonymous("news.example.com", 119);
///
/// let mut conn = pool.acquire(&identity, &CancellationToken::new()).await?;
/// conn.select_group("alt.binaries.test").await?;
/// pool.release(conn);
/// # Ok(())
/// # }
/// ```
pub struct ConnectionPool {
    site: SiteConfig,
    idle: Mutex<HashMap<ServerIdentity, Vec<NntpConnection>>>,
}

impl ConnectionPool {
    /// Create an empty pool
    pub fn new(site: SiteConfig) -> Self {
        Self {
            site,
            idle: Mutex::new(HashMap::new()),
        }
    }

    /// Get a connection for `identity`
    ///
    /// Reuses an idle connection when one survives the liveness probe,
    /// otherwise dials a fresh one.
    ///
    /// # Errors
    ///
    /// Propagates connection errors from [`NntpConnection::connect`]; a
    /// failed probe is not an error, it just costs a reconnect.
    pub async fn acquire(
        &self,
        identity: &ServerIdentity,
        cancel: &CancellationToken,
    ) -> Result<NntpConnection> {
        let candidate = {
            let mut idle = self.idle.lock().expect("connection pool lock poisoned");
            idle.get_mut(identity).and_then(|list| list.pop())
        };

        if let Some(mut conn) = candidate {
            if conn.probe().await {
                debug!("Reusing pooled connection to {}", identity.host);
                return Ok(conn);
            }
            debug!(
                "Idle connection to {} failed liveness probe, reconnecting",
                identity.host
            );
        }

        NntpConnection::connect(identity, &self.site, cancel.clone()).await
    }

    /// Return a connection to the idle list
    ///
    /// Broken connections (I/O error, cancelled command, garbage response)
    /// are dropped instead of pooled.
    pub fn release(&self, conn: NntpConnection) {
        if conn.is_broken() {
            debug!(
                "Discarding broken connection to {} instead of pooling it",
                conn.identity().host
            );
            return;
        }

        let mut idle = self.idle.lock().expect("connection pool lock poisoned");
        idle.entry(conn.identity().clone()).or_default().push(conn);
    }

    /// Number of idle connections held for `identity`
    pub fn idle_count(&self, identity: &ServerIdentity) -> usize {
        let idle = self.idle.lock().expect("connection pool lock poisoned");
        idle.get(identity).map_or(0, Vec::len)
    }
}

//! Connection establishment: TCP dial, socket tuning, implicit TLS,
//! server greeting, initial AUTHINFO exchange

use super::NntpConnection;
use super::state::ConnectionState;
use crate::config::{ServerIdentity, SiteConfig};
use crate::error::{NntpfsError, Result};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, BufReader, ReadBuf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// TCP connection timeout in seconds
const TCP_CONNECT_TIMEOUT_SECS: u64 = 60;

/// TLS handshake timeout in seconds
const TLS_HANDSHAKE_TIMEOUT_SECS: u64 = 60;

/// BufReader capacity; large enough that article bodies do not thrash
/// syscalls, small enough not to matter per pooled connection
const BUFREADER_CAPACITY: usize = 64 * 1024;

/// Receive buffer requested from the OS for body downloads
const RECV_BUFFER_SIZE: usize = 256 * 1024;

/// Stream over either plain TCP (port 119) or implicit TLS (port 563)
pub(super) enum NntpStream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl AsyncRead for NntpStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            NntpStream::Plain(s) => Pin::new(s).poll_read(cx, buf),
            NntpStream::Tls(s) => Pin::new(s.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for NntpStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        match self.get_mut() {
            NntpStream::Plain(s) => Pin::new(s).poll_write(cx, buf),
            NntpStream::Tls(s) => Pin::new(s.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            NntpStream::Plain(s) => Pin::new(s).poll_flush(cx),
            NntpStream::Tls(s) => Pin::new(s.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            NntpStream::Plain(s) => Pin::new(s).poll_shutdown(cx),
            NntpStream::Tls(s) => Pin::new(s.as_mut()).poll_shutdown(cx),
        }
    }
}

impl NntpConnection {
    /// Connect to the news server described by `identity`
    ///
    /// Dials (honoring an enabled proxy from `site`), reads the greeting,
    /// and runs the AUTHINFO exchange when the identity carries
    /// credentials. Anonymous identities skip straight to the
    /// authenticated state.
    ///
    /// # Errors
    ///
    /// - [`NntpfsError::Io`] - dial or socket failure
    /// - [`NntpfsError::Tls`] - TLS handshake failure (port 563)
    /// - [`NntpfsError::Timeout`] - connect or handshake timed out
    /// - [`NntpfsError::Protocol`] - server greeting was not 2xx
    /// - [`NntpfsError::AuthFailed`] - credentials rejected
    /// - [`NntpfsError::Cancelled`] - token fired while connecting
    pub async fn connect(
        identity: &ServerIdentity,
        site: &SiteConfig,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let (dial_host, dial_port) = site.dial_address(identity);
        debug!(
            "Connecting to NNTP server {}:{} (dialing {}:{})",
            identity.host, identity.port, dial_host, dial_port
        );

        let dial = timeout(
            Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS),
            TcpStream::connect((dial_host.as_str(), dial_port)),
        );
        let tcp_stream = match cancel.run_until_cancelled(dial).await {
            None => return Err(NntpfsError::Cancelled),
            Some(connected) => connected.map_err(|_| NntpfsError::Timeout)??,
        };

        tcp_stream.set_nodelay(true)?;
        let sock = socket2::SockRef::from(&tcp_stream);
        if let Err(e) = sock.set_recv_buffer_size(RECV_BUFFER_SIZE) {
            warn!(
                "Failed to set receive buffer size to {} bytes: {}",
                RECV_BUFFER_SIZE, e
            );
        }

        let stream = if identity.is_tls() {
            NntpStream::Tls(Box::new(
                tls_handshake(&identity.host, tcp_stream).await?,
            ))
        } else {
            NntpStream::Plain(tcp_stream)
        };

        let mut conn = Self {
            stream: BufReader::with_capacity(BUFREADER_CAPACITY, stream),
            identity: identity.clone(),
            state: ConnectionState::Greeted,
            current_group: None,
            anonymous: identity.is_anonymous(),
            broken: false,
            cancel,
        };

        let greeting = conn.read_response().await?;
        debug!("Server greeting: {} {}", greeting.code, greeting.message);
        if !greeting.is_success() {
            return Err(NntpfsError::Protocol {
                code: greeting.code,
                message: greeting.message,
            });
        }

        if let (Some(user), Some(pass)) = (
            conn.identity.username.clone(),
            conn.identity.password.clone(),
        ) {
            conn.login(&user, &pass).await?;
        } else {
            conn.state = ConnectionState::Authenticated;
        }

        Ok(conn)
    }
}

/// Perform the implicit-TLS handshake used on port 563
async fn tls_handshake(host: &str, tcp_stream: TcpStream) -> Result<TlsStream<TcpStream>> {
    use tokio_rustls::rustls::crypto::{CryptoProvider, ring};
    let _ = CryptoProvider::install_default(ring::default_provider());

    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let tls_config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    let connector = TlsConnector::from(Arc::new(tls_config));
    let server_name = ServerName::try_from(host)
        .map_err(|e| NntpfsError::Tls(format!("Invalid domain: {}", e)))?
        .to_owned();

    timeout(
        Duration::from_secs(TLS_HANDSHAKE_TIMEOUT_SECS),
        connector.connect(server_name, tcp_stream),
    )
    .await
    .map_err(|_| NntpfsError::Timeout)?
    .map_err(|e| NntpfsError::Tls(format!("TLS handshake failed: {}", e)))
}

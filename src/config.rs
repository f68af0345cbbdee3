//! Server identity and host-framework configuration

/// Default NNTP port
pub const DEFAULT_PORT: u16 = 119;

/// Port on which TLS is implied
pub const TLS_PORT: u16 = 563;

/// Identity of one news server, used as the connection-pool key
///
/// Two identities are equal iff host, port, username, and password all
/// match; anonymous identities (no credentials) compare equal to each other
/// and never to an authenticated one. The derived `Eq`/`Hash` give exactly
/// those semantics.
///
/// # Example
///
/// ```
/// use nntpfs::ServerIdentity;
///
/// let a = ServerIdentity::anonymous("news.example.com", 119);
/// let b = ServerIdentity::with_credentials("news.example.com", 119, "bob", "secret");
/// assert_ne!(a, b);
/// ```
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerIdentity {
    /// Server hostname (e.g., "news.example.com")
    pub host: String,

    /// Server port (typically 119 for plain, 563 for TLS)
    pub port: u16,

    /// Username for authentication, if any
    pub username: Option<String>,

    /// Password for authentication, if any
    pub password: Option<String>,
}

impl ServerIdentity {
    /// Create an anonymous identity (no AUTHINFO exchange on connect)
    pub fn anonymous(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
        }
    }

    /// Create an identity carrying credentials
    pub fn with_credentials(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    /// Whether this identity carries no credentials
    pub fn is_anonymous(&self) -> bool {
        self.username.is_none()
    }

    /// Whether connections to this identity use implicit TLS
    ///
    /// Follows the usual convention: port 563 is the secure NNTP port,
    /// everything else speaks plain TCP.
    pub fn is_tls(&self) -> bool {
        self.port == TLS_PORT
    }
}

/// Proxy settings read from the host framework's configuration store
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProxySettings {
    /// Proxy hostname
    pub host: String,
    /// Proxy port
    pub port: u16,
    /// Whether the proxy should be used at all
    pub enabled: bool,
}

/// Host-framework configuration consumed when building a server identity
///
/// This crate does not own any persistent configuration; the embedding
/// framework hands these values over once, at identity-construction time.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SiteConfig {
    /// News server to use when a URL names no host
    pub default_server: Option<String>,
    /// Port to use when a URL names no port (falls back to 119)
    pub default_port: Option<u16>,
    /// Optional proxy; when enabled, connections dial the proxy address
    /// while keeping the logical server identity unchanged
    pub proxy: Option<ProxySettings>,
}

impl SiteConfig {
    /// The address `(host, port)` a connection for `identity` should dial
    pub fn dial_address(&self, identity: &ServerIdentity) -> (String, u16) {
        if let Some(proxy) = &self.proxy
            && proxy.enabled
        {
            return (proxy.host.clone(), proxy.port);
        }
        (identity.host.clone(), identity.port)
    }
}

/// Credentials returned by an interactive prompt
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Username entered by the user
    pub username: String,
    /// Password entered by the user
    pub password: String,
}

/// Interactive credential prompt supplied by the host framework
///
/// Some servers admit anonymous readers but gate individual groups behind
/// authentication. When a GROUP command fails on an anonymous connection,
/// the listing code asks this source once and retries.
pub trait CredentialSource: Send + Sync {
    /// Ask the user for credentials for `host`; `None` aborts the retry
    fn request(&self, host: &str) -> Option<Credentials>;
}

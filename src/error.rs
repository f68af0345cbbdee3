//! NNTP filesystem error types

use thiserror::Error;

/// Errors surfaced by the NNTP virtual filesystem
#[derive(Error, Debug)]
pub enum NntpfsError {
    /// IO error during network operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS error during secure connection
    #[error("TLS error: {0}")]
    Tls(String),

    /// Connection or command timeout
    #[error("Connection timeout")]
    Timeout,

    /// Operation cancelled via the caller's cancellation token
    #[error("Operation cancelled")]
    Cancelled,

    /// Response line the server sent could not be parsed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// NNTP protocol error with response code
    #[error("NNTP error {code}: {message}")]
    Protocol {
        /// NNTP response code (e.g., 411, 430, 502)
        code: u16,
        /// Error message from server
        message: String,
    },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// No such newsgroup (or the server requires credentials for it)
    #[error("No such newsgroup: {0}")]
    NoSuchGroup(String),

    /// Article or synthesized file not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Server refused access to the resource
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Server reported a quota or storage limit
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Server rejected the command as malformed
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Connection closed unexpectedly
    #[error("Connection closed")]
    ConnectionClosed,

    /// URL could not be parsed into a news location
    #[error("Invalid news URL: {0}")]
    InvalidUrl(String),
}

/// Result type alias using NntpfsError
pub type Result<T> = std::result::Result<T, NntpfsError>;

//! Connection state types for the NNTP wire protocol

/// Protocol state of one NNTP connection
///
/// The connection walks Greeted → Authenticated → GroupSelected; an I/O
/// error or QUIT from any state lands in Closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ConnectionState {
    /// Greeting consumed, no AUTHINFO exchange performed yet
    Greeted,
    /// AUTHINFO accepted (or the identity is anonymous)
    Authenticated,
    /// A newsgroup has been selected with GROUP
    GroupSelected,
    /// Connection torn down
    Closed,
}

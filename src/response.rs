//! NNTP response type, status codes, and error classification

use crate::error::NntpfsError;

/// Single-line NNTP response with status code and message
#[derive(Debug, Clone)]
pub struct NntpResponse {
    /// 3-digit NNTP response code
    pub code: u16,
    /// Status message from server
    pub message: String,
}

impl NntpResponse {
    /// Check if response is informational (1xx)
    pub fn is_informational(&self) -> bool {
        self.code >= 100 && self.code < 200
    }

    /// Check if response indicates success (2xx)
    pub fn is_success(&self) -> bool {
        self.code >= 200 && self.code < 300
    }

    /// Check if response indicates continuation (3xx)
    pub fn is_continuation(&self) -> bool {
        self.code >= 300 && self.code < 400
    }

    /// Check if response indicates error (4xx or 5xx)
    pub fn is_error(&self) -> bool {
        self.code >= 400
    }

    /// Check if the command can proceed (1xx, 2xx, or 3xx)
    ///
    /// 3xx matters during AUTHINFO, where it is the "send the password now"
    /// signal rather than a failure.
    pub fn is_ok(&self) -> bool {
        self.code < 400
    }

    /// Map an error response onto the typed error taxonomy
    ///
    /// Specific legacy codes get a distinct error kind so callers can react
    /// precisely; everything else falls back to [`NntpfsError::Protocol`].
    pub fn into_error(self) -> NntpfsError {
        match self.code {
            421 | 426 => NntpfsError::Cancelled,
            425 => NntpfsError::AccessDenied(self.message),
            331 | 332 | 530 | 532 => NntpfsError::AuthFailed(self.message),
            codes::AUTH_REQUIRED | codes::AUTH_REJECTED => NntpfsError::AuthFailed(self.message),
            450 | 451 | 550 | 551 => NntpfsError::NotFound(self.message),
            codes::NO_SUCH_ARTICLE_NUMBER | codes::NO_SUCH_ARTICLE_ID => {
                NntpfsError::NotFound(self.message)
            }
            452 | 552 => NntpfsError::QuotaExceeded(self.message),
            553 | codes::COMMAND_SYNTAX_ERROR => NntpfsError::BadRequest(self.message),
            codes::ACCESS_DENIED => NntpfsError::AccessDenied(self.message),
            _ => NntpfsError::Protocol {
                code: self.code,
                message: self.message,
            },
        }
    }
}

/// NNTP response codes (RFC 3977 / RFC 4643)
#[allow(dead_code)]
pub mod codes {
    // 2xx - Success
    /// Server ready, posting allowed
    pub const READY_POSTING_ALLOWED: u16 = 200;
    /// Server ready, no posting
    pub const READY_NO_POSTING: u16 = 201;
    /// Closing connection
    pub const CLOSING_CONNECTION: u16 = 205;
    /// Group selected
    pub const GROUP_SELECTED: u16 = 211;
    /// Body follows
    pub const BODY_FOLLOWS: u16 = 222;
    /// Overview information follows
    pub const OVERVIEW_INFO_FOLLOWS: u16 = 224;
    /// Authentication accepted
    pub const AUTH_ACCEPTED: u16 = 281;

    // 3xx - Continuation
    /// Continue with authentication (send AUTHINFO PASS)
    pub const AUTH_CONTINUE: u16 = 381;

    // 4xx - Temporary errors
    /// No such newsgroup
    pub const NO_SUCH_GROUP: u16 = 411;
    /// No newsgroup selected
    pub const NO_GROUP_SELECTED: u16 = 412;
    /// No article with that number
    pub const NO_SUCH_ARTICLE_NUMBER: u16 = 423;
    /// No article with that message-id
    pub const NO_SUCH_ARTICLE_ID: u16 = 430;
    /// Authentication required (RFC 4643)
    pub const AUTH_REQUIRED: u16 = 480;
    /// Authentication rejected
    pub const AUTH_REJECTED: u16 = 481;

    // 5xx - Permanent errors
    /// Command not recognized
    pub const COMMAND_NOT_RECOGNIZED: u16 = 500;
    /// Command syntax error
    pub const COMMAND_SYNTAX_ERROR: u16 = 501;
    /// Access denied / command unavailable
    pub const ACCESS_DENIED: u16 = 502;
}

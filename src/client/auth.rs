//! AUTHINFO USER/PASS authentication

use super::NntpConnection;
use super::state::ConnectionState;
use crate::commands;
use crate::error::{NntpfsError, Result};
use crate::response::codes;
use tracing::debug;

impl NntpConnection {
    /// Authenticate with username and password (AUTHINFO USER/PASS)
    ///
    /// Sends AUTHINFO USER; a 3xx continuation means the server expects a
    /// password, so AUTHINFO PASS follows. Any final response outside the
    /// 2xx/3xx range is an authentication failure and the connection is
    /// poisoned — callers discard it rather than retrying on it.
    ///
    /// Also used mid-session: some servers admit anonymous readers but
    /// demand credentials for specific groups, in which case the listing
    /// code authenticates an already-connected session and retries GROUP.
    ///
    /// # Errors
    ///
    /// - [`NntpfsError::AuthFailed`] - credentials rejected
    /// - [`NntpfsError::ConnectionClosed`] - server dropped the connection
    /// - [`NntpfsError::Timeout`] - no response in time
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        debug!("Authenticating as {}", username);

        let cmd = commands::authinfo_user(username);
        let response = self.command(&cmd).await?;

        let response = if response.is_continuation() {
            let cmd = commands::authinfo_pass(password);
            self.command(&cmd).await?
        } else {
            response
        };

        if !response.is_ok() {
            self.mark_broken();
            return Err(NntpfsError::AuthFailed(response.message));
        }
        if response.code != codes::AUTH_ACCEPTED {
            debug!(
                "Server accepted AUTHINFO with non-standard code {}",
                response.code
            );
        }

        self.anonymous = false;
        self.state = ConnectionState::Authenticated;
        debug!("Authentication successful");
        Ok(())
    }
}

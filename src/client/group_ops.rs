//! Group selection, overview streaming, article-body streaming

use super::NntpConnection;
use super::state::ConnectionState;
use crate::commands::{self, GroupInfo};
use crate::error::Result;
use crate::response::codes;
use tracing::debug;

impl NntpConnection {
    /// Select a newsgroup
    ///
    /// Only a 211 response counts as success; anything else is surfaced via
    /// the typed error mapping so the caller can decide whether a
    /// credential-prompt retry is worthwhile.
    ///
    /// # Errors
    ///
    /// - [`crate::NntpfsError::NoSuchGroup`] - server said 411
    /// - [`crate::NntpfsError::Protocol`] - unexpected response code
    /// - [`crate::NntpfsError::InvalidResponse`] - unparseable 211 message
    pub async fn select_group(&mut self, newsgroup: &str) -> Result<GroupInfo> {
        debug!("Selecting newsgroup: {}", newsgroup);

        let cmd = commands::group(newsgroup);
        let response = self.command(&cmd).await?;

        if response.code == codes::NO_SUCH_GROUP {
            return Err(crate::NntpfsError::NoSuchGroup(newsgroup.to_string()));
        }
        if response.code != codes::GROUP_SELECTED {
            return Err(response.into_error());
        }

        let info = commands::parse_group_response(&response)?;
        self.current_group = Some(newsgroup.to_string());
        self.state = ConnectionState::GroupSelected;

        debug!(
            "Group {} selected: {} articles ({}-{})",
            newsgroup, info.count, info.first, info.last
        );
        Ok(info)
    }

    /// Issue XOVER for a closed article range and consume the 224 status
    ///
    /// Overview rows are then pulled one at a time with
    /// [`next_overview_line`](Self::next_overview_line) until it yields
    /// `None` at the terminator.
    pub async fn begin_overview(&mut self, first: u64, last: u64) -> Result<()> {
        let cmd = commands::xover(first, last);
        let response = self.command(&cmd).await?;

        if response.code != codes::OVERVIEW_INFO_FOLLOWS {
            return Err(response.into_error());
        }
        Ok(())
    }

    /// Next overview row, or `None` once the listing is exhausted
    pub async fn next_overview_line(&mut self) -> Result<Option<String>> {
        self.next_multiline_line().await
    }

    /// Issue BODY for a message-id and consume the 222 status
    ///
    /// Body lines are then pulled with [`next_body_line`](Self::next_body_line)
    /// until it yields `None`.
    pub async fn begin_body(&mut self, message_id: &str) -> Result<()> {
        let cmd = commands::body(message_id);
        let response = self.command(&cmd).await?;

        if response.code != codes::BODY_FOLLOWS {
            return Err(response.into_error());
        }
        Ok(())
    }

    /// Next article-body line, or `None` at the end of the article
    pub async fn next_body_line(&mut self) -> Result<Option<String>> {
        self.next_multiline_line().await
    }

    /// Cheap liveness probe for pooled connections
    ///
    /// A stale or half-closed connection fails the MODE READER round-trip;
    /// a live one answers with some non-error status.
    pub async fn probe(&mut self) -> bool {
        match self.command(commands::mode_reader()).await {
            Ok(response) => response.is_ok(),
            Err(_) => false,
        }
    }

    /// Best-effort clean shutdown
    ///
    /// Errors are ignored: QUIT is a courtesy, and the socket closes either
    /// way when the connection drops.
    pub async fn quit(&mut self) {
        let _ = self.command(commands::quit()).await;
        self.state = ConnectionState::Closed;
    }
}

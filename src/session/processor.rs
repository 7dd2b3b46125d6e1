//! Processes one channel end-to-end into a [`ChannelStats`].

use super::fetch::{FetchOutcome, MediaFetcher};
use super::stats::ChannelStats;
use crate::client::{ChannelInfo, Connection, Message};
use crate::filters::MediaFilter;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-channel orchestration: fetch unread, filter, download each, mark read.
///
/// Total failure isolation — nothing that goes wrong downstream escapes this
/// component without being recorded on the returned stats. One bad message
/// never aborts the channel; one bad channel never reaches the session loop
/// as an error.
pub struct ChannelProcessor {
    connection: Arc<Connection>,
    filter: Arc<dyn MediaFilter>,
    fetcher: MediaFetcher,
}

impl ChannelProcessor {
    pub fn new(
        connection: Arc<Connection>,
        filter: Arc<dyn MediaFilter>,
        fetcher: MediaFetcher,
    ) -> Self {
        Self {
            connection,
            filter,
            fetcher,
        }
    }

    /// Process `channel` and return its statistics. Always returns a stats
    /// record; failures are recorded on it, never propagated.
    pub async fn process(&self, channel: &ChannelInfo, mark_as_read: bool) -> ChannelStats {
        info!("processing channel: {}", channel.title);
        let mut stats = ChannelStats::new(&channel.title);

        let client = match self.connection.client() {
            Ok(client) => client,
            Err(e) => {
                stats.add_error(format!("cannot process {}: {e}", channel.title));
                return stats;
            }
        };

        let unread = match client.unread_messages(channel).await {
            Ok(messages) => messages,
            Err(e) => {
                let msg = format!("failed to fetch unread messages from {}: {e}", channel.title);
                warn!("{msg}");
                stats.add_error(msg);
                return stats;
            }
        };
        stats.unread_count = unread.len();

        if unread.is_empty() {
            debug!("no unread messages in {}", channel.title);
            return stats;
        }

        let eligible: Vec<&Message> = unread
            .iter()
            .filter(|m| self.filter.should_download(m))
            .collect();
        stats.media_count = eligible.len();
        info!(
            "found {} media messages in {} ({} unread)",
            eligible.len(),
            channel.title,
            unread.len()
        );

        for message in eligible {
            match self.fetcher.fetch(message, &channel.title).await {
                FetchOutcome::Downloaded(_) | FetchOutcome::AlreadyPresent(_) => {
                    stats.downloaded_count += 1;
                }
                FetchOutcome::Filtered => {
                    // Disagreement between the pre-filtered set and the
                    // fetcher's re-check; counts against the message.
                    stats.add_error(format!("failed to download message {}", message.id));
                }
                FetchOutcome::Failed(reason) => {
                    warn!("{reason}");
                    stats.add_error(reason);
                }
                FetchOutcome::ChannelUnavailable(reason) => {
                    warn!("{reason}");
                    stats.add_error(reason);
                    break;
                }
            }
        }

        if mark_as_read {
            if let Some(latest) = unread.iter().map(|m| m.id).max() {
                // Best-effort: a failed acknowledgement affects nothing else.
                match client.acknowledge_read(channel, latest).await {
                    Ok(()) => info!(
                        "marked {} messages as read in {}",
                        unread.len(),
                        channel.title
                    ),
                    Err(e) => warn!(
                        "failed to mark messages as read in {}: {e}",
                        channel.title
                    ),
                }
            }
        }

        info!("channel {} processed: {stats}", channel.title);
        stats
    }
}

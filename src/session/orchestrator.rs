//! Session orchestration across all channels.

use super::fetch::MediaFetcher;
use super::processor::ChannelProcessor;
use super::stats::{ChannelStats, DownloadSession};
use crate::client::{ChannelInfo, Connection, TelegramClient};
use crate::filters::{DefaultMediaFilter, MediaFilter};
use crate::namers::{FileNamer, TimestampNamer};
use anyhow::Result;
use chrono::Utc;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Drives one download session: enumerate channels, process each one
/// sequentially, aggregate the statistics.
///
/// Channels are processed strictly in enumeration order, one in-flight client
/// operation at a time. Failures are bounded by attribution level: a message
/// failure stays on its channel's stats, a channel failure stays on that
/// channel's entry, and only enumeration failure (or a fail-fast trip) ends
/// the run early — and even then the returned session is well-formed.
pub struct MediaArchiver {
    connection: Arc<Connection>,
    download_root: PathBuf,
    filter: Arc<dyn MediaFilter>,
    namer: Arc<dyn FileNamer>,
    fail_fast: bool,
}

impl MediaArchiver {
    /// New archiver with the default filter (images + videos) and timestamp
    /// namer.
    pub fn new(client: Arc<dyn TelegramClient>, download_root: impl Into<PathBuf>) -> Self {
        Self {
            connection: Arc::new(Connection::new(client)),
            download_root: download_root.into(),
            filter: Arc::new(DefaultMediaFilter),
            namer: Arc::new(TimestampNamer),
            fail_fast: false,
        }
    }

    /// Substitute the media filter strategy.
    pub fn with_media_filter(mut self, filter: Arc<dyn MediaFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Substitute the file naming strategy.
    pub fn with_file_namer(mut self, namer: Arc<dyn FileNamer>) -> Self {
        self.namer = namer;
        self
    }

    /// Abort the session after the first channel that reports any error.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub async fn connect(&self) -> Result<()> {
        self.connection.connect().await
    }

    pub async fn disconnect(&self) {
        self.connection.disconnect().await;
    }

    /// Download media from unread messages in every subscribed channel.
    pub async fn run_all(&self, mark_as_read: bool) -> DownloadSession {
        self.run(None, mark_as_read).await
    }

    /// Download media from the named channels only (exact title match).
    /// Names that match no channel are logged and skipped, not treated as
    /// errors.
    pub async fn run_subset(&self, names: &[String], mark_as_read: bool) -> DownloadSession {
        self.run(Some(names), mark_as_read).await
    }

    /// Channels visible to the account, with unread counts.
    pub async fn list_channels(&self) -> Result<Vec<ChannelInfo>> {
        let client = self.connection.client()?;
        Ok(client.list_channels().await?)
    }

    async fn run(&self, selection: Option<&[String]>, mark_as_read: bool) -> DownloadSession {
        let start_time = Utc::now();
        info!("starting download session");

        let channels = match self.enumerate(selection).await {
            Ok(channels) => channels,
            Err(e) => {
                let msg = format!("download session failed: {e}");
                error!("{msg}");
                return DownloadSession {
                    total_channels: 0,
                    total_unread: 0,
                    total_media: 0,
                    total_downloaded: 0,
                    channel_stats: Vec::new(),
                    start_time,
                    end_time: Utc::now(),
                    errors: vec![msg],
                };
            }
        };
        info!("found {} channels to process", channels.len());

        let processor = self.processor();
        let mut channel_stats: Vec<ChannelStats> = Vec::with_capacity(channels.len());
        let mut total_unread = 0;
        let mut total_media = 0;
        let mut total_downloaded = 0;

        for channel in &channels {
            let stats = processor.process(channel, mark_as_read).await;

            total_unread += stats.unread_count;
            total_media += stats.media_count;
            total_downloaded += stats.downloaded_count;

            let tripped = self.fail_fast && stats.has_errors();
            channel_stats.push(stats);

            if tripped {
                warn!(
                    "fail-fast: aborting session after errors in {}",
                    channel.title
                );
                break;
            }
        }

        let session = DownloadSession {
            total_channels: channel_stats.len(),
            total_unread,
            total_media,
            total_downloaded,
            channel_stats,
            start_time,
            end_time: Utc::now(),
            errors: Vec::new(),
        };
        info!("download session completed: {session}");
        session
    }

    async fn enumerate(&self, selection: Option<&[String]>) -> Result<Vec<ChannelInfo>> {
        let client = self.connection.client()?;
        let mut channels = client.list_channels().await?;

        if let Some(names) = selection {
            for name in names {
                if !channels.iter().any(|c| &c.title == name) {
                    warn!("channel {name:?} not found among subscriptions; skipping");
                }
            }
            let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
            channels.retain(|c| wanted.contains(c.title.as_str()));
        }

        Ok(channels)
    }

    fn processor(&self) -> ChannelProcessor {
        let fetcher = MediaFetcher::new(
            Arc::clone(&self.connection),
            self.download_root.clone(),
            Arc::clone(&self.filter),
            Arc::clone(&self.namer),
        );
        ChannelProcessor::new(Arc::clone(&self.connection), Arc::clone(&self.filter), fetcher)
    }
}

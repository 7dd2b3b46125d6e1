//! Resolves one message to a file on disk.

use super::stats::MediaRecord;
use crate::client::{Connection, Message};
use crate::filters::MediaFilter;
use crate::namers::FileNamer;
use crate::util::sanitize_channel_name;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Maximum length of a sanitized channel directory name.
const CHANNEL_DIR_MAX_CHARS: usize = 100;
/// Directory name used when sanitization leaves nothing usable.
const CHANNEL_DIR_PLACEHOLDER: &str = "Unknown_Channel";
/// Suffix for in-flight downloads; renamed away on completion so an existing
/// final path always means a complete file.
const PARTIAL_SUFFIX: &str = ".part";

/// Result of resolving one message.
///
/// The fetcher reports failures as values instead of errors: every variant is
/// attributable to exactly one message, except [`ChannelUnavailable`], which
/// tells the caller that no message in this channel can be written.
///
/// [`ChannelUnavailable`]: FetchOutcome::ChannelUnavailable
#[derive(Debug)]
pub enum FetchOutcome {
    /// Media transferred and renamed into place.
    Downloaded(MediaRecord),
    /// Destination already existed; no transfer performed.
    AlreadyPresent(MediaRecord),
    /// The filter rejected the message on re-check; nothing was transferred.
    Filtered,
    /// This message could not be resolved. Other messages are unaffected.
    Failed(String),
    /// The channel's download directory cannot be created; the caller should
    /// stop fetching for this channel.
    ChannelUnavailable(String),
}

/// Downloads media for individual messages under a per-channel directory.
pub struct MediaFetcher {
    connection: Arc<Connection>,
    download_root: PathBuf,
    filter: Arc<dyn MediaFilter>,
    namer: Arc<dyn FileNamer>,
}

impl MediaFetcher {
    pub fn new(
        connection: Arc<Connection>,
        download_root: PathBuf,
        filter: Arc<dyn MediaFilter>,
        namer: Arc<dyn FileNamer>,
    ) -> Self {
        Self {
            connection,
            download_root,
            filter,
            namer,
        }
    }

    /// Resolve one message to a [`MediaRecord`].
    ///
    /// Idempotent across runs: an already-present destination file is reported
    /// as [`FetchOutcome::AlreadyPresent`] without re-transferring. Transfers
    /// go to a `.part` path and are renamed into place, so a run killed
    /// mid-transfer never leaves a truncated file at the final path.
    pub async fn fetch(&self, message: &Message, channel_name: &str) -> FetchOutcome {
        // The processor already filtered, but fetch must never transfer media
        // the filter rejects even when called out of band.
        if !self.filter.should_download(message) {
            debug!("skipping message {} - filtered out", message.id);
            return FetchOutcome::Filtered;
        }

        let channel_dir = self.download_root.join(sanitize_channel_name(
            channel_name,
            CHANNEL_DIR_MAX_CHARS,
            CHANNEL_DIR_PLACEHOLDER,
        ));
        if let Err(e) = tokio::fs::create_dir_all(&channel_dir).await {
            return FetchOutcome::ChannelUnavailable(format!(
                "cannot create download directory {}: {e}",
                channel_dir.display()
            ));
        }

        let filename = self.namer.generate_filename(message, channel_name);
        if filename.is_empty() || filename.contains('/') || filename.contains('\\') {
            return FetchOutcome::Failed(format!(
                "namer produced unusable filename {filename:?} for message {}",
                message.id
            ));
        }
        let path = channel_dir.join(&filename);

        if path.exists() {
            info!("file already exists: {filename}");
            return FetchOutcome::AlreadyPresent(
                self.record(message, channel_name, &filename, &path).await,
            );
        }

        info!("downloading: {filename}");
        let client = match self.connection.client() {
            Ok(client) => client,
            Err(e) => return FetchOutcome::Failed(format!("message {}: {e}", message.id)),
        };

        // A stale .part from an interrupted run is overwritten here, never
        // trusted as content.
        let partial = channel_dir.join(format!("{filename}{PARTIAL_SUFFIX}"));
        let transferred = match client.download(message, &partial).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                self.discard_partial(&partial).await;
                return FetchOutcome::Failed(format!(
                    "no media transferred for message {}",
                    message.id
                ));
            }
            Err(e) => {
                self.discard_partial(&partial).await;
                return FetchOutcome::Failed(format!(
                    "error downloading message {}: {e}",
                    message.id
                ));
            }
        };

        if let Err(e) = tokio::fs::rename(&partial, &path).await {
            self.discard_partial(&partial).await;
            return FetchOutcome::Failed(format!(
                "failed to move downloaded file into place for message {}: {e}",
                message.id
            ));
        }

        let record = self.record(message, channel_name, &filename, &path).await;
        self.write_sidecar(&record).await;
        info!("successfully downloaded: {filename} ({transferred} bytes)");
        FetchOutcome::Downloaded(record)
    }

    async fn record(
        &self,
        message: &Message,
        channel_name: &str,
        filename: &str,
        path: &Path,
    ) -> MediaRecord {
        let file_size = tokio::fs::metadata(path).await.ok().map(|m| m.len());
        MediaRecord {
            message_id: message.id,
            channel_name: channel_name.to_string(),
            filename: filename.to_string(),
            path: path.to_path_buf(),
            date: message.date,
            text: message.text.clone(),
            mime_type: message.mime_type().map(String::from),
            file_size,
        }
    }

    /// Write the advisory metadata sidecar next to the media file. Never read
    /// back by the pipeline; failures are logged and swallowed.
    async fn write_sidecar(&self, record: &MediaRecord) {
        let sidecar = record.path.with_extension("txt");
        let body = format!(
            "Message ID: {}\n\
             Channel: {}\n\
             Date: {}\n\
             Filename: {}\n\
             MIME Type: {}\n\
             File Size: {} bytes\n\
             Text: {}\n",
            record.message_id,
            record.channel_name,
            record.date.format("%Y-%m-%d %H:%M:%S UTC"),
            record.filename,
            record.mime_type.as_deref().unwrap_or("Unknown"),
            record
                .file_size
                .map_or_else(|| "Unknown".to_string(), |s| s.to_string()),
            record.text.as_deref().unwrap_or("No text content"),
        );

        if let Err(e) = tokio::fs::write(&sidecar, body).await {
            warn!("failed to save metadata for {}: {e}", record.filename);
        }
    }

    async fn discard_partial(&self, partial: &Path) {
        if let Err(e) = tokio::fs::remove_file(partial).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                debug!("could not remove partial file {}: {e}", partial.display());
            }
        }
    }
}

//! File naming strategies.
//!
//! A namer maps (message, channel name) to a relative filename. Names must be
//! deterministic for identical inputs — the skip-if-present check in the
//! fetcher is only meaningful across runs if the same message always maps to
//! the same path.

use crate::client::{MediaPayload, Message};
use crate::util::sanitize_channel_name;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Deterministic filename strategy. The returned name must be a valid single
/// path component including an extension.
pub trait FileNamer: Send + Sync {
    fn generate_filename(&self, message: &Message, channel_name: &str) -> String;
}

/// `YYYYMMDD_HHMMSS_msg{id}{ext}` from the message timestamp and id.
pub struct TimestampNamer;

impl FileNamer for TimestampNamer {
    fn generate_filename(&self, message: &Message, _channel_name: &str) -> String {
        format!(
            "{}_msg{}{}",
            message.date.format("%Y%m%d_%H%M%S"),
            message.id,
            file_extension(message)
        )
    }
}

/// `{channel}_{YYYYMMDD_HHMMSS}_msg{id}{ext}`, with the channel segment
/// sanitized and capped at 50 characters.
pub struct ChannelPrefixNamer;

impl FileNamer for ChannelPrefixNamer {
    fn generate_filename(&self, message: &Message, channel_name: &str) -> String {
        format!(
            "{}_{}_msg{}{}",
            sanitize_channel_name(channel_name, 50, "Unknown"),
            message.date.format("%Y%m%d_%H%M%S"),
            message.id,
            file_extension(message)
        )
    }
}

/// Extension (with leading dot) for a message's media.
///
/// Photos are always `.jpg`. Documents fall back through MIME type, then the
/// original file name's suffix, then `.bin`.
pub fn file_extension(message: &Message) -> String {
    let Some(media) = &message.media else {
        return ".bin".to_string();
    };

    match media {
        MediaPayload::Photo => ".jpg".to_string(),
        MediaPayload::Document {
            mime_type,
            file_name,
            ..
        } => {
            if let Some(ext) = mime_type.as_deref().and_then(extension_for_mime) {
                return ext;
            }
            if let Some(ext) = file_name.as_deref().and_then(file_name_suffix) {
                return ext;
            }
            ".bin".to_string()
        }
    }
}

fn extension_for_mime(mime: &str) -> Option<String> {
    let (kind, subtype) = mime.split_once('/')?;
    if subtype.is_empty() {
        return None;
    }
    match kind {
        // Normalize the one MIME subtype that differs from its common extension.
        "image" if subtype == "jpeg" => Some(".jpg".to_string()),
        "image" | "video" | "audio" => Some(format!(".{subtype}")),
        _ => None,
    }
}

fn file_name_suffix(name: &str) -> Option<String> {
    let (stem, suffix) = name.rsplit_once('.')?;
    if stem.is_empty() || suffix.is_empty() || suffix.contains('/') {
        return None;
    }
    Some(format!(".{suffix}"))
}

/// Config/CLI selector for the bundled namers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NamerKind {
    /// Timestamp and message id (the default).
    #[default]
    Timestamp,
    /// Channel name prefix plus timestamp and message id.
    ChannelPrefix,
}

impl NamerKind {
    pub fn instantiate(self) -> Arc<dyn FileNamer> {
        match self {
            NamerKind::Timestamp => Arc::new(TimestampNamer),
            NamerKind::ChannelPrefix => Arc::new(ChannelPrefixNamer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn message(media: Option<MediaPayload>) -> Message {
        Message {
            id: 42,
            date: Utc.with_ymd_and_hms(2026, 8, 26, 9, 30, 15).unwrap(),
            text: None,
            media,
        }
    }

    fn document(mime: Option<&str>, file_name: Option<&str>) -> Option<MediaPayload> {
        Some(MediaPayload::Document {
            mime_type: mime.map(String::from),
            file_name: file_name.map(String::from),
            size: None,
        })
    }

    #[test]
    fn timestamp_namer_formats_date_and_id() {
        let name = TimestampNamer.generate_filename(&message(Some(MediaPayload::Photo)), "Chan");
        assert_eq!(name, "20260826_093015_msg42.jpg");
    }

    #[test]
    fn timestamp_namer_is_deterministic() {
        let msg = message(document(Some("video/mp4"), None));
        assert_eq!(
            TimestampNamer.generate_filename(&msg, "A"),
            TimestampNamer.generate_filename(&msg, "B"),
        );
    }

    #[test]
    fn prefix_namer_sanitizes_channel_segment() {
        let name =
            ChannelPrefixNamer.generate_filename(&message(Some(MediaPayload::Photo)), "My News!");
        assert_eq!(name, "My_News_20260826_093015_msg42.jpg");
    }

    #[test]
    fn prefix_namer_falls_back_on_empty_channel() {
        let name = ChannelPrefixNamer.generate_filename(&message(Some(MediaPayload::Photo)), "??");
        assert!(name.starts_with("Unknown_"));
    }

    #[test]
    fn extension_prefers_mime_type() {
        assert_eq!(
            file_extension(&message(document(Some("video/mp4"), Some("clip.mkv")))),
            ".mp4"
        );
    }

    #[test]
    fn extension_normalizes_jpeg() {
        assert_eq!(
            file_extension(&message(document(Some("image/jpeg"), None))),
            ".jpg"
        );
    }

    #[test]
    fn extension_falls_back_to_file_name_suffix() {
        assert_eq!(
            file_extension(&message(document(None, Some("archive.tar.gz")))),
            ".gz"
        );
        assert_eq!(
            file_extension(&message(document(Some("application/octet-stream"), Some("a.mov")))),
            ".mov"
        );
    }

    #[test]
    fn extension_defaults_to_bin() {
        assert_eq!(file_extension(&message(document(None, None))), ".bin");
        assert_eq!(file_extension(&message(document(None, Some("README")))), ".bin");
        assert_eq!(file_extension(&message(None)), ".bin");
    }

    #[test]
    fn audio_mime_maps_to_subtype() {
        assert_eq!(
            file_extension(&message(document(Some("audio/ogg"), None))),
            ".ogg"
        );
    }
}

//! Media filter strategies.
//!
//! A filter decides whether a message's attachment is worth downloading. It
//! must be a pure predicate over the message's media fields: no mutation, no
//! I/O. The processor applies the filter once to build the eligible set and
//! the fetcher re-applies it before any transfer, so a filter that lies about
//! purity only costs a skipped message, never a wrong download.

use crate::client::{MediaPayload, Message};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Eligibility predicate over a message. See module docs for the purity
/// contract.
pub trait MediaFilter: Send + Sync {
    fn should_download(&self, message: &Message) -> bool;
}

/// Downloads photos plus image and video documents.
pub struct DefaultMediaFilter;

impl MediaFilter for DefaultMediaFilter {
    fn should_download(&self, message: &Message) -> bool {
        match &message.media {
            None => false,
            Some(MediaPayload::Photo) => true,
            Some(MediaPayload::Document { mime_type, .. }) => mime_type
                .as_deref()
                .is_some_and(|m| m.starts_with("image/") || m.starts_with("video/")),
        }
    }
}

/// Downloads images only: photos and image documents.
pub struct ImageOnlyFilter;

impl MediaFilter for ImageOnlyFilter {
    fn should_download(&self, message: &Message) -> bool {
        match &message.media {
            None => false,
            Some(MediaPayload::Photo) => true,
            Some(MediaPayload::Document { mime_type, .. }) => mime_type
                .as_deref()
                .is_some_and(|m| m.starts_with("image/")),
        }
    }
}

/// Downloads video documents only. Photos never match.
pub struct VideoOnlyFilter;

impl MediaFilter for VideoOnlyFilter {
    fn should_download(&self, message: &Message) -> bool {
        match &message.media {
            Some(MediaPayload::Document { mime_type, .. }) => mime_type
                .as_deref()
                .is_some_and(|m| m.starts_with("video/")),
            _ => false,
        }
    }
}

/// Config/CLI selector for the bundled filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    /// Images and videos (the default).
    #[default]
    All,
    /// Images only.
    Images,
    /// Videos only.
    Videos,
}

impl FilterKind {
    pub fn instantiate(self) -> Arc<dyn MediaFilter> {
        match self {
            FilterKind::All => Arc::new(DefaultMediaFilter),
            FilterKind::Images => Arc::new(ImageOnlyFilter),
            FilterKind::Videos => Arc::new(VideoOnlyFilter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn message(media: Option<MediaPayload>) -> Message {
        Message {
            id: 1,
            date: Utc::now(),
            text: None,
            media,
        }
    }

    fn document(mime: Option<&str>) -> Option<MediaPayload> {
        Some(MediaPayload::Document {
            mime_type: mime.map(String::from),
            file_name: None,
            size: None,
        })
    }

    #[test]
    fn default_filter_accepts_photos_and_av_documents() {
        let f = DefaultMediaFilter;
        assert!(f.should_download(&message(Some(MediaPayload::Photo))));
        assert!(f.should_download(&message(document(Some("image/png")))));
        assert!(f.should_download(&message(document(Some("video/mp4")))));
    }

    #[test]
    fn default_filter_rejects_other_documents_and_text() {
        let f = DefaultMediaFilter;
        assert!(!f.should_download(&message(None)));
        assert!(!f.should_download(&message(document(Some("application/pdf")))));
        assert!(!f.should_download(&message(document(None))));
    }

    #[test]
    fn image_filter_rejects_videos() {
        let f = ImageOnlyFilter;
        assert!(f.should_download(&message(Some(MediaPayload::Photo))));
        assert!(f.should_download(&message(document(Some("image/webp")))));
        assert!(!f.should_download(&message(document(Some("video/mp4")))));
    }

    #[test]
    fn video_filter_rejects_photos() {
        let f = VideoOnlyFilter;
        assert!(!f.should_download(&message(Some(MediaPayload::Photo))));
        assert!(!f.should_download(&message(document(Some("image/png")))));
        assert!(f.should_download(&message(document(Some("video/webm")))));
    }

    #[test]
    fn filter_kind_round_trips_through_serde() {
        let kind: FilterKind = serde_json::from_str("\"images\"").unwrap();
        assert_eq!(kind, FilterKind::Images);
        assert_eq!(serde_json::to_string(&FilterKind::All).unwrap(), "\"all\"");
    }
}

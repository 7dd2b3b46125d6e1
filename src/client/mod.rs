//! Telegram client abstraction.
//!
//! The archiver never talks MTProto itself. Everything it needs from the
//! platform — enumerate channels, list unread messages, pull one attachment,
//! acknowledge reads — goes through the [`TelegramClient`] trait, so the
//! transport can be swapped for a test double or a different bridge.
//! [`GatewayClient`] is the bundled implementation that speaks JSON over HTTP
//! to a local MTProto gateway.

pub mod connection;
pub mod gateway;

pub use connection::Connection;
pub use gateway::GatewayClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A channel the account is subscribed to, as reported by the dialog list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub id: i64,
    /// Display name shown in the client. Used for subset selection and as the
    /// (sanitized) per-channel download directory.
    pub title: String,
    pub unread_count: u64,
}

/// Media attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaPayload {
    /// A photo. Telegram serves these as JPEG.
    Photo,
    /// A document: video, file upload, animation, audio, etc.
    Document {
        #[serde(default)]
        mime_type: Option<String>,
        #[serde(default)]
        file_name: Option<String>,
        #[serde(default)]
        size: Option<u64>,
    },
}

impl MediaPayload {
    /// MIME type of the payload, if one can be determined.
    pub fn mime_type(&self) -> Option<&str> {
        match self {
            MediaPayload::Photo => Some("image/jpeg"),
            MediaPayload::Document { mime_type, .. } => mime_type.as_deref(),
        }
    }
}

/// One message from a channel's unread backlog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub date: DateTime<Utc>,
    /// Caption or message text, if any.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub media: Option<MediaPayload>,
}

impl Message {
    pub fn mime_type(&self) -> Option<&str> {
        self.media.as_ref().and_then(MediaPayload::mime_type)
    }
}

/// Error for operations attempted against a connection that is not open.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("telegram client not connected; call connect() first")]
    NotConnected,
}

/// Access to the remote Telegram session.
///
/// Implementations are expected to keep one session and serve one in-flight
/// operation at a time; the archiver never issues concurrent calls.
#[async_trait]
pub trait TelegramClient: Send + Sync {
    /// Establish the session with the remote service.
    async fn connect(&self) -> anyhow::Result<()>;

    /// Close the session. Must be safe to call after a failed `connect`.
    async fn disconnect(&self) -> anyhow::Result<()>;

    /// Enumerate all channels the account is subscribed to, in dialog order.
    async fn list_channels(&self) -> anyhow::Result<Vec<ChannelInfo>>;

    /// Unread messages for one channel, in the order the service returns them.
    async fn unread_messages(&self, channel: &ChannelInfo) -> anyhow::Result<Vec<Message>>;

    /// Transfer the message's media to `destination`.
    ///
    /// Returns the number of bytes written, or `None` when the service had
    /// nothing to transfer for this message. `None` is a per-message failure
    /// from the caller's point of view, not a transport error.
    async fn download(&self, message: &Message, destination: &Path) -> anyhow::Result<Option<u64>>;

    /// Acknowledge everything up to `latest_message_id` in `channel` as read.
    async fn acknowledge_read(
        &self,
        channel: &ChannelInfo,
        latest_message_id: i64,
    ) -> anyhow::Result<()>;
}

//! HTTP implementation of [`TelegramClient`] against a local MTProto gateway.
//!
//! Personal-account access to Telegram requires an MTProto session, which is
//! out of scope for this crate. Instead the binary talks to a small gateway
//! process (tdlib bridge or similar) exposing the session over JSON/HTTP:
//!
//! - `POST session/connect`, `POST session/disconnect`
//! - `GET  channels` → `[{"id", "title", "unread_count"}]`
//! - `GET  channels/{id}/unread?limit=N` → array of messages
//! - `GET  messages/{id}/content` → raw bytes, `204` when there is nothing
//! - `POST channels/{id}/read` with `{"up_to": <message id>}`

use super::{ChannelInfo, Message, TelegramClient};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::json;
use std::path::Path;
use tracing::debug;

pub struct GatewayClient {
    http: reqwest::Client,
    /// Base URL of the gateway. Defaults to `http://127.0.0.1:8014`.
    base_url: String,
    /// Session identifier passed to the gateway on connect, so several
    /// archiver configs can share one gateway process.
    session_name: String,
}

impl GatewayClient {
    pub const DEFAULT_BASE_URL: &'static str = "http://127.0.0.1:8014";

    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            session_name: "telegram_session".to_string(),
        }
    }

    /// Name the gateway session to connect to.
    pub fn with_session_name(mut self, session_name: impl Into<String>) -> Self {
        self.session_name = session_name.into();
        self
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

#[async_trait]
impl TelegramClient for GatewayClient {
    async fn connect(&self) -> Result<()> {
        let resp = self
            .http
            .post(self.api_url("session/connect"))
            .json(&json!({ "session": self.session_name }))
            .send()
            .await
            .context("failed to reach telegram gateway")?;

        if !resp.status().is_success() {
            bail!("gateway connect failed: {}", resp.status());
        }
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        let resp = self
            .http
            .post(self.api_url("session/disconnect"))
            .json(&json!({ "session": self.session_name }))
            .send()
            .await
            .context("failed to reach telegram gateway")?;

        if !resp.status().is_success() {
            bail!("gateway disconnect failed: {}", resp.status());
        }
        Ok(())
    }

    async fn list_channels(&self) -> Result<Vec<ChannelInfo>> {
        let resp = self
            .http
            .get(self.api_url("channels"))
            .send()
            .await
            .context("failed to list channels")?;

        if !resp.status().is_success() {
            bail!("gateway channel listing failed: {}", resp.status());
        }

        let channels: Vec<ChannelInfo> = resp
            .json()
            .await
            .context("gateway returned malformed channel list")?;
        debug!("gateway reported {} channels", channels.len());
        Ok(channels)
    }

    async fn unread_messages(&self, channel: &ChannelInfo) -> Result<Vec<Message>> {
        let url = self.api_url(&format!("channels/{}/unread", channel.id));
        let resp = self
            .http
            .get(&url)
            .query(&[("limit", channel.unread_count)])
            .send()
            .await
            .with_context(|| format!("failed to fetch unread messages for {}", channel.title))?;

        if !resp.status().is_success() {
            bail!(
                "gateway unread listing for {} failed: {}",
                channel.title,
                resp.status()
            );
        }

        resp.json()
            .await
            .context("gateway returned malformed message list")
    }

    async fn download(&self, message: &Message, destination: &Path) -> Result<Option<u64>> {
        let url = self.api_url(&format!("messages/{}/content", message.id));
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("failed to fetch content for message {}", message.id))?;

        if resp.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !resp.status().is_success() {
            bail!(
                "gateway download for message {} failed: {}",
                message.id,
                resp.status()
            );
        }

        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Ok(None);
        }

        tokio::fs::write(destination, &bytes)
            .await
            .with_context(|| format!("failed to write {}", destination.display()))?;
        Ok(Some(bytes.len() as u64))
    }

    async fn acknowledge_read(&self, channel: &ChannelInfo, latest_message_id: i64) -> Result<()> {
        let url = self.api_url(&format!("channels/{}/read", channel.id));
        let resp = self
            .http
            .post(&url)
            .json(&json!({ "up_to": latest_message_id }))
            .send()
            .await
            .with_context(|| format!("failed to acknowledge reads in {}", channel.title))?;

        if !resp.status().is_success() {
            bail!(
                "gateway read acknowledgement for {} failed: {}",
                channel.title,
                resp.status()
            );
        }
        Ok(())
    }
}

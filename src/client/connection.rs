//! Session lifecycle guard around a [`TelegramClient`].

use super::{ClientError, TelegramClient};
use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Owns the client for the duration of an archiver run.
///
/// The connection is acquired before any channel is processed and released
/// unconditionally afterwards, success or failure. Handing out the client only
/// while connected keeps "forgot to connect" a recorded error instead of a
/// hung network call.
pub struct Connection {
    client: Arc<dyn TelegramClient>,
    connected: AtomicBool,
}

impl Connection {
    pub fn new(client: Arc<dyn TelegramClient>) -> Self {
        Self {
            client,
            connected: AtomicBool::new(false),
        }
    }

    /// Establish the session with the remote service.
    pub async fn connect(&self) -> Result<()> {
        self.client
            .connect()
            .await
            .context("telegram connection failed")?;
        self.connected.store(true, Ordering::SeqCst);
        info!("connected to telegram");
        Ok(())
    }

    /// Close the session. Errors are logged, never propagated — disconnect is
    /// best-effort cleanup.
    pub async fn disconnect(&self) {
        if !self.connected.swap(false, Ordering::SeqCst) {
            return;
        }
        match self.client.disconnect().await {
            Ok(()) => info!("disconnected from telegram"),
            Err(e) => warn!("error during disconnect: {e}"),
        }
    }

    /// The active client, or [`ClientError::NotConnected`].
    pub fn client(&self) -> Result<Arc<dyn TelegramClient>, ClientError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(Arc::clone(&self.client))
        } else {
            Err(ClientError::NotConnected)
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ChannelInfo, Message};
    use async_trait::async_trait;
    use std::path::Path;

    struct NullClient;

    #[async_trait]
    impl TelegramClient for NullClient {
        async fn connect(&self) -> Result<()> {
            Ok(())
        }
        async fn disconnect(&self) -> Result<()> {
            Ok(())
        }
        async fn list_channels(&self) -> Result<Vec<ChannelInfo>> {
            Ok(Vec::new())
        }
        async fn unread_messages(&self, _channel: &ChannelInfo) -> Result<Vec<Message>> {
            Ok(Vec::new())
        }
        async fn download(&self, _message: &Message, _dest: &Path) -> Result<Option<u64>> {
            Ok(None)
        }
        async fn acknowledge_read(&self, _channel: &ChannelInfo, _latest: i64) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn client_is_unavailable_before_connect() {
        let conn = Connection::new(Arc::new(NullClient));
        assert!(!conn.is_connected());
        assert!(conn.client().is_err());
    }

    #[tokio::test]
    async fn connect_then_disconnect_round_trip() {
        let conn = Connection::new(Arc::new(NullClient));
        conn.connect().await.unwrap();
        assert!(conn.is_connected());
        assert!(conn.client().is_ok());

        conn.disconnect().await;
        assert!(!conn.is_connected());
        assert!(conn.client().is_err());
    }

    #[tokio::test]
    async fn disconnect_without_connect_is_a_no_op() {
        let conn = Connection::new(Arc::new(NullClient));
        conn.disconnect().await;
        assert!(!conn.is_connected());
    }
}

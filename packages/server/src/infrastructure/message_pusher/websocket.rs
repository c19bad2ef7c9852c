//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - 接続へのフレーム送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の受け付けと writer タスクの起動は UI 層
//! （`ui/handler/websocket.rs`）が行う。この実装は生成された
//! `UnboundedSender` を受け取り、送信だけを担う。
//! 送信はチャンネルへの enqueue のみで、ソケット I/O を待たない。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel};

/// WebSocket を使った MessagePusher 実装
#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// 接続中の WebSocket writer へのチャンネル
    channels: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登録中の接続数
    pub async fn connection_count(&self) -> usize {
        self.channels.lock().await.len()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_connection(&self, connection: ConnectionId, sender: PusherChannel) {
        let mut channels = self.channels.lock().await;
        channels.insert(connection, sender);
        tracing::debug!("Connection '{}' registered to MessagePusher", connection);
    }

    async fn unregister_connection(&self, connection: &ConnectionId) {
        let mut channels = self.channels.lock().await;
        if channels.remove(connection).is_some() {
            tracing::debug!("Connection '{}' unregistered from MessagePusher", connection);
        }
    }

    async fn push_to(
        &self,
        connection: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let channels = self.channels.lock().await;

        let sender = channels
            .get(connection)
            .ok_or_else(|| MessagePushError::ConnectionNotFound(connection.to_string()))?;
        sender
            .send(content.to_string())
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed frame to connection '{}'", connection);
        Ok(())
    }

    async fn broadcast(&self, targets: Vec<ConnectionId>, content: &str) -> usize {
        let channels = self.channels.lock().await;
        let mut delivered = 0;

        for target in targets {
            match channels.get(&target) {
                // ブロードキャストでは一部の送信失敗を許容
                Some(sender) => match sender.send(content.to_string()) {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        tracing::warn!("Failed to push frame to connection '{}': {}", target, e)
                    }
                },
                None => tracing::warn!(
                    "Connection '{}' not found during broadcast, skipping",
                    target
                ),
            }
        }

        delivered
    }
}

//! UseCase: 新着メッセージの中継（`new message` → `message received`）

use std::sync::Arc;

use crate::domain::{
    ChatDirectory, ConnectionId, FanoutRequest, MessagePusher, RouteError, SessionRegistry,
};

use super::fanout::UserFanout;

/// メッセージ中継のユースケース
pub struct RelayMessageUseCase {
    fanout: UserFanout,
}

impl RelayMessageUseCase {
    pub fn new(
        registry: Arc<dyn SessionRegistry>,
        directory: Arc<dyn ChatDirectory>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            fanout: UserFanout::new(registry, directory, message_pusher),
        }
    }

    /// 送信者以外のチャットメンバーの全接続に `message received` を届ける
    ///
    /// # Arguments
    ///
    /// * `emitter` - イベントを送ってきた接続
    /// * `request` - チャット・送信者・メンバーヒント
    /// * `frame` - `message received` フレーム（ペイロードは受信したまま）
    pub async fn execute(
        &self,
        emitter: ConnectionId,
        request: &FanoutRequest,
        frame: &str,
    ) -> Result<Vec<ConnectionId>, RouteError> {
        self.fanout
            .deliver(emitter, request, frame, "message received")
            .await
    }
}

//! UseCase: 通話開始の通知（`call started` → `incoming call`）
//!
//! 通話の状態は持たない。同じルームで同時に複数の通話が始まっても
//! それぞれ独立に通知する。

use std::sync::Arc;

use crate::domain::{
    CallKind, ChatDirectory, ConnectionId, FanoutRequest, MessagePusher, RouteError,
    SessionRegistry,
};

use super::fanout::UserFanout;

/// 通話開始通知のユースケース
pub struct StartCallUseCase {
    fanout: UserFanout,
}

impl StartCallUseCase {
    pub fn new(
        registry: Arc<dyn SessionRegistry>,
        directory: Arc<dyn ChatDirectory>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            fanout: UserFanout::new(registry, directory, message_pusher),
        }
    }

    /// 発信者以外のチャットメンバーの全接続に `incoming call` を届ける
    pub async fn execute(
        &self,
        emitter: ConnectionId,
        request: &FanoutRequest,
        kind: CallKind,
        frame: &str,
    ) -> Result<Vec<ConnectionId>, RouteError> {
        tracing::info!(
            "User '{}' started a {} call in chat '{}'",
            request
                .origin
                .as_ref()
                .map(|user| user.as_str())
                .unwrap_or("<emitter>"),
            kind,
            request.chat
        );
        self.fanout
            .deliver(emitter, request, frame, "incoming call")
            .await
    }
}

//! UseCase: メッセージ削除の通知（`message deleted`）
//!
//! 「全員から削除」のときだけ他メンバーへ通知する。
//! 「自分だけ削除」は通知対象なし。

use std::sync::Arc;

use crate::domain::{
    ChatDirectory, ConnectionId, FanoutRequest, MessagePusher, RouteError, SessionRegistry,
};

use super::fanout::{UserFanout, ensure_admitted};

/// 削除通知のユースケース
pub struct DeleteMessageUseCase {
    registry: Arc<dyn SessionRegistry>,
    fanout: UserFanout,
}

impl DeleteMessageUseCase {
    pub fn new(
        registry: Arc<dyn SessionRegistry>,
        directory: Arc<dyn ChatDirectory>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            fanout: UserFanout::new(registry.clone(), directory, message_pusher),
            registry,
        }
    }

    /// # Arguments
    ///
    /// * `for_everyone` - ペイロードの `isDeletedForEveryone`
    pub async fn execute(
        &self,
        emitter: ConnectionId,
        request: &FanoutRequest,
        for_everyone: bool,
        frame: &str,
    ) -> Result<Vec<ConnectionId>, RouteError> {
        if !for_everyone {
            let admitted = ensure_admitted(self.registry.as_ref(), &emitter).await?;
            tracing::debug!(
                "Message in chat '{}' deleted for '{}' only, nothing to relay",
                request.chat,
                request.origin.as_ref().unwrap_or(&admitted)
            );
            return Ok(Vec::new());
        }

        self.fanout
            .deliver(emitter, request, frame, "message deleted")
            .await
    }
}

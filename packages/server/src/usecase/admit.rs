//! UseCase: admission（`setup`）
//!
//! 接続を認証済みユーザーに紐付け、その接続だけに `connected` を返す。

use std::sync::Arc;

use crate::domain::{Connection, MessagePushError, MessagePusher, SessionRegistry, UserId};

/// admission のユースケース
pub struct AdmitUseCase {
    registry: Arc<dyn SessionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl AdmitUseCase {
    pub fn new(registry: Arc<dyn SessionRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// admission を実行
    ///
    /// # Arguments
    ///
    /// * `connection` - 対象の接続（UI 層が所有）
    /// * `user` - 認証済みユーザーの ID
    /// * `connected_frame` - `connected` イベントのフレーム
    pub async fn execute(
        &self,
        connection: &mut Connection,
        user: UserId,
        connected_frame: &str,
    ) -> Result<(), MessagePushError> {
        self.registry.register(user.clone(), connection.id).await;
        connection.admit(user.clone());
        tracing::info!("Connection '{}' admitted as user '{}'", connection.id, user);

        self.message_pusher
            .push_to(&connection.id, connected_frame)
            .await
    }
}

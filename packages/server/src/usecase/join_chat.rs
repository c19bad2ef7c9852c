//! UseCase: チャットルームへの参加（`join chat`）

use std::sync::Arc;

use crate::domain::{ConnectionId, RoomId, RoomMembership, RouteError, SessionRegistry};

use super::fanout::ensure_admitted;

/// ルーム参加のユースケース
pub struct JoinChatUseCase {
    registry: Arc<dyn SessionRegistry>,
    membership: Arc<dyn RoomMembership>,
}

impl JoinChatUseCase {
    pub fn new(registry: Arc<dyn SessionRegistry>, membership: Arc<dyn RoomMembership>) -> Self {
        Self {
            registry,
            membership,
        }
    }

    /// 接続をルームに参加させる。冪等で、参加の通知は行わない。
    pub async fn execute(&self, connection: ConnectionId, room: RoomId) -> Result<(), RouteError> {
        let user = ensure_admitted(self.registry.as_ref(), &connection).await?;

        tracing::info!(
            "User '{}' (connection '{}') joined room '{}'",
            user,
            connection,
            room
        );
        self.membership.join(room, connection).await;
        Ok(())
    }
}

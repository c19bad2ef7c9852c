//! UseCase: プレゼンス照会（HTTP API / デバッグ用スナップショット）

use std::sync::Arc;

use kaiwa_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, RoomId, RoomMembership, SessionRegistry, Timestamp, TypingBoard, UserId,
};

use super::error::PresenceError;

/// 1 ユーザーのプレゼンス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPresence {
    pub user: UserId,
    /// 生きている接続（ソート済み）。空ならオフライン
    pub connections: Vec<ConnectionId>,
}

impl UserPresence {
    pub fn is_online(&self) -> bool {
        !self.connections.is_empty()
    }
}

/// Registry・Membership・TypingBoard の全体像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceSnapshot {
    pub users: Vec<(UserId, Vec<ConnectionId>)>,
    pub rooms: Vec<(RoomId, Vec<ConnectionId>)>,
    pub typing_rooms: Vec<RoomId>,
    pub generated_at: Timestamp,
}

/// プレゼンス照会のユースケース
pub struct GetPresenceUseCase {
    registry: Arc<dyn SessionRegistry>,
    membership: Arc<dyn RoomMembership>,
    board: Arc<Mutex<TypingBoard>>,
    clock: Arc<dyn Clock>,
}

impl GetPresenceUseCase {
    pub fn new(
        registry: Arc<dyn SessionRegistry>,
        membership: Arc<dyn RoomMembership>,
        board: Arc<Mutex<TypingBoard>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            membership,
            board,
            clock,
        }
    }

    pub async fn user_presence(&self, user_id: String) -> Result<UserPresence, PresenceError> {
        let user =
            UserId::new(user_id.clone()).map_err(|_| PresenceError::InvalidUserId(user_id))?;
        let mut connections: Vec<ConnectionId> = self
            .registry
            .connections_for(&user)
            .await
            .into_iter()
            .collect();
        connections.sort();

        Ok(UserPresence { user, connections })
    }

    pub async fn snapshot(&self) -> PresenceSnapshot {
        let users = self.registry.snapshot().await;
        let rooms = self.membership.snapshot().await;
        let typing_rooms = self.board.lock().await.typing_rooms();

        PresenceSnapshot {
            users,
            rooms,
            typing_rooms,
            generated_at: Timestamp::new(self.clock.now_millis()),
        }
    }
}

//! UseCase: タイピング表示（`typing` / `stop typing`）
//!
//! ルーム単位の状態遷移は TypingBoard が受け持ち、このユースケースは
//! ルームの他メンバーへの中継を行う。除外は接続単位なので、
//! 同じユーザーの別タブにはエコーが届く。
//!
//! ## テスト作業記録
//!
//! ### 何をテストしているか
//! - TypingUseCase::start() / stop() / announce_stop()
//!
//! ### どのような状況を想定しているか
//! - 正常系：発信した接続以外のルームメンバーに届く
//! - エッジケース：同一ユーザーの別タブ、連続した typing、Idle での stop typing
//! - 異常系：admission 前の接続

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, MessagePusher, RoomId, RoomMembership, RouteError, SessionRegistry, TypingBoard,
    TypingTransition,
};

use super::fanout::ensure_admitted;

/// タイピング表示のユースケース
pub struct TypingUseCase {
    registry: Arc<dyn SessionRegistry>,
    membership: Arc<dyn RoomMembership>,
    message_pusher: Arc<dyn MessagePusher>,
    /// DisconnectUseCase・GetPresenceUseCase と共有
    board: Arc<Mutex<TypingBoard>>,
}

impl TypingUseCase {
    pub fn new(
        registry: Arc<dyn SessionRegistry>,
        membership: Arc<dyn RoomMembership>,
        message_pusher: Arc<dyn MessagePusher>,
        board: Arc<Mutex<TypingBoard>>,
    ) -> Self {
        Self {
            registry,
            membership,
            message_pusher,
            board,
        }
    }

    /// `typing` を処理し、中継先の接続を返す
    pub async fn start(
        &self,
        emitter: ConnectionId,
        room: RoomId,
        frame: &str,
    ) -> Result<Vec<ConnectionId>, RouteError> {
        ensure_admitted(self.registry.as_ref(), &emitter).await?;

        let transition = self.board.lock().await.start(&room, emitter);
        if transition == TypingTransition::Started {
            tracing::debug!("Room '{}' is now typing", room);
        }

        Ok(self.relay(&room, Some(emitter), frame, "typing").await)
    }

    /// `stop typing` を処理し、中継先の接続を返す
    pub async fn stop(
        &self,
        emitter: ConnectionId,
        room: RoomId,
        frame: &str,
    ) -> Result<Vec<ConnectionId>, RouteError> {
        ensure_admitted(self.registry.as_ref(), &emitter).await?;

        let transition = self.board.lock().await.stop(&room, emitter);
        if transition == TypingTransition::Stopped {
            tracing::debug!("Room '{}' is now idle", room);
        }

        Ok(self.relay(&room, Some(emitter), frame, "stop typing").await)
    }

    /// 切断された接続に代わって `stop typing` をルームの残りメンバーに流す。
    /// ボードの状態は DisconnectUseCase 側で解放済み。
    pub async fn announce_stop(&self, room: &RoomId, frame: &str) -> Vec<ConnectionId> {
        self.relay(room, None, frame, "stop typing").await
    }

    async fn relay(
        &self,
        room: &RoomId,
        emitter: Option<ConnectionId>,
        frame: &str,
        label: &str,
    ) -> Vec<ConnectionId> {
        let mut targets: Vec<ConnectionId> = self
            .membership
            .members(room)
            .await
            .into_iter()
            .filter(|member| Some(*member) != emitter)
            .collect();
        targets.sort();

        if targets.is_empty() {
            tracing::debug!("No one else in room '{}' to receive '{}'", room, label);
            return targets;
        }

        let delivered = self.message_pusher.broadcast(targets.clone(), frame).await;
        tracing::debug!(
            "Relayed '{}' in room '{}' to {}/{} connections",
            label,
            room,
            delivered,
            targets.len()
        );
        targets
    }
}

//! UseCase: 切断処理
//!
//! ## テスト作業記録
//!
//! ### 何をテストしているか
//! - DisconnectUseCase::execute() メソッド
//! - Session Registry・Room Membership・TypingBoard・送信チャンネルの後始末
//!
//! ### なぜこのテストが必要か
//! - 切断後に古い接続へ fan-out されない（ゴースト配信が起きない）ことを保証
//! - 切断済みの接続がルームに復活しないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：admission 済み・複数ルーム参加中の接続の切断
//! - エッジケース：admission 前の切断、二重の切断、タイピング中の切断

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{
    Connection, MessagePusher, RoomId, RoomMembership, SessionRegistry, TypingBoard, UserId,
};

/// 切断処理の結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisconnectOutcome {
    /// 接続が紐付いていたユーザー（admission 前なら None）
    pub user: Option<UserId>,
    /// 接続が外されたルーム
    pub purged_rooms: Vec<RoomId>,
    /// typing を送ったまま stop typing を送らずに去ったルーム
    pub stuck_typing_rooms: Vec<RoomId>,
}

/// 切断処理のユースケース
pub struct DisconnectUseCase {
    registry: Arc<dyn SessionRegistry>,
    membership: Arc<dyn RoomMembership>,
    message_pusher: Arc<dyn MessagePusher>,
    board: Arc<Mutex<TypingBoard>>,
}

impl DisconnectUseCase {
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

    /// 切断処理を実行する。閉じ済みの接続に対しては何もしない。
    pub async fn execute(&self, connection: &mut Connection) -> DisconnectOutcome {
        if !connection.is_open() {
            tracing::debug!("Connection '{}' already closed", connection.id);
            return DisconnectOutcome::default();
        }

        let user = self.registry.unregister(&connection.id).await;
        let purged_rooms = self.membership.purge_connection(&connection.id).await;
        let stuck_typing_rooms = self.board.lock().await.release(&connection.id);
        self.message_pusher
            .unregister_connection(&connection.id)
            .await;
        connection.close();

        match &user {
            Some(user) => tracing::info!(
                "User '{}' (connection '{}') disconnected, removed from {} rooms",
                user,
                connection.id,
                purged_rooms.len()
            ),
            None => tracing::info!(
                "Connection '{}' closed before setup",
                connection.id
            ),
        }

        DisconnectOutcome {
            user,
            purged_rooms,
            stuck_typing_rooms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ConnectionId, ConnectionState, Timestamp, TypingState},
        infrastructure::{
            message_pusher::WebSocketMessagePusher,
            repository::{InMemoryRoomMembership, InMemorySessionRegistry},
        },
    };
    use std::collections::HashSet;
    use tokio::sync::mpsc;

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    struct Fixture {
        registry: Arc<InMemorySessionRegistry>,
        membership: Arc<InMemoryRoomMembership>,
        pusher: Arc<WebSocketMessagePusher>,
        board: Arc<Mutex<TypingBoard>>,
        usecase: DisconnectUseCase,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(InMemorySessionRegistry::new());
        let membership = Arc::new(InMemoryRoomMembership::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let board = Arc::new(Mutex::new(TypingBoard::new()));
        let usecase = DisconnectUseCase::new(
            registry.clone(),
            membership.clone(),
            pusher.clone(),
            board.clone(),
        );
        Fixture {
            registry,
            membership,
            pusher,
            board,
            usecase,
        }
    }

    #[tokio::test]
    async fn test_disconnect_cleans_up_everything() {
        // テスト項目: 切断で registry・全ルーム・送信チャンネルから外れ、Closed になる
        // given (前提条件):
        let f = fixture();
        let mut connection = Connection::open(ConnectionId::generate(), Timestamp::new(0));
        let (tx, _rx) = mpsc::unbounded_channel();
        f.pusher.register_connection(connection.id, tx).await;
        f.registry.register(user("A"), connection.id).await;
        connection.admit(user("A"));
        f.membership.join(room("R1"), connection.id).await;
        f.membership.join(room("R2"), connection.id).await;

        // when (操作):
        let outcome = f.usecase.execute(&mut connection).await;

        // then (期待する結果):
        assert_eq!(outcome.user, Some(user("A")));
        assert_eq!(outcome.purged_rooms, vec![room("R1"), room("R2")]);
        assert!(outcome.stuck_typing_rooms.is_empty());
        assert_eq!(connection.state, ConnectionState::Closed);
        assert!(f.registry.connections_for(&user("A")).await.is_empty());
        assert!(f.membership.members(&room("R1")).await.is_empty());
        assert!(f.membership.members(&room("R2")).await.is_empty());
        assert_eq!(f.pusher.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_disconnect_keeps_other_tabs_of_same_user() {
        // テスト項目: 片方のタブを閉じても、同じユーザーの別タブは残る
        // given (前提条件):
        let f = fixture();
        let mut tab1 = Connection::open(ConnectionId::generate(), Timestamp::new(0));
        let tab2 = ConnectionId::generate();
        f.registry.register(user("A"), tab1.id).await;
        f.registry.register(user("A"), tab2).await;
        f.membership.join(room("R"), tab1.id).await;
        f.membership.join(room("R"), tab2).await;

        // when (操作):
        f.usecase.execute(&mut tab1).await;

        // then (期待する結果):
        assert_eq!(
            f.registry.connections_for(&user("A")).await,
            HashSet::from([tab2])
        );
        assert_eq!(
            f.membership.members(&room("R")).await,
            HashSet::from([tab2])
        );
    }

    #[tokio::test]
    async fn test_disconnect_reports_stuck_typing_rooms() {
        // テスト項目: typing のまま切断したルームが報告され、Idle に戻る
        // given (前提条件):
        let f = fixture();
        let mut connection = Connection::open(ConnectionId::generate(), Timestamp::new(0));
        f.registry.register(user("A"), connection.id).await;
        {
            let mut board = f.board.lock().await;
            board.start(&room("R1"), connection.id);
            board.start(&room("R2"), connection.id);
            board.stop(&room("R2"), connection.id);
        }

        // when (操作):
        let outcome = f.usecase.execute(&mut connection).await;

        // then (期待する結果):
        assert_eq!(outcome.stuck_typing_rooms, vec![room("R1")]);
        assert_eq!(f.board.lock().await.state(&room("R1")), TypingState::Idle);
    }

    #[tokio::test]
    async fn test_disconnect_before_setup_and_twice() {
        // テスト項目: admission 前の切断も成功し、二度目の切断は何もしない
        // given (前提条件):
        let f = fixture();
        let mut connection = Connection::open(ConnectionId::generate(), Timestamp::new(0));

        // when (操作):
        let first = f.usecase.execute(&mut connection).await;
        let second = f.usecase.execute(&mut connection).await;

        // then (期待する結果):
        assert_eq!(first.user, None);
        assert_eq!(second, DisconnectOutcome::default());
        assert_eq!(connection.state, ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_no_resurrection_after_purge() {
        // テスト項目: 切断後に同じルームへ参加した別接続のメンバー一覧に、古い接続は現れない
        // given (前提条件):
        let f = fixture();
        let mut old = Connection::open(ConnectionId::generate(), Timestamp::new(0));
        f.registry.register(user("A"), old.id).await;
        f.membership.join(room("R"), old.id).await;
        f.usecase.execute(&mut old).await;

        // when (操作):
        let fresh = ConnectionId::generate();
        f.registry.register(user("B"), fresh).await;
        f.membership.join(room("R"), fresh).await;

        // then (期待する結果):
        let members = f.membership.members(&room("R")).await;
        assert!(members.contains(&fresh));
        assert!(!members.contains(&old.id));
    }
}

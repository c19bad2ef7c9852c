//! UseCase: 接続受け付け
//!
//! トランスポートが受け付けたソケットに Connection を割り当て、
//! 送信チャンネルを MessagePusher に登録する。
//! この時点ではユーザーは未確定（Session Registry には載らない）。

use std::sync::Arc;

use kaiwa_shared::time::Clock;

use crate::domain::{Connection, ConnectionId, MessagePusher, PusherChannel, Timestamp};

/// 接続受け付けのユースケース
pub struct ConnectUseCase {
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            message_pusher,
            clock,
        }
    }

    /// 接続を割り当てる
    ///
    /// # Arguments
    ///
    /// * `sender` - この接続への送信チャンネル
    pub async fn execute(&self, sender: PusherChannel) -> Connection {
        let connection = Connection::open(
            ConnectionId::generate(),
            Timestamp::new(self.clock.now_millis()),
        );
        self.message_pusher
            .register_connection(connection.id, sender)
            .await;

        tracing::info!("Connection '{}' accepted", connection.id);
        connection
    }
}

//! MessagePusher trait 定義
//!
//! 接続へのメッセージ送信（通知）を抽象化する。
//! 具体的な実装は Infrastructure 層が提供する（依存性の逆転）。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{error::MessagePushError, value_object::ConnectionId};

/// 接続ごとの送信チャンネル（UI 層の writer タスクが受信側を持つ）
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Delivery of serialized outbound frames to live connections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信チャンネルを登録
    async fn register_connection(&self, connection: ConnectionId, sender: PusherChannel);

    /// 接続の送信チャンネルを登録解除（未登録なら何もしない）
    async fn unregister_connection(&self, connection: &ConnectionId);

    /// 単一の接続へ送信
    async fn push_to(
        &self,
        connection: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続へ送信し、実際に送れた件数を返す
    ///
    /// 一部の送信失敗は許容する（best-effort）。
    async fn broadcast(&self, targets: Vec<ConnectionId>, content: &str) -> usize;
}

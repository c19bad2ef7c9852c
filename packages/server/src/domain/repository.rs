//! Repository trait 定義
//!
//! ユースケースが必要とする共有状態へのインターフェースをドメイン層が定義する。
//! 具体的な実装は Infrastructure 層が提供する（依存性の逆転）。
//!
//! どの実装もプロセス内で一度だけ生成し、`Arc<dyn Trait>` として
//! ユースケースに注入する。グローバルな static は持たない。

use std::collections::HashSet;

use async_trait::async_trait;

use super::value_object::{ConnectionId, RoomId, UserId};

/// Session Registry: user → live connections.
///
/// A connection is bound to at most one user at a time.
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// 接続をユーザーに紐付ける（冪等）
    ///
    /// 別のユーザーに紐付いていた場合は付け替える。
    async fn register(&self, user: UserId, connection: ConnectionId);

    /// 接続の紐付けを解除し、紐付いていたユーザーを返す
    async fn unregister(&self, connection: &ConnectionId) -> Option<UserId>;

    /// ユーザーの接続一覧（空集合もあり得る）
    async fn connections_for(&self, user: &UserId) -> HashSet<ConnectionId>;

    /// 接続が紐付いているユーザー（未 admission なら None）
    async fn user_of(&self, connection: &ConnectionId) -> Option<UserId>;

    /// ユーザー ID 順のスナップショット（デバッグ用）
    async fn snapshot(&self) -> Vec<(UserId, Vec<ConnectionId>)>;
}

/// Room Membership Tracker: room → subscribed connections.
///
/// Membership only grows through explicit joins; it is never inferred from a
/// chat's participant list.
#[async_trait]
pub trait RoomMembership: Send + Sync {
    /// ルームに参加（冪等）
    async fn join(&self, room: RoomId, connection: ConnectionId);

    /// ルームから退出（未参加なら何もしない）
    async fn leave(&self, room: &RoomId, connection: &ConnectionId);

    /// ルームの参加接続一覧
    async fn members(&self, room: &RoomId) -> HashSet<ConnectionId>;

    /// 接続を全ルームから外し、外したルームを返す
    async fn purge_connection(&self, connection: &ConnectionId) -> Vec<RoomId>;

    /// 接続が参加しているルーム一覧
    async fn rooms_of(&self, connection: &ConnectionId) -> Vec<RoomId>;

    /// ルーム ID 順のスナップショット（デバッグ用）
    async fn snapshot(&self) -> Vec<(RoomId, Vec<ConnectionId>)>;
}

/// Authoritative chat records pushed by the external chat-record provider.
///
/// When a record exists it wins over the member list a client embeds in an
/// event payload.
#[async_trait]
pub trait ChatDirectory: Send + Sync {
    /// チャットのメンバー一覧を登録・更新
    async fn upsert_chat(&self, chat: RoomId, members: Vec<UserId>);

    /// チャットを削除し、存在したかどうかを返す
    async fn remove_chat(&self, chat: &RoomId) -> bool;

    /// チャットのメンバー一覧（未登録なら None）
    async fn members_of(&self, chat: &RoomId) -> Option<Vec<UserId>>;
}

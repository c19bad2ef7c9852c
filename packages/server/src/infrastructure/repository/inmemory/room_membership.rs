//! InMemory Room Membership 実装
//!
//! ルーム → 接続集合 と、接続 → 参加ルーム集合 の二つの索引を持つ。
//! 切断時の purge は逆引きだけを辿るため、全ルームの走査は発生しない。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, RoomId, RoomMembership};

#[derive(Debug, Default)]
struct Memberships {
    by_room: HashMap<RoomId, HashSet<ConnectionId>>,
    by_connection: HashMap<ConnectionId, HashSet<RoomId>>,
}

impl Memberships {
    fn remove_member(&mut self, room: &RoomId, connection: &ConnectionId) -> bool {
        let Some(members) = self.by_room.get_mut(room) else {
            return false;
        };
        let removed = members.remove(connection);
        if members.is_empty() {
            self.by_room.remove(room);
        }
        removed
    }
}

/// インメモリ Room Membership 実装
#[derive(Debug, Default)]
pub struct InMemoryRoomMembership {
    memberships: Mutex<Memberships>,
}

impl InMemoryRoomMembership {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomMembership for InMemoryRoomMembership {
    async fn join(&self, room: RoomId, connection: ConnectionId) {
        let mut memberships = self.memberships.lock().await;
        memberships
            .by_connection
            .entry(connection)
            .or_default()
            .insert(room.clone());
        memberships.by_room.entry(room).or_default().insert(connection);
    }

    async fn leave(&self, room: &RoomId, connection: &ConnectionId) {
        let mut memberships = self.memberships.lock().await;
        if !memberships.remove_member(room, connection) {
            return;
        }
        if let Some(rooms) = memberships.by_connection.get_mut(connection) {
            rooms.remove(room);
            if rooms.is_empty() {
                memberships.by_connection.remove(connection);
            }
        }
    }

    async fn members(&self, room: &RoomId) -> HashSet<ConnectionId> {
        let memberships = self.memberships.lock().await;
        memberships.by_room.get(room).cloned().unwrap_or_default()
    }

    async fn purge_connection(&self, connection: &ConnectionId) -> Vec<RoomId> {
        let mut memberships = self.memberships.lock().await;
        let Some(rooms) = memberships.by_connection.remove(connection) else {
            return Vec::new();
        };

        let mut purged: Vec<RoomId> = rooms
            .into_iter()
            .filter(|room| memberships.remove_member(room, connection))
            .collect();
        purged.sort();
        purged
    }

    async fn rooms_of(&self, connection: &ConnectionId) -> Vec<RoomId> {
        let memberships = self.memberships.lock().await;
        let mut rooms: Vec<RoomId> = memberships
            .by_connection
            .get(connection)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default();
        rooms.sort();
        rooms
    }

    async fn snapshot(&self) -> Vec<(RoomId, Vec<ConnectionId>)> {
        let memberships = self.memberships.lock().await;
        let mut entries: Vec<(RoomId, Vec<ConnectionId>)> = memberships
            .by_room
            .iter()
            .map(|(room, members)| {
                let mut members: Vec<ConnectionId> = members.iter().copied().collect();
                members.sort();
                (room.clone(), members)
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - join の冪等性、leave、purge_connection
    // - 正引き・逆引きの索引が常に一致すること
    //
    // 【なぜこのテストが必要か】
    // - typing の fan-out 先はこの membership から決まる
    // - purge 漏れがあると切断済み接続への送信が続く
    // ========================================

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_join_is_idempotent() {
        // テスト項目: 同じ接続が二回 join してもメンバーは一つ
        // given (前提条件):
        let membership = InMemoryRoomMembership::new();
        let r = room("chat-1");
        let c = ConnectionId::generate();

        // when (操作):
        membership.join(r.clone(), c).await;
        membership.join(r.clone(), c).await;

        // then (期待する結果):
        assert_eq!(membership.members(&r).await, HashSet::from([c]));
        assert_eq!(membership.rooms_of(&c).await, vec![r]);
    }

    #[tokio::test]
    async fn test_purge_removes_connection_from_every_room() {
        // テスト項目: purge_connection 後はどのルームにも接続が残らない
        // given (前提条件):
        let membership = InMemoryRoomMembership::new();
        let (r1, r2) = (room("r1"), room("r2"));
        let (c1, c2) = (ConnectionId::generate(), ConnectionId::generate());
        membership.join(r1.clone(), c1).await;
        membership.join(r2.clone(), c1).await;
        membership.join(r2.clone(), c2).await;

        // when (操作):
        let purged = membership.purge_connection(&c1).await;

        // then (期待する結果):
        assert_eq!(purged, vec![r1.clone(), r2.clone()]);
        assert!(!membership.members(&r1).await.contains(&c1));
        assert_eq!(membership.members(&r2).await, HashSet::from([c2]));
        assert!(membership.rooms_of(&c1).await.is_empty());
    }

    #[tokio::test]
    async fn test_purge_prunes_empty_rooms() {
        // テスト項目: 最後のメンバーが抜けたルームはスナップショットから消える
        // given (前提条件):
        let membership = InMemoryRoomMembership::new();
        let c = ConnectionId::generate();
        membership.join(room("lonely"), c).await;

        // when (操作):
        membership.purge_connection(&c).await;

        // then (期待する結果):
        assert!(membership.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_purge_unknown_connection_is_noop() {
        // テスト項目: 一度も join していない接続の purge は空を返す
        // given (前提条件):
        let membership = InMemoryRoomMembership::new();

        // when (操作):
        let purged = membership.purge_connection(&ConnectionId::generate()).await;

        // then (期待する結果):
        assert!(purged.is_empty());
    }

    #[tokio::test]
    async fn test_leave_single_room() {
        // テスト項目: leave は指定ルームのみから外す
        // given (前提条件):
        let membership = InMemoryRoomMembership::new();
        let (r1, r2) = (room("r1"), room("r2"));
        let c = ConnectionId::generate();
        membership.join(r1.clone(), c).await;
        membership.join(r2.clone(), c).await;

        // when (操作):
        membership.leave(&r1, &c).await;
        membership.leave(&r1, &c).await;

        // then (期待する結果):
        assert!(membership.members(&r1).await.is_empty());
        assert_eq!(membership.rooms_of(&c).await, vec![r2]);
    }

    #[tokio::test]
    async fn test_rejoin_after_purge() {
        // テスト項目: purge 後に明示的に join し直せば再びメンバーになる
        // given (前提条件):
        let membership = InMemoryRoomMembership::new();
        let r = room("chat-1");
        let c = ConnectionId::generate();
        membership.join(r.clone(), c).await;
        membership.purge_connection(&c).await;

        // when (操作):
        membership.join(r.clone(), c).await;

        // then (期待する結果):
        assert_eq!(membership.members(&r).await, HashSet::from([c]));
    }
}

//! InMemory Session Registry 実装
//!
//! ユーザー → 接続集合 の正引きと、接続 → ユーザー の逆引きを
//! 1 つの Mutex の下で保持する。逆引きにより unregister は O(1)。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, SessionRegistry, UserId};

#[derive(Debug, Default)]
struct Sessions {
    by_user: HashMap<UserId, HashSet<ConnectionId>>,
    by_connection: HashMap<ConnectionId, UserId>,
}

impl Sessions {
    fn detach(&mut self, connection: &ConnectionId) -> Option<UserId> {
        let user = self.by_connection.remove(connection)?;
        if let Some(connections) = self.by_user.get_mut(&user) {
            connections.remove(connection);
            if connections.is_empty() {
                self.by_user.remove(&user);
            }
        }
        Some(user)
    }
}

/// インメモリ Session Registry 実装
#[derive(Debug, Default)]
pub struct InMemorySessionRegistry {
    sessions: Mutex<Sessions>,
}

impl InMemorySessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRegistry for InMemorySessionRegistry {
    async fn register(&self, user: UserId, connection: ConnectionId) {
        let mut sessions = self.sessions.lock().await;

        if sessions.by_connection.get(&connection) == Some(&user) {
            return;
        }
        if let Some(previous) = sessions.detach(&connection) {
            tracing::info!(
                "Connection '{}' re-admitted: moving from user '{}' to '{}'",
                connection,
                previous,
                user
            );
        }

        sessions
            .by_user
            .entry(user.clone())
            .or_default()
            .insert(connection);
        sessions.by_connection.insert(connection, user);
    }

    async fn unregister(&self, connection: &ConnectionId) -> Option<UserId> {
        let mut sessions = self.sessions.lock().await;
        sessions.detach(connection)
    }

    async fn connections_for(&self, user: &UserId) -> HashSet<ConnectionId> {
        let sessions = self.sessions.lock().await;
        sessions.by_user.get(user).cloned().unwrap_or_default()
    }

    async fn user_of(&self, connection: &ConnectionId) -> Option<UserId> {
        let sessions = self.sessions.lock().await;
        sessions.by_connection.get(connection).cloned()
    }

    async fn snapshot(&self) -> Vec<(UserId, Vec<ConnectionId>)> {
        let sessions = self.sessions.lock().await;
        let mut entries: Vec<(UserId, Vec<ConnectionId>)> = sessions
            .by_user
            .iter()
            .map(|(user, connections)| {
                let mut connections: Vec<ConnectionId> = connections.iter().copied().collect();
                connections.sort();
                (user.clone(), connections)
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
    // - register / unregister / connections_for / user_of の基本動作
    // - 1 つの接続が複数ユーザーに属さないこと
    //
    // 【なぜこのテストが必要か】
    // - ユーザー宛て fan-out の宛先はすべてこの registry から解決される
    // - 切断後に古い接続が残ると、存在しない接続への送信が積み上がる
    //
    // 【どのようなシナリオをテストするか】
    // 1. 複数タブ（同一ユーザーの複数接続）
    // 2. 二重 register の冪等性
    // 3. 別ユーザーでの再 admission（付け替え）
    // 4. 未登録接続の unregister（no-op）
    // 5. register / unregister の任意の列に対する整合性
    // ========================================

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_register_multiple_tabs() {
        // テスト項目: 同一ユーザーの複数接続がすべて返される
        // given (前提条件):
        let registry = InMemorySessionRegistry::new();
        let alice = user("alice");
        let (c1, c2) = (ConnectionId::generate(), ConnectionId::generate());

        // when (操作):
        registry.register(alice.clone(), c1).await;
        registry.register(alice.clone(), c2).await;

        // then (期待する結果):
        let connections = registry.connections_for(&alice).await;
        assert_eq!(connections, HashSet::from([c1, c2]));
        assert_eq!(registry.user_of(&c1).await, Some(alice.clone()));
    }

    #[tokio::test]
    async fn test_register_is_idempotent() {
        // テスト項目: 同じ組の二重 register はエラーにならず重複もしない
        // given (前提条件):
        let registry = InMemorySessionRegistry::new();
        let alice = user("alice");
        let c1 = ConnectionId::generate();

        // when (操作):
        registry.register(alice.clone(), c1).await;
        registry.register(alice.clone(), c1).await;

        // then (期待する結果):
        assert_eq!(registry.connections_for(&alice).await.len(), 1);
    }

    #[tokio::test]
    async fn test_register_moves_connection_between_users() {
        // テスト項目: 別ユーザーで register すると元のユーザーからは外れる
        // given (前提条件):
        let registry = InMemorySessionRegistry::new();
        let (alice, bob) = (user("alice"), user("bob"));
        let c1 = ConnectionId::generate();
        registry.register(alice.clone(), c1).await;

        // when (操作):
        registry.register(bob.clone(), c1).await;

        // then (期待する結果):
        assert!(registry.connections_for(&alice).await.is_empty());
        assert_eq!(registry.connections_for(&bob).await, HashSet::from([c1]));
        assert_eq!(registry.user_of(&c1).await, Some(bob));
    }

    #[tokio::test]
    async fn test_unregister_unknown_connection_is_noop() {
        // テスト項目: 未登録接続の unregister は None を返すだけ
        // given (前提条件):
        let registry = InMemorySessionRegistry::new();

        // when (操作):
        let removed = registry.unregister(&ConnectionId::generate()).await;

        // then (期待する結果):
        assert_eq!(removed, None);
        assert!(registry.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_unregister_keeps_other_tabs() {
        // テスト項目: 1 接続の unregister で同一ユーザーの他の接続は残る
        // given (前提条件):
        let registry = InMemorySessionRegistry::new();
        let alice = user("alice");
        let (c1, c2) = (ConnectionId::generate(), ConnectionId::generate());
        registry.register(alice.clone(), c1).await;
        registry.register(alice.clone(), c2).await;

        // when (操作):
        let removed = registry.unregister(&c1).await;

        // then (期待する結果):
        assert_eq!(removed, Some(alice.clone()));
        assert_eq!(registry.connections_for(&alice).await, HashSet::from([c2]));
        assert_eq!(registry.user_of(&c1).await, None);
    }

    #[tokio::test]
    async fn test_connections_match_model_for_operation_sequence() {
        // テスト項目: register / unregister の列の後、各ユーザーの接続集合が
        //            単純なモデルと一致し、他ユーザーの接続を含まない
        // given (前提条件):
        let registry = InMemorySessionRegistry::new();
        let users = [user("alice"), user("bob"), user("carol")];
        let connections: Vec<ConnectionId> = (0..6).map(|_| ConnectionId::generate()).collect();
        let mut model: HashMap<ConnectionId, UserId> = HashMap::new();

        // when (操作): 決定的な疑似ランダム列で操作する
        let mut seed: u64 = 0x9e37_79b9;
        for _ in 0..200 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let connection = connections[(seed >> 33) as usize % connections.len()];
            if (seed >> 20) % 3 == 0 {
                registry.unregister(&connection).await;
                model.remove(&connection);
            } else {
                let owner = users[(seed >> 40) as usize % users.len()].clone();
                registry.register(owner.clone(), connection).await;
                model.insert(connection, owner);
            }
        }

        // then (期待する結果):
        for owner in &users {
            let expected: HashSet<ConnectionId> = model
                .iter()
                .filter(|(_, u)| *u == owner)
                .map(|(c, _)| *c)
                .collect();
            assert_eq!(registry.connections_for(owner).await, expected);
        }
    }

    #[tokio::test]
    async fn test_snapshot_is_sorted_by_user() {
        // テスト項目: スナップショットはユーザー ID 順に並ぶ
        // given (前提条件):
        let registry = InMemorySessionRegistry::new();
        registry.register(user("carol"), ConnectionId::generate()).await;
        registry.register(user("alice"), ConnectionId::generate()).await;

        // when (操作):
        let snapshot = registry.snapshot().await;

        // then (期待する結果):
        let names: Vec<&str> = snapshot.iter().map(|(u, _)| u.as_str()).collect();
        assert_eq!(names, vec!["alice", "carol"]);
    }
}

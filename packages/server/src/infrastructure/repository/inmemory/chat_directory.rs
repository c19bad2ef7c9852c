//! InMemory Chat Directory 実装
//!
//! 外部のチャット管理サービスから登録された、チャットごとの正式なメンバー一覧。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{ChatDirectory, RoomId, UserId};

/// インメモリ Chat Directory 実装
#[derive(Debug, Default)]
pub struct InMemoryChatDirectory {
    chats: RwLock<HashMap<RoomId, Vec<UserId>>>,
}

impl InMemoryChatDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatDirectory for InMemoryChatDirectory {
    async fn upsert_chat(&self, chat: RoomId, mut members: Vec<UserId>) {
        members.sort();
        members.dedup();
        let mut chats = self.chats.write().await;
        chats.insert(chat, members);
    }

    async fn remove_chat(&self, chat: &RoomId) -> bool {
        let mut chats = self.chats.write().await;
        chats.remove(chat).is_some()
    }

    async fn members_of(&self, chat: &RoomId) -> Option<Vec<UserId>> {
        let chats = self.chats.read().await;
        chats.get(chat).cloned()
    }
}

//! UseCase: チャットメンバー一覧の管理（HTTP API）
//!
//! 外部のチャット記録プロバイダが正式なメンバー一覧を登録・取得・削除する。

use std::sync::Arc;

use crate::domain::{ChatDirectory, RoomId, UserId};

use super::error::ChatDirectoryError;

/// チャットメンバー一覧管理のユースケース
pub struct ManageChatUseCase {
    directory: Arc<dyn ChatDirectory>,
}

impl ManageChatUseCase {
    pub fn new(directory: Arc<dyn ChatDirectory>) -> Self {
        Self { directory }
    }

    /// メンバー一覧を登録（上書き）する
    pub async fn upsert(
        &self,
        chat_id: String,
        users: Vec<String>,
    ) -> Result<(), ChatDirectoryError> {
        let chat = parse_chat_id(chat_id)?;
        if users.is_empty() {
            return Err(ChatDirectoryError::EmptyMemberList);
        }
        let members = users
            .into_iter()
            .map(|id| {
                UserId::new(id.clone()).map_err(|_| ChatDirectoryError::InvalidUserId(id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            "Chat '{}' member list updated ({} members)",
            chat,
            members.len()
        );
        self.directory.upsert_chat(chat, members).await;
        Ok(())
    }

    pub async fn get(&self, chat_id: String) -> Result<(RoomId, Vec<UserId>), ChatDirectoryError> {
        let chat = parse_chat_id(chat_id)?;
        match self.directory.members_of(&chat).await {
            Some(members) => Ok((chat, members)),
            None => Err(ChatDirectoryError::ChatNotFound(chat.into_string())),
        }
    }

    pub async fn remove(&self, chat_id: String) -> Result<(), ChatDirectoryError> {
        let chat = parse_chat_id(chat_id)?;
        if self.directory.remove_chat(&chat).await {
            tracing::info!("Chat '{}' member list removed", chat);
            Ok(())
        } else {
            Err(ChatDirectoryError::ChatNotFound(chat.into_string()))
        }
    }
}

fn parse_chat_id(chat_id: String) -> Result<RoomId, ChatDirectoryError> {
    RoomId::new(chat_id.clone()).map_err(|_| ChatDirectoryError::InvalidChatId(chat_id))
}

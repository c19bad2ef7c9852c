//! ユーザー宛て fan-out の共通処理
//!
//! `new message` / `call started` / `message deleted` はいずれも
//! 「チャットのメンバーのうち発信者以外の全接続」へ届ける。
//! メンバー一覧は ChatDirectory の正式な記録を優先し、
//! 記録が無い場合に限りクライアントが埋め込んだ一覧（ヒント）を使う。

use std::{collections::HashSet, sync::Arc};

use crate::domain::{
    ChatDirectory, ConnectionId, FanoutRequest, MessagePusher, RouteError, SessionRegistry,
    UserId,
};

/// admission 済みの接続であればそのユーザーを返す
pub async fn ensure_admitted(
    registry: &dyn SessionRegistry,
    connection: &ConnectionId,
) -> Result<UserId, RouteError> {
    registry
        .user_of(connection)
        .await
        .ok_or(RouteError::NotAdmitted(*connection))
}

/// チャットメンバーから送信先の接続を解決する
pub struct RecipientResolver {
    registry: Arc<dyn SessionRegistry>,
    directory: Arc<dyn ChatDirectory>,
}

impl RecipientResolver {
    pub fn new(registry: Arc<dyn SessionRegistry>, directory: Arc<dyn ChatDirectory>) -> Self {
        Self {
            registry,
            directory,
        }
    }

    /// Resolve target connections for a user-addressed fan-out.
    ///
    /// Every connection of every member except `origin` is a target;
    /// `emitter` itself is never a target. Members without live connections
    /// simply contribute nothing.
    pub async fn resolve(
        &self,
        request: &FanoutRequest,
        origin: &UserId,
        emitter: &ConnectionId,
    ) -> Result<Vec<ConnectionId>, RouteError> {
        let members = match self.directory.members_of(&request.chat).await {
            Some(members) => members,
            None => match &request.member_hint {
                Some(hint) => {
                    tracing::debug!(
                        "No chat record for '{}', using client-supplied member list",
                        request.chat
                    );
                    hint.clone()
                }
                None => {
                    return Err(RouteError::malformed(format!(
                        "chat '{}': users not defined",
                        request.chat
                    )));
                }
            },
        };

        let mut seen = HashSet::new();
        let mut targets = Vec::new();
        for member in members.iter().filter(|member| *member != origin) {
            let connections = self.registry.connections_for(member).await;
            if connections.is_empty() {
                tracing::debug!("Member '{}' has no live connections", member);
            }
            for connection in connections {
                if connection != *emitter && seen.insert(connection) {
                    targets.push(connection);
                }
            }
        }

        targets.sort();
        Ok(targets)
    }
}

/// Admission check + recipient resolution + broadcast, shared by the
/// user-addressed use cases.
pub struct UserFanout {
    registry: Arc<dyn SessionRegistry>,
    resolver: RecipientResolver,
    message_pusher: Arc<dyn MessagePusher>,
}

impl UserFanout {
    pub fn new(
        registry: Arc<dyn SessionRegistry>,
        directory: Arc<dyn ChatDirectory>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            resolver: RecipientResolver::new(registry.clone(), directory),
            registry,
            message_pusher,
        }
    }

    /// Without an origin in the request, the emitter's admitted user is excluded.
    pub async fn deliver(
        &self,
        emitter: ConnectionId,
        request: &FanoutRequest,
        frame: &str,
        label: &str,
    ) -> Result<Vec<ConnectionId>, RouteError> {
        let admitted = ensure_admitted(self.registry.as_ref(), &emitter).await?;
        let origin = request.origin.clone().unwrap_or(admitted);

        let targets = self.resolver.resolve(request, &origin, &emitter).await?;
        let delivered = self
            .message_pusher
            .broadcast(targets.clone(), frame)
            .await;

        tracing::info!(
            "Relayed '{}' in chat '{}' from '{}' to {}/{} connections",
            label,
            request.chat,
            origin,
            delivered,
            targets.len()
        );

        Ok(targets)
    }
}

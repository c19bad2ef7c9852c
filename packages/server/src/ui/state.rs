//! Shared application state.

use std::sync::Arc;

use crate::usecase::{ConnectUseCase, GetPresenceUseCase, ManageChatUseCase};

use super::EventRouter;

/// Shared application state
pub struct AppState {
    /// ConnectUseCase（接続受け付けのユースケース）
    pub connect_usecase: Arc<ConnectUseCase>,
    /// 受信イベントの振り分けと切断処理
    pub event_router: Arc<EventRouter>,
    /// ManageChatUseCase（チャットメンバー一覧管理のユースケース）
    pub manage_chat_usecase: Arc<ManageChatUseCase>,
    /// GetPresenceUseCase（プレゼンス照会のユースケース）
    pub get_presence_usecase: Arc<GetPresenceUseCase>,
}

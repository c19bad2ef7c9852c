//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    infrastructure::dto::http::{
        ChatMembersDto, ChatMembersRequest, PresenceSnapshotDto, RoomMembersDto,
        UserPresenceDto, UserSessionsDto,
    },
    ui::state::AppState,
    usecase::{ChatDirectoryError, PresenceError},
};
use kaiwa_shared::time::millis_to_rfc3339;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Whether a user has at least one live connection
pub async fn get_user_presence(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserPresenceDto>, StatusCode> {
    match state.get_presence_usecase.user_presence(user_id).await {
        Ok(presence) => {
            // Domain Model から DTO への変換
            Ok(Json(UserPresenceDto {
                online: presence.is_online(),
                user_id: presence.user.into_string(),
                connections: presence
                    .connections
                    .iter()
                    .map(|connection| connection.to_string())
                    .collect(),
            }))
        }
        Err(PresenceError::InvalidUserId(id)) => {
            tracing::warn!("Presence lookup with invalid user id '{}'", id);
            Err(StatusCode::BAD_REQUEST)
        }
    }
}

/// Upsert the authoritative member list of a chat
pub async fn put_chat(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
    Json(body): Json<ChatMembersRequest>,
) -> StatusCode {
    match state.manage_chat_usecase.upsert(chat_id, body.users).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(e) => chat_error_status(e),
    }
}

pub async fn get_chat(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
) -> Result<Json<ChatMembersDto>, StatusCode> {
    match state.manage_chat_usecase.get(chat_id).await {
        Ok((chat, members)) => Ok(Json(ChatMembersDto {
            chat_id: chat.into_string(),
            users: members.into_iter().map(|user| user.into_string()).collect(),
        })),
        Err(e) => Err(chat_error_status(e)),
    }
}

pub async fn delete_chat(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
) -> StatusCode {
    match state.manage_chat_usecase.remove(chat_id).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(e) => chat_error_status(e),
    }
}

fn chat_error_status(error: ChatDirectoryError) -> StatusCode {
    match error {
        ChatDirectoryError::ChatNotFound(_) => StatusCode::NOT_FOUND,
        ChatDirectoryError::InvalidChatId(_)
        | ChatDirectoryError::InvalidUserId(_)
        | ChatDirectoryError::EmptyMemberList => {
            tracing::warn!("Rejected chat directory request: {}", error);
            StatusCode::BAD_REQUEST
        }
    }
}

/// Debug endpoint to dump registry, memberships and typing rooms (for testing purposes)
pub async fn debug_presence(State(state): State<Arc<AppState>>) -> Json<PresenceSnapshotDto> {
    let snapshot = state.get_presence_usecase.snapshot().await;

    // Domain Model から DTO への変換
    Json(PresenceSnapshotDto {
        users: snapshot
            .users
            .into_iter()
            .map(|(user, connections)| UserSessionsDto {
                user_id: user.into_string(),
                connections: connections.iter().map(|c| c.to_string()).collect(),
            })
            .collect(),
        rooms: snapshot
            .rooms
            .into_iter()
            .map(|(room, connections)| RoomMembersDto {
                room_id: room.into_string(),
                connections: connections.iter().map(|c| c.to_string()).collect(),
            })
            .collect(),
        typing_rooms: snapshot
            .typing_rooms
            .into_iter()
            .map(|room| room.into_string())
            .collect(),
        generated_at: millis_to_rfc3339(snapshot.generated_at.value()),
    })
}

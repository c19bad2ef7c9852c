//! HTTP API request / response DTOs.

use serde::{Deserialize, Serialize};

/// `PUT /api/chats/{chat_id}` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMembersRequest {
    pub users: Vec<String>,
}

/// `GET /api/chats/{chat_id}` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMembersDto {
    pub chat_id: String,
    pub users: Vec<String>,
}

/// `GET /api/users/{user_id}/presence` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPresenceDto {
    pub user_id: String,
    pub online: bool,
    pub connections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSessionsDto {
    pub user_id: String,
    pub connections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMembersDto {
    pub room_id: String,
    pub connections: Vec<String>,
}

/// `GET /debug/presence` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceSnapshotDto {
    pub users: Vec<UserSessionsDto>,
    pub rooms: Vec<RoomMembersDto>,
    pub typing_rooms: Vec<String>,
    /// RFC 3339
    pub generated_at: String,
}

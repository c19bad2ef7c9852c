//! Conversion from wire payloads to domain inputs.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{FanoutRequest, RoomId, RouteError, UserId};
use crate::infrastructure::dto::websocket::{
    CallStartedPayload, ChatRef, MessageDeletedPayload, NewMessagePayload, UserRef,
};

/// Deserialize a payload view, mapping failures to `MalformedEvent`.
pub fn parse_payload<T: DeserializeOwned>(event: &str, payload: &Value) -> Result<T, RouteError> {
    T::deserialize(payload).map_err(|e| RouteError::malformed(format!("{event}: {e}")))
}

/// Room-scoped events carry the bare room id string.
pub fn parse_room(event: &str, payload: &Value) -> Result<RoomId, RouteError> {
    match payload {
        Value::String(room) => Ok(RoomId::new(room.clone())?),
        other => Err(RouteError::malformed(format!(
            "{event}: expected room id string, got {other}"
        ))),
    }
}

fn member_hint(chat: &ChatRef) -> Option<Vec<UserId>> {
    chat.users
        .as_ref()
        .map(|users| users.iter().map(|u| u.id().clone()).collect())
}

fn fanout_request(chat: ChatRef, origin: Option<UserRef>) -> FanoutRequest {
    FanoutRequest {
        member_hint: member_hint(&chat),
        chat: chat.id,
        origin: origin.map(|user| user.id().clone()),
    }
}

impl From<NewMessagePayload> for FanoutRequest {
    fn from(payload: NewMessagePayload) -> Self {
        fanout_request(payload.chat, Some(payload.sender))
    }
}

impl From<CallStartedPayload> for FanoutRequest {
    fn from(payload: CallStartedPayload) -> Self {
        fanout_request(payload.chat, Some(payload.caller))
    }
}

impl From<MessageDeletedPayload> for FanoutRequest {
    fn from(payload: MessageDeletedPayload) -> Self {
        fanout_request(payload.chat, payload.sender)
    }
}

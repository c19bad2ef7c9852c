//! WebSocket frame DTOs.
//!
//! Every frame is a JSON object `{"event": <name>, "payload": <any>}`.
//! Payloads are kept as raw `serde_json::Value` so they can be relayed to
//! peers unchanged; the `*Payload` views below only pick out the fields the
//! router needs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{CallKind, RoomId, UserId};

/// Client → server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum InboundEvent {
    #[serde(rename = "setup")]
    Setup(Value),
    #[serde(rename = "join chat")]
    JoinChat(Value),
    #[serde(rename = "typing")]
    Typing(Value),
    #[serde(rename = "stop typing")]
    StopTyping(Value),
    #[serde(rename = "new message")]
    NewMessage(Value),
    #[serde(rename = "call started")]
    CallStarted(Value),
    #[serde(rename = "message deleted")]
    MessageDeleted(Value),
}

impl InboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            InboundEvent::Setup(_) => "setup",
            InboundEvent::JoinChat(_) => "join chat",
            InboundEvent::Typing(_) => "typing",
            InboundEvent::StopTyping(_) => "stop typing",
            InboundEvent::NewMessage(_) => "new message",
            InboundEvent::CallStarted(_) => "call started",
            InboundEvent::MessageDeleted(_) => "message deleted",
        }
    }
}

/// Server → client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum OutboundEvent {
    #[serde(rename = "connected")]
    Connected,
    #[serde(rename = "typing")]
    Typing(Value),
    #[serde(rename = "stop typing")]
    StopTyping(Value),
    #[serde(rename = "message received")]
    MessageReceived(Value),
    #[serde(rename = "incoming call")]
    IncomingCall(Value),
    #[serde(rename = "message deleted")]
    MessageDeleted(Value),
}

impl OutboundEvent {
    /// Serialize to the text frame sent over the socket
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A user reference as found in payloads: either a populated user object
/// (`{"_id": "...", "name": ..., "pic": ...}`) or a bare id string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Populated {
        #[serde(rename = "_id")]
        id: UserId,
    },
    Bare(UserId),
}

impl UserRef {
    pub fn id(&self) -> &UserId {
        match self {
            UserRef::Populated { id } | UserRef::Bare(id) => id,
        }
    }
}

/// `chat` field of message / call payloads
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatRef {
    #[serde(rename = "_id")]
    pub id: RoomId,
    #[serde(default)]
    pub users: Option<Vec<UserRef>>,
}

/// `setup` payload: the authenticated user object
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetupPayload {
    #[serde(rename = "_id")]
    pub id: UserId,
}

/// `new message` payload: an already persisted message record
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewMessagePayload {
    pub chat: ChatRef,
    pub sender: UserRef,
}

/// `call started` payload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CallStartedPayload {
    pub chat: ChatRef,
    pub caller: UserRef,
    #[serde(rename = "callType")]
    pub call_type: CallKind,
}

/// `message deleted` payload: the message record after the store applied the deletion.
/// Deletion records may omit `sender`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageDeletedPayload {
    pub chat: ChatRef,
    #[serde(default)]
    pub sender: Option<UserRef>,
    #[serde(rename = "isDeletedForEveryone", default)]
    pub is_deleted_for_everyone: bool,
}

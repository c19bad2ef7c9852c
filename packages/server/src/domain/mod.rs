//! Domain layer: value objects, entities and the interfaces the use cases
//! depend on. Nothing here knows about axum or WebSocket frames.

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{
    Connection, ConnectionState, FanoutRequest, TypingBoard, TypingState, TypingTransition,
};
pub use error::{MessagePushError, RouteError, ValueObjectError};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::{ChatDirectory, RoomMembership, SessionRegistry};
pub use value_object::{CallKind, ConnectionId, RoomId, Timestamp, UserId};

#[cfg(test)]
pub use message_pusher::MockMessagePusher;

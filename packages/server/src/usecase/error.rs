//! UseCase error types.

use thiserror::Error;

/// Chat directory management failures (HTTP surface)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatDirectoryError {
    #[error("invalid chat id: {0}")]
    InvalidChatId(String),

    #[error("invalid user id: {0}")]
    InvalidUserId(String),

    #[error("a chat needs at least one member")]
    EmptyMemberList,

    #[error("chat '{0}' not found")]
    ChatNotFound(String),
}

/// Presence query failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresenceError {
    #[error("invalid user id: {0}")]
    InvalidUserId(String),
}

//! UseCase layer: one use case per operation of the presence / fan-out core.

mod admit;
mod connect;
mod delete_message;
mod disconnect;
mod error;
mod fanout;
mod get_presence;
mod join_chat;
mod manage_chat;
mod relay_message;
mod start_call;
mod typing;

pub use admit::AdmitUseCase;
pub use connect::ConnectUseCase;
pub use delete_message::DeleteMessageUseCase;
pub use disconnect::{DisconnectOutcome, DisconnectUseCase};
pub use error::{ChatDirectoryError, PresenceError};
pub use fanout::{RecipientResolver, UserFanout, ensure_admitted};
pub use get_presence::{GetPresenceUseCase, PresenceSnapshot, UserPresence};
pub use join_chat::JoinChatUseCase;
pub use manage_chat::ManageChatUseCase;
pub use relay_message::RelayMessageUseCase;
pub use start_call::StartCallUseCase;
pub use typing::TypingUseCase;

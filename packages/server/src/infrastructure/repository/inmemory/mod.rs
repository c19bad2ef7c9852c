//! In-memory repositories backed by `HashMap`s behind `tokio::sync::Mutex`.

mod chat_directory;
mod room_membership;
mod session_registry;

pub use chat_directory::InMemoryChatDirectory;
pub use room_membership::InMemoryRoomMembership;
pub use session_registry::InMemorySessionRegistry;

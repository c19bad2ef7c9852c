//! Request handlers.

mod http;
mod websocket;

pub use http::{
    debug_presence, delete_chat, get_chat, get_user_presence, health_check, put_chat,
};
pub use websocket::websocket_handler;

//! UI layer: axum router, WebSocket transport and the HTTP surface.

mod event_router;
mod handler;
mod server;
mod signal;
pub mod state;

pub use event_router::EventRouter;
pub use server::Server;

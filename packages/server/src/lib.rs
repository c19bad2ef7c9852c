//! Real-time presence and message fan-out server.
//!
//! Tracks which users are connected, which connections subscribed to which
//! chat rooms, and relays message, typing, call and delete events to the
//! right set of live WebSocket sessions with best-effort delivery.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;

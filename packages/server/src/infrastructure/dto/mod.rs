//! Data Transfer Objects.
//!
//! - `websocket`: inbound / outbound event frames and payload views
//! - `http`: HTTP API request / response bodies
//! - `conversion`: payload views → domain inputs

pub mod conversion;
pub mod http;
pub mod websocket;

//! Utilities shared by the Kaiwa binaries and their tests.

pub mod logger;
pub mod time;

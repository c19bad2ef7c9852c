//! Command line / environment configuration.

use clap::Parser;

/// Default listening port
pub const DEFAULT_PORT: u16 = 5001;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "kaiwa-server")]
#[command(about = "Real-time presence and message fan-out server", long_about = None)]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "KAIWA_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "KAIWA_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Relay `stop typing` for rooms a connection was still typing in when it disconnected
    #[arg(long, env = "KAIWA_STOP_TYPING_ON_DISCONNECT")]
    pub stop_typing_on_disconnect: bool,
}

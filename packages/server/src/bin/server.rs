//! Kaiwa presence and fan-out server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kaiwa-server
//! cargo run --bin kaiwa-server -- --host 0.0.0.0 --port 5001 --stop-typing-on-disconnect
//! ```

use std::sync::Arc;

use clap::Parser;
use kaiwa_server::{
    config::ServerConfig,
    domain::TypingBoard,
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryChatDirectory, InMemoryRoomMembership, InMemorySessionRegistry},
    },
    ui::{EventRouter, Server},
    usecase::{
        AdmitUseCase, ConnectUseCase, DeleteMessageUseCase, DisconnectUseCase, GetPresenceUseCase,
        JoinChatUseCase, ManageChatUseCase, RelayMessageUseCase, StartCallUseCase, TypingUseCase,
    },
};
use kaiwa_shared::{logger::setup_logger, time::SystemClock};
use tokio::sync::Mutex;

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    // Initialize dependencies in order:
    // 1. Repositories
    // 2. MessagePusher
    // 3. UseCases
    // 4. EventRouter
    // 5. Server

    // 1. Create Repositories (in-memory)
    let registry = Arc::new(InMemorySessionRegistry::new());
    let membership = Arc::new(InMemoryRoomMembership::new());
    let directory = Arc::new(InMemoryChatDirectory::new());
    let typing_board = Arc::new(Mutex::new(TypingBoard::new()));
    let clock = Arc::new(SystemClock);

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create UseCases
    let connect_usecase = Arc::new(ConnectUseCase::new(message_pusher.clone(), clock.clone()));
    let admit_usecase = Arc::new(AdmitUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let join_chat_usecase = Arc::new(JoinChatUseCase::new(registry.clone(), membership.clone()));
    let typing_usecase = Arc::new(TypingUseCase::new(
        registry.clone(),
        membership.clone(),
        message_pusher.clone(),
        typing_board.clone(),
    ));
    let relay_message_usecase = Arc::new(RelayMessageUseCase::new(
        registry.clone(),
        directory.clone(),
        message_pusher.clone(),
    ));
    let start_call_usecase = Arc::new(StartCallUseCase::new(
        registry.clone(),
        directory.clone(),
        message_pusher.clone(),
    ));
    let delete_message_usecase = Arc::new(DeleteMessageUseCase::new(
        registry.clone(),
        directory.clone(),
        message_pusher.clone(),
    ));
    let disconnect_usecase = Arc::new(DisconnectUseCase::new(
        registry.clone(),
        membership.clone(),
        message_pusher.clone(),
        typing_board.clone(),
    ));
    let manage_chat_usecase = Arc::new(ManageChatUseCase::new(directory.clone()));
    let get_presence_usecase = Arc::new(GetPresenceUseCase::new(
        registry.clone(),
        membership.clone(),
        typing_board.clone(),
        clock.clone(),
    ));

    // 4. Create EventRouter
    let event_router = Arc::new(
        EventRouter::new(
            admit_usecase,
            join_chat_usecase,
            typing_usecase,
            relay_message_usecase,
            start_call_usecase,
            delete_message_usecase,
            disconnect_usecase,
        )
        .with_stop_typing_on_disconnect(config.stop_typing_on_disconnect),
    );
    if config.stop_typing_on_disconnect {
        tracing::info!("Implicit stop typing on disconnect is enabled");
    }

    // 5. Create and run the server
    let server = Server::new(
        connect_usecase,
        event_router,
        manage_chat_usecase,
        get_presence_usecase,
    );
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

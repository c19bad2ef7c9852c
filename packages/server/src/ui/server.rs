//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, put},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::usecase::{ConnectUseCase, GetPresenceUseCase, ManageChatUseCase};

use super::{
    EventRouter,
    handler::{
        debug_presence, delete_chat, get_chat, get_user_presence, health_check, put_chat,
        websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Presence and fan-out server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_usecase,
///     event_router,
///     manage_chat_usecase,
///     get_presence_usecase,
/// );
/// server.run("127.0.0.1".to_string(), 5001).await?;
/// ```
pub struct Server {
    connect_usecase: Arc<ConnectUseCase>,
    event_router: Arc<EventRouter>,
    manage_chat_usecase: Arc<ManageChatUseCase>,
    get_presence_usecase: Arc<GetPresenceUseCase>,
}

impl Server {
    pub fn new(
        connect_usecase: Arc<ConnectUseCase>,
        event_router: Arc<EventRouter>,
        manage_chat_usecase: Arc<ManageChatUseCase>,
        get_presence_usecase: Arc<GetPresenceUseCase>,
    ) -> Self {
        Self {
            connect_usecase,
            event_router,
            manage_chat_usecase,
            get_presence_usecase,
        }
    }

    /// Build the axum router with every endpoint
    pub fn router(self) -> Router {
        let app_state = Arc::new(AppState {
            connect_usecase: self.connect_usecase,
            event_router: self.event_router,
            manage_chat_usecase: self.manage_chat_usecase,
            get_presence_usecase: self.get_presence_usecase,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/users/{user_id}/presence", get(get_user_presence))
            .route(
                "/api/chats/{chat_id}",
                put(put_chat).get(get_chat).delete(delete_chat),
            )
            .route("/debug/presence", get(debug_presence))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 5001)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Kaiwa server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on an already bound listener until a shutdown signal arrives
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

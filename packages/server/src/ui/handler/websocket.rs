//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::sync::mpsc;

use crate::{domain::Connection, ui::state::AppState};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that drains this connection's outbound channel into the socket.
///
/// Frames pushed by any use case for this connection arrive on `rx` in push
/// order and are written one by one, so ordering per target is preserved.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Reads frames until the peer closes or the socket errors.
async fn read_loop(
    state: &AppState,
    connection: &mut Connection,
    mut receiver: SplitStream<WebSocket>,
) {
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("WebSocket error on '{}': {}", connection.id, e);
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                state.event_router.route(connection, text.as_str()).await;
            }
            Message::Binary(_) => {
                tracing::warn!(
                    kind = "MALFORMED_EVENT",
                    "Dropped binary frame from connection '{}'",
                    connection.id
                );
            }
            Message::Ping(_) => {
                // Pong is sent by the WebSocket protocol layer
                tracing::debug!("Received ping from '{}'", connection.id);
            }
            Message::Close(_) => {
                tracing::info!("Connection '{}' requested close", connection.id);
                break;
            }
            Message::Pong(_) => {}
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, receiver) = socket.split();

    // Outbound channel for this connection
    let (tx, rx) = mpsc::unbounded_channel();
    let mut connection = state.connect_usecase.execute(tx).await;

    let mut send_task = pusher_loop(rx, sender);

    // Whichever side finishes first ends the session
    tokio::select! {
        _ = read_loop(&state, &mut connection, receiver) => {}
        _ = &mut send_task => {}
    }
    send_task.abort();

    let outcome = state.event_router.disconnect(&mut connection).await;
    tracing::info!(
        "Session '{}' ended (user: {}, rooms left: {})",
        connection.id,
        outcome
            .user
            .as_ref()
            .map(|user| user.as_str())
            .unwrap_or("<not admitted>"),
        outcome.purged_rooms.len()
    );
}

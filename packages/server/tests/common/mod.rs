//! Shared helpers for the integration tests: an in-process server on an
//! ephemeral port and a small WebSocket test client.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use kaiwa_server::{
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
use kaiwa_shared::time::SystemClock;
use serde_json::{Value, json};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::Mutex,
    time::timeout,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

const RECV_TIMEOUT: Duration = Duration::from_secs(2);
const SILENCE_WINDOW: Duration = Duration::from_millis(300);

/// Server running inside the test process
pub struct TestServer {
    addr: SocketAddr,
    handle: tokio::task::JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(false).await
    }

    pub async fn start_with(stop_typing_on_disconnect: bool) -> Self {
        let registry = Arc::new(InMemorySessionRegistry::new());
        let membership = Arc::new(InMemoryRoomMembership::new());
        let directory = Arc::new(InMemoryChatDirectory::new());
        let typing_board = Arc::new(Mutex::new(TypingBoard::new()));
        let clock = Arc::new(SystemClock);
        let message_pusher = Arc::new(WebSocketMessagePusher::new());

        let event_router = EventRouter::new(
            Arc::new(AdmitUseCase::new(registry.clone(), message_pusher.clone())),
            Arc::new(JoinChatUseCase::new(registry.clone(), membership.clone())),
            Arc::new(TypingUseCase::new(
                registry.clone(),
                membership.clone(),
                message_pusher.clone(),
                typing_board.clone(),
            )),
            Arc::new(RelayMessageUseCase::new(
                registry.clone(),
                directory.clone(),
                message_pusher.clone(),
            )),
            Arc::new(StartCallUseCase::new(
                registry.clone(),
                directory.clone(),
                message_pusher.clone(),
            )),
            Arc::new(DeleteMessageUseCase::new(
                registry.clone(),
                directory.clone(),
                message_pusher.clone(),
            )),
            Arc::new(DisconnectUseCase::new(
                registry.clone(),
                membership.clone(),
                message_pusher.clone(),
                typing_board.clone(),
            )),
        )
        .with_stop_typing_on_disconnect(stop_typing_on_disconnect);

        let server = Server::new(
            Arc::new(ConnectUseCase::new(message_pusher.clone(), clock.clone())),
            Arc::new(event_router),
            Arc::new(ManageChatUseCase::new(directory)),
            Arc::new(GetPresenceUseCase::new(
                registry,
                membership,
                typing_board,
                clock,
            )),
        );

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind ephemeral port");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let handle = tokio::spawn(server.serve(listener));

        TestServer { addr, handle }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Open a WebSocket without admitting it
    pub async fn connect(&self) -> TestClient {
        let (ws, _) = connect_async(self.ws_url())
            .await
            .expect("Failed to connect");
        TestClient { ws, user: None }
    }

    /// Open a WebSocket and admit it as `user`
    pub async fn connect_as(&self, user: &str) -> TestClient {
        let mut client = self.connect().await;
        client.setup(user).await;
        client
    }

    pub async fn presence(&self) -> Value {
        reqwest::get(self.http_url("/debug/presence"))
            .await
            .expect("Failed to request presence")
            .json()
            .await
            .expect("Presence is not JSON")
    }

    /// Poll the debug snapshot until `predicate` holds
    pub async fn wait_for_presence(&self, predicate: impl Fn(&Value) -> bool) -> Value {
        let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
        loop {
            let snapshot = self.presence().await;
            if predicate(&snapshot) {
                return snapshot;
            }
            if tokio::time::Instant::now() > deadline {
                panic!("Presence never reached the expected state: {snapshot}");
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// WebSocket client speaking the `{event, payload}` frame format
pub struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    user: Option<String>,
}

impl TestClient {
    pub async fn emit(&mut self, event: &str, payload: Value) {
        self.send_raw(json!({"event": event, "payload": payload}).to_string())
            .await;
    }

    pub async fn send_raw(&mut self, text: String) {
        self.ws
            .send(Message::Text(text.into()))
            .await
            .expect("Failed to send frame");
    }

    pub async fn setup(&mut self, user: &str) {
        self.emit("setup", json!({"_id": user, "name": user})).await;
        let connected = self.next_event().await;
        assert_eq!(connected, json!({"event": "connected"}));
        self.user = Some(user.to_string());
    }

    /// Wait until every frame sent so far has been processed by the server.
    ///
    /// Frames of one connection are handled in order, so re-sending `setup`
    /// for the same user and waiting for its `connected` is a barrier.
    pub async fn sync(&mut self) {
        let user = self.user.clone().expect("sync requires an admitted client");
        self.setup(&user).await;
    }

    pub async fn join(&mut self, room: &str) {
        self.emit("join chat", json!(room)).await;
        self.sync().await;
    }

    /// Next text frame as JSON
    pub async fn next_event(&mut self) -> Value {
        loop {
            let msg = timeout(RECV_TIMEOUT, self.ws.next())
                .await
                .expect("Timed out waiting for a frame")
                .expect("Connection closed")
                .expect("WebSocket error");
            if let Message::Text(text) = msg {
                return serde_json::from_str(text.as_str()).expect("Frame is not JSON");
            }
        }
    }

    /// Assert no text frame arrives within a short window
    pub async fn expect_silence(&mut self) {
        loop {
            match timeout(SILENCE_WINDOW, self.ws.next()).await {
                Err(_) => return,
                Ok(Some(Ok(Message::Text(text)))) => panic!("Unexpected frame: {}", text.as_str()),
                Ok(Some(Ok(_))) => continue,
                Ok(_) => return,
            }
        }
    }

    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }
}

/// Chat object as embedded in message payloads
pub fn chat(id: &str, users: &[&str]) -> Value {
    json!({
        "_id": id,
        "users": users.iter().map(|u| json!({"_id": u})).collect::<Vec<_>>()
    })
}

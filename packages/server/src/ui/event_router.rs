//! Inbound event routing.
//!
//! Decodes a text frame into an [`InboundEvent`], converts its payload into
//! domain inputs, builds the outbound frame, and hands both to the matching
//! use case. Failures never travel back over the socket: they are logged with
//! their [`RouteError::kind`] and the event is dropped.

use std::sync::Arc;

use serde_json::{Value, json};

use crate::{
    domain::{Connection, FanoutRequest, RouteError},
    infrastructure::dto::{
        conversion::{parse_payload, parse_room},
        websocket::{
            CallStartedPayload, InboundEvent, MessageDeletedPayload, NewMessagePayload,
            OutboundEvent, SetupPayload,
        },
    },
    usecase::{
        AdmitUseCase, DeleteMessageUseCase, DisconnectOutcome, DisconnectUseCase,
        JoinChatUseCase, RelayMessageUseCase, StartCallUseCase, TypingUseCase,
    },
};

/// Dispatches inbound events of one connection to the use cases
pub struct EventRouter {
    admit_usecase: Arc<AdmitUseCase>,
    join_chat_usecase: Arc<JoinChatUseCase>,
    typing_usecase: Arc<TypingUseCase>,
    relay_message_usecase: Arc<RelayMessageUseCase>,
    start_call_usecase: Arc<StartCallUseCase>,
    delete_message_usecase: Arc<DeleteMessageUseCase>,
    disconnect_usecase: Arc<DisconnectUseCase>,
    /// Relay `stop typing` for rooms a departing connection left typing in
    stop_typing_on_disconnect: bool,
}

impl EventRouter {
    pub fn new(
        admit_usecase: Arc<AdmitUseCase>,
        join_chat_usecase: Arc<JoinChatUseCase>,
        typing_usecase: Arc<TypingUseCase>,
        relay_message_usecase: Arc<RelayMessageUseCase>,
        start_call_usecase: Arc<StartCallUseCase>,
        delete_message_usecase: Arc<DeleteMessageUseCase>,
        disconnect_usecase: Arc<DisconnectUseCase>,
    ) -> Self {
        Self {
            admit_usecase,
            join_chat_usecase,
            typing_usecase,
            relay_message_usecase,
            start_call_usecase,
            delete_message_usecase,
            disconnect_usecase,
            stop_typing_on_disconnect: false,
        }
    }

    pub fn with_stop_typing_on_disconnect(mut self, enabled: bool) -> Self {
        self.stop_typing_on_disconnect = enabled;
        self
    }

    /// Route one text frame received on `connection`
    pub async fn route(&self, connection: &mut Connection, text: &str) {
        let event = match serde_json::from_str::<InboundEvent>(text) {
            Ok(event) => event,
            Err(e) => {
                log_dropped(connection, "<undecodable>", &RouteError::malformed(e.to_string()));
                return;
            }
        };

        let name = event.name();
        tracing::debug!("Connection '{}' sent '{}'", connection.id, name);
        if let Err(e) = self.dispatch(connection, event).await {
            log_dropped(connection, name, &e);
        }
    }

    /// Tear down `connection`, optionally relaying implicit `stop typing`
    pub async fn disconnect(&self, connection: &mut Connection) -> DisconnectOutcome {
        let outcome = self.disconnect_usecase.execute(connection).await;

        if self.stop_typing_on_disconnect {
            for room in &outcome.stuck_typing_rooms {
                let frame = match encode(&OutboundEvent::StopTyping(Value::String(
                    room.as_str().to_string(),
                ))) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::error!("Failed to encode implicit stop typing: {}", e);
                        continue;
                    }
                };
                let targets = self.typing_usecase.announce_stop(room, &frame).await;
                tracing::info!(
                    "Implicit stop typing in room '{}' sent to {} connections",
                    room,
                    targets.len()
                );
            }
        }

        outcome
    }

    async fn dispatch(
        &self,
        connection: &mut Connection,
        event: InboundEvent,
    ) -> Result<(), RouteError> {
        match event {
            InboundEvent::Setup(payload) => {
                let setup: SetupPayload = parse_payload("setup", &payload)?;
                let frame = encode(&OutboundEvent::Connected)?;
                if let Err(e) = self
                    .admit_usecase
                    .execute(connection, setup.id, &frame)
                    .await
                {
                    tracing::warn!(
                        "Failed to acknowledge setup on '{}': {}",
                        connection.id,
                        e
                    );
                }
            }
            InboundEvent::JoinChat(payload) => {
                let room = parse_room("join chat", &payload)?;
                self.join_chat_usecase.execute(connection.id, room).await?;
            }
            InboundEvent::Typing(payload) => {
                let room = parse_room("typing", &payload)?;
                let frame = encode(&OutboundEvent::Typing(payload))?;
                self.typing_usecase
                    .start(connection.id, room, &frame)
                    .await?;
            }
            InboundEvent::StopTyping(payload) => {
                let room = parse_room("stop typing", &payload)?;
                let frame = encode(&OutboundEvent::StopTyping(payload))?;
                self.typing_usecase.stop(connection.id, room, &frame).await?;
            }
            InboundEvent::NewMessage(payload) => {
                let message: NewMessagePayload = parse_payload("new message", &payload)?;
                let request = FanoutRequest::from(message);
                let frame = encode(&OutboundEvent::MessageReceived(payload))?;
                self.relay_message_usecase
                    .execute(connection.id, &request, &frame)
                    .await?;
            }
            InboundEvent::CallStarted(payload) => {
                let call: CallStartedPayload = parse_payload("call started", &payload)?;
                let kind = call.call_type;
                let request = FanoutRequest::from(call);
                let frame = encode(&OutboundEvent::IncomingCall(json!({
                    "chat": payload["chat"].clone(),
                    "caller": payload["caller"].clone(),
                    "callType": payload["callType"].clone(),
                })))?;
                self.start_call_usecase
                    .execute(connection.id, &request, kind, &frame)
                    .await?;
            }
            InboundEvent::MessageDeleted(payload) => {
                let deleted: MessageDeletedPayload = parse_payload("message deleted", &payload)?;
                let for_everyone = deleted.is_deleted_for_everyone;
                let request = FanoutRequest::from(deleted);
                let frame = encode(&OutboundEvent::MessageDeleted(payload))?;
                self.delete_message_usecase
                    .execute(connection.id, &request, for_everyone, &frame)
                    .await?;
            }
        }

        Ok(())
    }
}

fn encode(event: &OutboundEvent) -> Result<String, RouteError> {
    event
        .to_frame()
        .map_err(|e| RouteError::malformed(format!("unencodable payload: {e}")))
}

fn log_dropped(connection: &Connection, event: &str, error: &RouteError) {
    tracing::warn!(
        kind = error.kind(),
        "Dropped '{}' from connection '{}': {}",
        event,
        connection.id,
        error
    );
}

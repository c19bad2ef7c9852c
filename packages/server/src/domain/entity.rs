//! Domain entities: the live connection and per-room typing state.

use std::collections::{HashMap, HashSet};

use super::value_object::{ConnectionId, RoomId, Timestamp, UserId};

/// Lifecycle flag of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Open,
    Closed,
}

/// One live transport session.
///
/// Created when the transport accepts a socket. The user is known only
/// after admission (`setup`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub connected_at: Timestamp,
    pub user: Option<UserId>,
    pub state: ConnectionState,
}

impl Connection {
    pub fn open(id: ConnectionId, connected_at: Timestamp) -> Self {
        Self {
            id,
            connected_at,
            user: None,
            state: ConnectionState::Open,
        }
    }

    pub fn admit(&mut self, user: UserId) {
        self.user = Some(user);
    }

    pub fn close(&mut self) {
        self.state = ConnectionState::Closed;
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }
}

/// Audience of a user-addressed fan-out (`new message`, `call started`,
/// `message deleted`).
///
/// `member_hint` is the member list the client embedded in the payload; it is
/// only used when no authoritative chat record is known. `origin` is the user
/// named in the payload; `None` means the emitting connection's own user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanoutRequest {
    pub chat: RoomId,
    pub origin: Option<UserId>,
    pub member_hint: Option<Vec<UserId>>,
}

/// Typing indicator of a single room. No per-user granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypingState {
    #[default]
    Idle,
    Typing,
}

/// Outcome of feeding a typing signal to the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingTransition {
    Started,
    StillTyping,
    Stopped,
    AlreadyIdle,
}

/// Per-room typing state machine.
///
/// `Idle --typing--> Typing --stop typing--> Idle`. Idle rooms are not
/// stored. `signaled` remembers, per connection, the rooms it started typing
/// in so a disconnect can tell which rooms it left hanging.
#[derive(Debug, Default)]
pub struct TypingBoard {
    rooms: HashMap<RoomId, TypingState>,
    signaled: HashMap<ConnectionId, HashSet<RoomId>>,
}

impl TypingBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, room: &RoomId) -> TypingState {
        self.rooms.get(room).copied().unwrap_or_default()
    }

    pub fn start(&mut self, room: &RoomId, connection: ConnectionId) -> TypingTransition {
        self.signaled
            .entry(connection)
            .or_default()
            .insert(room.clone());

        match self.rooms.insert(room.clone(), TypingState::Typing) {
            Some(TypingState::Typing) => TypingTransition::StillTyping,
            _ => TypingTransition::Started,
        }
    }

    pub fn stop(&mut self, room: &RoomId, connection: ConnectionId) -> TypingTransition {
        if let Some(rooms) = self.signaled.get_mut(&connection) {
            rooms.remove(room);
            if rooms.is_empty() {
                self.signaled.remove(&connection);
            }
        }

        match self.rooms.remove(room) {
            Some(TypingState::Typing) => TypingTransition::Stopped,
            _ => TypingTransition::AlreadyIdle,
        }
    }

    /// Forget a departing connection.
    ///
    /// Returns the rooms it started typing in that are still `Typing`; those
    /// rooms go back to `Idle`.
    pub fn release(&mut self, connection: &ConnectionId) -> Vec<RoomId> {
        let Some(rooms) = self.signaled.remove(connection) else {
            return Vec::new();
        };

        let mut stuck: Vec<RoomId> = rooms
            .into_iter()
            .filter(|room| self.rooms.remove(room) == Some(TypingState::Typing))
            .collect();
        stuck.sort();
        stuck
    }

    /// Rooms currently in the `Typing` state, sorted
    pub fn typing_rooms(&self) -> Vec<RoomId> {
        let mut rooms: Vec<RoomId> = self
            .rooms
            .iter()
            .filter(|(_, state)| **state == TypingState::Typing)
            .map(|(room, _)| room.clone())
            .collect();
        rooms.sort();
        rooms
    }
}

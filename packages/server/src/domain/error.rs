//! Domain error types.

use thiserror::Error;

use super::value_object::ConnectionId;

/// Value object construction failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Outbound delivery failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' is not registered for delivery")]
    ConnectionNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}

/// Reasons an inbound event is dropped by the router.
///
/// These never travel back over the transport; they exist so the drop can be
/// logged with a stable kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    #[error("connection '{0}' sent an event before setup")]
    NotAdmitted(ConnectionId),
}

impl RouteError {
    pub fn kind(&self) -> &'static str {
        match self {
            RouteError::MalformedEvent(_) => "MALFORMED_EVENT",
            RouteError::NotAdmitted(_) => "NOT_ADMITTED",
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        RouteError::MalformedEvent(reason.into())
    }
}

impl From<ValueObjectError> for RouteError {
    fn from(e: ValueObjectError) -> Self {
        RouteError::MalformedEvent(e.to_string())
    }
}

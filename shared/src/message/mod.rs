//! Realtime message types
//!
//! The realtime channel carries JSON text frames of the form
//! `{ "event": "<name>", "data": <json> }`. `payload` holds the typed
//! views of the events this client cares about.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod payload;
pub use payload::*;

/// Inbound notification event (delivery, unread count, read ack, error)
pub const EVENT_NOTIFICATION: &str = "notification";
/// Outbound request to mark one notification as read over the socket
pub const EVENT_MARK_READ: &str = "mark_notification_read";
/// Server-side connection acknowledgement
pub const EVENT_CONNECTED: &str = "connected";

/// One frame on the realtime channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketFrame {
    /// Event name
    pub event: String,
    /// Event payload
    #[serde(default)]
    pub data: serde_json::Value,
}

impl SocketFrame {
    /// Create a frame from any serializable payload
    pub fn new<T: Serialize>(event: impl Into<String>, data: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_value(data)?,
        })
    }

    /// Create a frame from a raw JSON value
    pub fn raw(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Parse a text frame received from the wire
    pub fn from_text(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Encode for the wire
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Whether this frame carries the given event
    pub fn is(&self, event: &str) -> bool {
        self.event == event
    }

    /// Parse the payload into a typed value
    pub fn parse_data<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.clone())
    }
}

impl fmt::Display for SocketFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.event)
    }
}

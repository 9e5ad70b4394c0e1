//! Typed payloads for realtime notification events

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Notification;

/// Envelope type tags carried in `{ "type": ..., "data": ... }` payloads
pub const TYPE_UNREAD_COUNT_UPDATE: &str = "unread_count_update";
pub const TYPE_READ_SUCCESS: &str = "notification_read_success";
pub const TYPE_NOTIFICATION_ERROR: &str = "notification_error";

/// Outbound mark-read request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub notification_id: String,
}

/// Inbound `notification` event, discriminated by payload shape
///
/// The server sends either `{ notification: {...} }` for a delivery or a
/// `{ type, data }` envelope for everything else.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundNotification {
    /// A newly delivered notification
    Delivered(Box<Notification>),
    /// Server-side unread count changed
    UnreadCountUpdate { unread_count: u64 },
    /// A socket mark-read request was applied
    ReadSuccess { notification_id: String },
    /// Server reported an error for this connection
    Error { message: String },
}

impl InboundNotification {
    /// Classify a raw payload. Returns `None` for shapes this client does
    /// not understand.
    pub fn from_value(value: &Value) -> Option<Self> {
        if let Some(raw) = value.get("notification") {
            return serde_json::from_value::<Notification>(raw.clone())
                .ok()
                .map(|n| Self::Delivered(Box::new(n)));
        }

        let kind = value.get("type")?.as_str()?;
        let data = value.get("data").unwrap_or(&Value::Null);
        match kind {
            TYPE_UNREAD_COUNT_UPDATE => {
                let count = data
                    .get("unreadCount")
                    .or_else(|| data.get("count"))
                    .and_then(Value::as_u64)
                    .or_else(|| data.as_u64())?;
                Some(Self::UnreadCountUpdate {
                    unread_count: count,
                })
            }
            TYPE_READ_SUCCESS => {
                let id = data
                    .get("notificationId")
                    .or_else(|| data.get("id"))
                    .and_then(Value::as_str)?;
                Some(Self::ReadSuccess {
                    notification_id: id.to_string(),
                })
            }
            TYPE_NOTIFICATION_ERROR => {
                let message = data
                    .get("message")
                    .and_then(Value::as_str)
                    .or_else(|| data.as_str())
                    .unwrap_or("Unknown notification error");
                Some(Self::Error {
                    message: message.to_string(),
                })
            }
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Delivered(_) => "delivered",
            Self::UnreadCountUpdate { .. } => TYPE_UNREAD_COUNT_UPDATE,
            Self::ReadSuccess { .. } => TYPE_READ_SUCCESS,
            Self::Error { .. } => TYPE_NOTIFICATION_ERROR,
        }
    }
}

//! Notification Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::response::Pagination;

/// Notification type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// Generic chat/message notification
    #[default]
    Message,
    /// A customer asked a vendor about a listing
    VendorInquiry,
    BookingRequest,
    BookingUpdate,
    Payment,
    Review,
    System,
    /// Any type this client does not know yet
    #[serde(other)]
    Other,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Message => "message",
            NotificationType::VendorInquiry => "vendor_inquiry",
            NotificationType::BookingRequest => "booking_request",
            NotificationType::BookingUpdate => "booking_update",
            NotificationType::Payment => "payment",
            NotificationType::Review => "review",
            NotificationType::System => "system",
            NotificationType::Other => "other",
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Notification record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub notification_type: NotificationType,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    /// Free-form payload (vendor id, event id, ...)
    #[serde(default)]
    pub data: Value,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Vendor referenced by the payload, if any
    pub fn vendor_id(&self) -> Option<&str> {
        self.data.get("vendorId").and_then(Value::as_str)
    }

    /// Event (listing) referenced by the payload, if any
    pub fn event_id(&self) -> Option<&str> {
        self.data.get("eventId").and_then(Value::as_str)
    }

    /// Flip to read, stamping the read time once
    pub fn mark_read(&mut self, at: DateTime<Utc>) {
        if !self.is_read {
            self.is_read = true;
            self.read_at = Some(at);
        }
    }
}

/// One page of notifications as returned by the list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub pagination: Pagination,
    #[serde(default)]
    pub unread_count: u64,
}

/// Unread count response data
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    pub unread_count: u64,
}

/// Bulk mark-read request; an empty list means "every unread notification"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkManyRead {
    pub notification_ids: Vec<String>,
}

/// Bulk mark-read response data
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkManyReadResult {
    #[serde(default)]
    pub modified_count: u64,
}

/// Query for the notification list endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationQuery {
    pub page: u32,
    pub limit: u32,
    pub notification_type: Option<NotificationType>,
    pub unread_only: bool,
}

impl NotificationQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            notification_type: None,
            unread_only: false,
        }
    }

    pub fn with_type(mut self, notification_type: NotificationType) -> Self {
        self.notification_type = Some(notification_type);
        self
    }

    pub fn unread_only(mut self, unread_only: bool) -> Self {
        self.unread_only = unread_only;
        self
    }

    /// The same filters, one page further
    pub fn next_page(&self) -> Self {
        Self {
            page: self.page + 1,
            ..self.clone()
        }
    }

    /// Query string pairs in the order the backend documents them
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(t) = self.notification_type {
            pairs.push(("type", t.as_str().to_string()));
        }
        if self.unread_only {
            pairs.push(("unreadOnly", "true".to_string()));
        }
        pairs
    }
}

impl Default for NotificationQuery {
    fn default() -> Self {
        Self::new(1, 20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_backend_shape() {
        let n: Notification = serde_json::from_value(json!({
            "_id": "665f",
            "title": "Booking",
            "message": "New booking request",
            "type": "booking_request",
            "isRead": true,
            "readAt": "2024-05-02T08:00:00Z",
            "data": {"eventId": "e1"},
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(n.id, "665f");
        assert_eq!(n.notification_type, NotificationType::BookingRequest);
        assert!(n.is_read);
        assert_eq!(n.event_id(), Some("e1"));
        assert_eq!(n.vendor_id(), None);
    }

    #[test]
    fn test_unknown_type_falls_back() {
        let n: Notification = serde_json::from_value(json!({
            "id": "1",
            "title": "t",
            "message": "m",
            "type": "brand_new_kind",
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(n.notification_type, NotificationType::Other);
        assert!(!n.is_read);
        assert!(n.data.is_null());
    }

    #[test]
    fn test_query_pairs() {
        let q = NotificationQuery::new(2, 10)
            .with_type(NotificationType::VendorInquiry)
            .unread_only(true);
        assert_eq!(
            q.to_query_pairs(),
            vec![
                ("page", "2".to_string()),
                ("limit", "10".to_string()),
                ("type", "vendor_inquiry".to_string()),
                ("unreadOnly", "true".to_string()),
            ]
        );
        assert_eq!(q.next_page().page, 3);
        assert_eq!(NotificationQuery::new(0, 0).page, 1);
    }
}

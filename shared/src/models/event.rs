//! Event (listing) entity and event type vocabulary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Location, Package};

/// Event type vocabulary accepted by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendEventType {
    Wedding,
    Birthday,
    Corporate,
    Anniversary,
    Graduation,
    Holiday,
    Festival,
    Concert,
    #[default]
    #[serde(other)]
    Other,
}

/// Form labels and the backend value each one is stored as
const EVENT_TYPE_TABLE: &[(&str, BackendEventType)] = &[
    ("Wedding", BackendEventType::Wedding),
    ("Engagement", BackendEventType::Wedding),
    ("Birthday", BackendEventType::Birthday),
    ("Birthday Party", BackendEventType::Birthday),
    ("Corporate", BackendEventType::Corporate),
    ("Corporate Event", BackendEventType::Corporate),
    ("Conference", BackendEventType::Corporate),
    ("Workshop", BackendEventType::Corporate),
    ("Seminar", BackendEventType::Corporate),
    ("Product Launch", BackendEventType::Corporate),
    ("Anniversary", BackendEventType::Anniversary),
    ("Graduation", BackendEventType::Graduation),
    ("Holiday Party", BackendEventType::Holiday),
    ("Festival", BackendEventType::Festival),
    ("Concert", BackendEventType::Concert),
    ("Other", BackendEventType::Other),
];

impl BackendEventType {
    /// Look a form label up in the table (case-insensitive)
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        EVENT_TYPE_TABLE
            .iter()
            .find(|(l, _)| l.eq_ignore_ascii_case(label))
            .map(|(_, t)| *t)
    }

    /// Label used when populating a form from a stored event
    pub fn label(&self) -> &'static str {
        match self {
            BackendEventType::Wedding => "Wedding",
            BackendEventType::Birthday => "Birthday",
            BackendEventType::Corporate => "Corporate Event",
            BackendEventType::Anniversary => "Anniversary",
            BackendEventType::Graduation => "Graduation",
            BackendEventType::Holiday => "Holiday Party",
            BackendEventType::Festival => "Festival",
            BackendEventType::Concert => "Concert",
            BackendEventType::Other => "Other",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendEventType::Wedding => "wedding",
            BackendEventType::Birthday => "birthday",
            BackendEventType::Corporate => "corporate",
            BackendEventType::Anniversary => "anniversary",
            BackendEventType::Graduation => "graduation",
            BackendEventType::Holiday => "holiday",
            BackendEventType::Festival => "festival",
            BackendEventType::Concert => "concert",
            BackendEventType::Other => "other",
        }
    }
}

impl std::fmt::Display for BackendEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Event entity as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub event_type: BackendEventType,
    #[serde(default)]
    pub services_provided: Vec<String>,
    /// Stored image URLs, cover photos first
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub packages: Vec<Package>,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

//! Booking Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Booking status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

/// Booking of a vendor's listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(alias = "_id")]
    pub id: String,
    pub event_id: String,
    #[serde(default)]
    pub event_name: Option<String>,
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    pub event_date: DateTime<Utc>,
    #[serde(default)]
    pub guest_count: Option<u32>,
    #[serde(default)]
    pub package_name: Option<String>,
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Bookings list response data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingList {
    pub bookings: Vec<Booking>,
    #[serde(default)]
    pub pagination: Option<crate::response::Pagination>,
}

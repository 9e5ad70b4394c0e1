//! Review Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Customer review of a vendor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub event_id: Option<String>,
    pub reviewer_name: String,
    /// 1..=5
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Reviews list response data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewList {
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub total: u64,
}

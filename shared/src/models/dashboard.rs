//! Vendor dashboard statistics

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_listings: u64,
    pub active_listings: u64,
    pub total_bookings: u64,
    pub pending_bookings: u64,
    pub total_revenue: f64,
    pub average_rating: f64,
    pub total_reviews: u64,
    pub profile_views: u64,
}

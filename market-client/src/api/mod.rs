//! Typed REST API facade
//!
//! Thin wrappers over [`HttpClient`] that know the backend paths and
//! unwrap the `{ success, data }` envelope.

mod events;
mod notifications;
mod vendor;

use std::sync::Arc;

use crate::http::HttpClient;
use crate::storage::Storage;

pub use events::{EVENTS_PATH, IMAGES_FIELD, event_path};
pub use notifications::NOTIFICATIONS_PATH;

/// `{collection}/{id}` with the id percent-encoded as one path segment
pub fn resource_path(collection: &str, id: &str) -> String {
    format!("{collection}/{}", urlencoding::encode(id))
}

/// Marketplace REST API
pub struct MarketApi<H: HttpClient> {
    http: Arc<H>,
    persistent: Arc<dyn Storage>,
}

impl<H: HttpClient> Clone for MarketApi<H> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            persistent: self.persistent.clone(),
        }
    }
}

impl<H: HttpClient> MarketApi<H> {
    /// `persistent` backs the vendor profile cache
    pub fn new(http: Arc<H>, persistent: Arc<dyn Storage>) -> Self {
        Self { http, persistent }
    }

    pub fn http(&self) -> &H {
        &self.http
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_path_encodes_id() {
        assert_eq!(resource_path("events", "665f1a"), "events/665f1a");
        assert_eq!(resource_path("events", "a/b?c#d"), "events/a%2Fb%3Fc%23d");
        assert_eq!(resource_path("invoices", "x y"), "invoices/x%20y");
    }
}

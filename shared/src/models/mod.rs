//! Data models
//!
//! Shared between the client SDK and anything consuming the marketplace
//! REST API. Field names follow the backend's camelCase JSON; backend ids
//! are opaque strings (`_id` is accepted as an alias).

pub mod booking;
pub mod dashboard;
pub mod event;
pub mod invoice;
pub mod listing;
pub mod location;
pub mod notification;
pub mod package;
pub mod photo;
pub mod review;
pub mod user;

// Re-exports
pub use booking::*;
pub use dashboard::*;
pub use event::*;
pub use invoice::*;
pub use listing::*;
pub use location::*;
pub use notification::*;
pub use package::*;
pub use photo::*;
pub use review::*;
pub use user::*;

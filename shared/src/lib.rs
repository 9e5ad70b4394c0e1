//! Shared types for the marketplace client
//!
//! Wire and domain types used by the client SDK: notification records,
//! listing drafts, vendor resources, REST envelopes and realtime frames.

pub mod error;
pub mod message;
pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::ErrorCode;
pub use message::{InboundNotification, SocketFrame};
pub use response::{ApiEnvelope, Pagination};

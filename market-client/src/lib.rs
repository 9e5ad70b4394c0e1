//! Market Client - SDK for the event marketplace backend
//!
//! Wraps the REST API and the realtime notification socket, and keeps the
//! client-side state a vendor dashboard needs: the auth session, the
//! notification list with its unread count, and the listing draft.

pub mod api;
pub mod app;
pub mod config;
pub mod draft;
pub mod error;
pub mod http;
pub mod notification;
pub mod session;
pub mod socket;
pub mod storage;
pub mod telemetry;

pub use api::MarketApi;
pub use app::{AppParts, MarketApp, TransportFactory};
pub use config::ClientConfig;
pub use draft::{DraftError, DraftField, DraftStore};
pub use error::{ClientError, ClientResult};
pub use http::{HttpClient, NetworkHttpClient, UploadForm};
pub use notification::{
    NotificationAction, NotificationCenter, NotificationState, NotificationStore, SocketBridge,
};
pub use session::{AuthSession, Session, SessionKey};
pub use socket::{ConnectionState, MemoryTransport, RealtimeTransport, SocketClient};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, StorageExt};

// Re-export shared types for convenience
pub use shared;

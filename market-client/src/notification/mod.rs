//! Notifications: reducer, observable store, REST fetch layer and the
//! realtime bridge feeding pushed notifications into the same store.

pub mod bridge;
pub mod center;
pub mod native;
pub mod state;
pub mod store;

pub use bridge::{AttachOutcome, SocketBridge};
pub use center::NotificationCenter;
pub use native::{LogNotifier, NativeNotifier, PermissionState};
pub use state::{NotificationAction, NotificationState, reduce};
pub use store::{NotificationStore, RequestKind, RequestTicket};

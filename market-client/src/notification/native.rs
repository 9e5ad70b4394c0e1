//! Desktop notification seam

use async_trait::async_trait;
use parking_lot::Mutex;

/// Permission to show native notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    /// Not asked yet
    #[default]
    Default,
    Granted,
    Denied,
}

#[async_trait]
pub trait NativeNotifier: Send + Sync {
    fn permission(&self) -> PermissionState;

    /// Ask the user; returns the resulting permission
    async fn request_permission(&self) -> PermissionState;

    fn show(&self, title: &str, body: &str);
}

/// Notifier that writes to the log
///
/// Grants permission when asked.
#[derive(Debug, Default)]
pub struct LogNotifier {
    permission: Mutex<PermissionState>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NativeNotifier for LogNotifier {
    fn permission(&self) -> PermissionState {
        *self.permission.lock()
    }

    async fn request_permission(&self) -> PermissionState {
        let mut permission = self.permission.lock();
        if *permission == PermissionState::Default {
            *permission = PermissionState::Granted;
        }
        *permission
    }

    fn show(&self, title: &str, body: &str) {
        tracing::info!(target: "market_client::native", title = %title, "{}", body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_notifier_grants() {
        let notifier = LogNotifier::new();
        assert_eq!(notifier.permission(), PermissionState::Default);
        assert_eq!(notifier.request_permission().await, PermissionState::Granted);
        assert_eq!(notifier.permission(), PermissionState::Granted);
    }
}

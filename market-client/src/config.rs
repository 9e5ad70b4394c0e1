//! Client configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};

/// Client configuration for connecting to the marketplace backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST base URL (e.g., "http://localhost:5000/api")
    pub api_base_url: String,

    /// Realtime endpoint; derived from `api_base_url` when unset
    pub socket_url: Option<String>,

    /// Request timeout
    pub timeout: Duration,

    /// How long the socket bridge waits for the transport to connect
    pub socket_ready_timeout: Duration,

    /// Default notification page size
    pub page_size: u32,

    /// Directory for persisted state (auth, vendor profile cache)
    pub data_dir: PathBuf,

    /// Mirror the listing draft to disk so it survives a restart
    pub persist_draft: bool,

    /// Name reported to the backend in the User-Agent
    pub client_name: String,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            socket_url: None,
            timeout: Duration::from_secs(30),
            socket_ready_timeout: Duration::from_secs(10),
            page_size: 20,
            data_dir: PathBuf::from(".market"),
            persist_draft: false,
            client_name: concat!("market-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Load from the environment (and `.env` when present)
    ///
    /// | variable              | field            |
    /// |-----------------------|------------------|
    /// | `MARKET_API_URL`      | `api_base_url`   |
    /// | `MARKET_SOCKET_URL`   | `socket_url`     |
    /// | `MARKET_TIMEOUT_SECS` | `timeout`        |
    /// | `MARKET_DATA_DIR`     | `data_dir`       |
    /// | `MARKET_PAGE_SIZE`    | `page_size`      |
    pub fn from_env() -> ClientResult<Self> {
        if let Err(e) = dotenv::dotenv() {
            tracing::debug!("No .env loaded: {}", e);
        }

        let api_url = std::env::var("MARKET_API_URL")
            .map_err(|_| ClientError::Config("MARKET_API_URL is required".into()))?;
        let mut config = Self::new(api_url);

        if let Ok(url) = std::env::var("MARKET_SOCKET_URL") {
            config = config.with_socket_url(url);
        }
        if let Ok(secs) = std::env::var("MARKET_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| ClientError::Config(format!("Invalid MARKET_TIMEOUT_SECS: {secs}")))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Ok(dir) = std::env::var("MARKET_DATA_DIR") {
            config = config.with_data_dir(dir);
        }
        if let Ok(size) = std::env::var("MARKET_PAGE_SIZE") {
            let size: u32 = size
                .parse()
                .map_err(|_| ClientError::Config(format!("Invalid MARKET_PAGE_SIZE: {size}")))?;
            config = config.with_page_size(size);
        }

        Ok(config)
    }

    /// Set the realtime endpoint
    pub fn with_socket_url(mut self, url: impl Into<String>) -> Self {
        self.socket_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set how long to wait for the realtime connection
    pub fn with_socket_ready_timeout(mut self, timeout: Duration) -> Self {
        self.socket_ready_timeout = timeout;
        self
    }

    /// Set the notification page size
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Set the persisted state directory
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Keep the listing draft on disk
    pub fn with_persist_draft(mut self, enabled: bool) -> Self {
        self.persist_draft = enabled;
        self
    }

    /// Set the client name
    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    /// REST base URL without a trailing slash
    pub fn api_base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    /// Realtime endpoint: explicit, or the API origin with ws(s)://
    pub fn resolved_socket_url(&self) -> String {
        if let Some(url) = &self.socket_url {
            return url.clone();
        }

        let base = self.api_base();
        // Strip the path so "https://host/api" becomes "wss://host/socket"
        let origin = match base.find("://") {
            Some(idx) => {
                let rest = &base[idx + 3..];
                let host_end = rest.find('/').map(|i| idx + 3 + i).unwrap_or(base.len());
                &base[..host_end]
            }
            None => base,
        };
        let origin = origin
            .replacen("https://", "wss://", 1)
            .replacen("http://", "ws://", 1);
        format!("{origin}/socket")
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:5000/api")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.socket_ready_timeout, Duration::from_secs(10));
        assert_eq!(config.page_size, 20);
        assert!(!config.persist_draft);
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::new("https://api.example.com/api/")
            .with_timeout(Duration::from_secs(5))
            .with_page_size(0)
            .with_persist_draft(true);

        assert_eq!(config.api_base(), "https://api.example.com/api");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.page_size, 1);
        assert!(config.persist_draft);
    }

    #[test]
    fn test_socket_url_derivation() {
        assert_eq!(
            ClientConfig::new("https://api.example.com/api").resolved_socket_url(),
            "wss://api.example.com/socket"
        );
        assert_eq!(
            ClientConfig::new("http://localhost:5000").resolved_socket_url(),
            "ws://localhost:5000/socket"
        );
        assert_eq!(
            ClientConfig::new("http://x")
                .with_socket_url("ws://rt:9000/ws")
                .resolved_socket_url(),
            "ws://rt:9000/ws"
        );
    }
}

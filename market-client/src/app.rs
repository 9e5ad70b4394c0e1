//! Application root
//!
//! [`MarketApp`] owns every long-lived piece of client state and is passed
//! explicitly to whatever needs it. Creating one restores the persisted
//! session; `sign_in`/`sign_out` drive the realtime connection and the
//! notification lifecycle.

use parking_lot::Mutex;
use shared::models::User;
use std::sync::Arc;

use crate::api::MarketApi;
use crate::config::ClientConfig;
use crate::draft::DraftStore;
use crate::error::ClientResult;
use crate::http::{HttpClient, NetworkHttpClient};
use crate::notification::{
    AttachOutcome, LogNotifier, NativeNotifier, NotificationCenter, NotificationStore,
    SocketBridge,
};
use crate::session::{AuthSession, Session};
use crate::socket::{RealtimeTransport, SocketClient};
use crate::storage::{FileStorage, MemoryStorage, Storage};

/// Opens the realtime transport for a session
pub type TransportFactory =
    Arc<dyn Fn(&ClientConfig, &Session) -> ClientResult<Arc<dyn RealtimeTransport>> + Send + Sync>;

/// Everything [`MarketApp::from_parts`] needs
pub struct AppParts<H: HttpClient> {
    pub config: ClientConfig,
    /// Survives restarts: token, user, vendor profile
    pub persistent: Arc<dyn Storage>,
    /// Scoped to one run (unless configured otherwise): listing draft
    pub session_storage: Arc<dyn Storage>,
    pub auth: AuthSession,
    pub http: Arc<H>,
    pub notifier: Arc<dyn NativeNotifier>,
    pub transport_factory: TransportFactory,
}

pub struct MarketApp<H: HttpClient = NetworkHttpClient> {
    config: ClientConfig,
    auth: AuthSession,
    api: MarketApi<H>,
    notifications: NotificationCenter<H>,
    drafts: DraftStore<Arc<dyn Storage>>,
    bridge: SocketBridge,
    transport_factory: TransportFactory,
    transport: Mutex<Option<Arc<dyn RealtimeTransport>>>,
}

impl MarketApp<NetworkHttpClient> {
    /// Build the networked client and restore the persisted session
    pub fn bootstrap(config: ClientConfig) -> ClientResult<Self> {
        let persistent: Arc<dyn Storage> = Arc::new(FileStorage::new(&config.data_dir));
        let session_storage: Arc<dyn Storage> = if config.persist_draft {
            Arc::new(FileStorage::new(config.data_dir.join("session")))
        } else {
            Arc::new(MemoryStorage::new())
        };
        let auth = AuthSession::restore(persistent.clone());
        let http = Arc::new(NetworkHttpClient::new(&config, auth.clone())?);

        tracing::info!(
            api = %config.api_base(),
            data_dir = %config.data_dir.display(),
            signed_in = auth.is_authenticated(),
            "Market client bootstrapped"
        );

        Ok(Self::from_parts(AppParts {
            config,
            persistent,
            session_storage,
            auth,
            http,
            notifier: Arc::new(LogNotifier::new()),
            transport_factory: Arc::new(|config: &ClientConfig, session: &Session| {
                let client = SocketClient::connect(config, session)?;
                Ok(Arc::new(client) as Arc<dyn RealtimeTransport>)
            }),
        }))
    }
}

impl<H: HttpClient + 'static> MarketApp<H> {
    pub fn from_parts(parts: AppParts<H>) -> Self {
        let api = MarketApi::new(parts.http, parts.persistent);
        let store = NotificationStore::new();
        let notifications =
            NotificationCenter::new(api.clone(), store.clone(), parts.config.page_size);
        let drafts = DraftStore::new(parts.session_storage);
        drafts.restore();
        let bridge = SocketBridge::new(store, parts.notifier, parts.config.socket_ready_timeout);

        Self {
            config: parts.config,
            auth: parts.auth,
            api,
            notifications,
            drafts,
            bridge,
            transport_factory: parts.transport_factory,
            transport: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn auth(&self) -> &AuthSession {
        &self.auth
    }

    pub fn api(&self) -> &MarketApi<H> {
        &self.api
    }

    pub fn notifications(&self) -> &NotificationCenter<H> {
        &self.notifications
    }

    pub fn drafts(&self) -> &DraftStore<Arc<dyn Storage>> {
        &self.drafts
    }

    pub fn bridge(&self) -> &SocketBridge {
        &self.bridge
    }

    pub fn transport(&self) -> Option<Arc<dyn RealtimeTransport>> {
        self.transport.lock().clone()
    }

    /// Persist credentials and start the session
    pub async fn sign_in(&self, token: impl Into<String>, user: User) -> ClientResult<()> {
        self.auth.sign_in(token, user)?;
        self.resume().await;
        Ok(())
    }

    /// Start the session restored at bootstrap, if any
    ///
    /// Loads notifications and attaches the realtime bridge. Socket
    /// problems are logged and never fail the call.
    pub async fn resume(&self) {
        let Some(session) = self.auth.current() else {
            tracing::debug!("No session to resume");
            return;
        };

        let realtime = async {
            let transport = match self.open_transport(&session) {
                Ok(transport) => transport,
                Err(e) => {
                    tracing::error!("Failed to open realtime connection: {}", e);
                    return;
                }
            };
            match self.bridge.attach(transport, session.key()).await {
                Ok(AttachOutcome::Attached) => {}
                Ok(AttachOutcome::AlreadyAttached) => {
                    tracing::debug!("Realtime bridge already attached")
                }
                Err(e) => tracing::warn!("Realtime notifications unavailable: {}", e),
            }
        };

        tokio::join!(self.notifications.sync_session(Some(&session)), realtime);
    }

    /// Reuse the open transport for the same session, replace it otherwise
    fn open_transport(&self, session: &Session) -> ClientResult<Arc<dyn RealtimeTransport>> {
        let mut current = self.transport.lock();
        if let Some(transport) = current.as_ref()
            && self.bridge.attached_key() == Some(session.key())
        {
            return Ok(transport.clone());
        }
        if let Some(old) = current.take() {
            old.close();
        }
        let transport = (self.transport_factory)(&self.config, session)?;
        *current = Some(transport.clone());
        Ok(transport)
    }

    /// End the session: stop realtime, clear per-user state and credentials
    pub async fn sign_out(&self) -> ClientResult<()> {
        self.close_realtime();
        self.notifications.sync_session(None).await;
        self.drafts.clear();
        self.api.clear_vendor_profile_cache();
        self.auth.sign_out()?;
        Ok(())
    }

    /// Stop background work, keeping persisted state
    pub fn shutdown(&self) {
        self.close_realtime();
        tracing::info!("Market client shut down");
    }

    fn close_realtime(&self) {
        self.bridge.detach();
        if let Some(transport) = self.transport.lock().take() {
            transport.close();
        }
    }
}

//! Test helpers: in-memory HTTP backend, recording notifier, fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use market_client::http::{HttpClient, UploadForm};
use market_client::notification::{NativeNotifier, NotificationStore, PermissionState};
use market_client::{ClientError, ClientResult, Session};
use parking_lot::Mutex;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use shared::models::{User, UserRole};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::oneshot;

#[derive(Debug, Clone)]
enum Reply {
    Json(Value),
    Status(u16, String),
}

struct Route {
    reply: Reply,
    gate: Option<oneshot::Receiver<()>>,
}

/// One request seen by [`MockHttpClient`]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub form: Option<UploadForm>,
}

impl RecordedCall {
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Canned responses keyed by method and path
///
/// Replies queue up per route; the last one stays in place for any further
/// calls. Unknown routes answer 404.
#[derive(Default)]
pub struct MockHttpClient {
    routes: Mutex<HashMap<(Method, String), VecDeque<Route>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, method: Method, path: &str, body: Value) -> &Self {
        self.push(method, path, Reply::Json(body), None);
        self
    }

    pub fn fail(&self, method: Method, path: &str, status: u16, message: &str) -> &Self {
        self.push(method, path, Reply::Status(status, message.to_string()), None);
        self
    }

    /// Reply held back until the returned sender fires (or is dropped)
    pub fn on_gated(&self, method: Method, path: &str, body: Value) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.push(method, path, Reply::Json(body), Some(rx));
        tx
    }

    fn push(&self, method: Method, path: &str, reply: Reply, gate: Option<oneshot::Receiver<()>>) {
        self.routes
            .lock()
            .entry((method, normalize(path)))
            .or_default()
            .push_back(Route { reply, gate });
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> Vec<RecordedCall> {
        let path = normalize(path);
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.path == path)
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    async fn respond<T: DeserializeOwned>(&self, call: RecordedCall) -> ClientResult<T> {
        let key = (call.method.clone(), call.path.clone());
        self.calls.lock().push(call);

        let (reply, gate) = {
            let mut routes = self.routes.lock();
            match routes.get_mut(&key) {
                Some(queue) if queue.len() > 1 || queue.front().is_some_and(|r| r.gate.is_some()) => {
                    let route = queue.pop_front().unwrap();
                    (route.reply, route.gate)
                }
                Some(queue) if !queue.is_empty() => (queue[0].reply.clone(), None),
                _ => (Reply::Status(404, format!("{} {}", key.0, key.1)), None),
            }
        };

        if let Some(gate) = gate {
            let _ = gate.await;
        }

        match reply {
            Reply::Json(value) => Ok(serde_json::from_value(value)?),
            Reply::Status(code, message) => Err(ClientError::from_status(
                StatusCode::from_u16(code).unwrap(),
                message,
            )),
        }
    }
}

fn normalize(path: &str) -> String {
    path.trim_start_matches('/').to_string()
}

fn record(method: Method, path: &str) -> RecordedCall {
    RecordedCall {
        method,
        path: normalize(path),
        query: Vec::new(),
        body: None,
        form: None,
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> ClientResult<T> {
        let mut call = record(Method::GET, path);
        call.query = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        self.respond(call).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let mut call = record(Method::POST, path);
        call.body = Some(serde_json::to_value(body)?);
        self.respond(call).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let mut call = record(Method::PUT, path);
        call.body = Some(serde_json::to_value(body)?);
        self.respond(call).await
    }

    async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let mut call = record(Method::PATCH, path);
        call.body = Some(serde_json::to_value(body)?);
        self.respond(call).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.respond(record(Method::DELETE, path)).await
    }

    async fn multipart<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: UploadForm,
    ) -> ClientResult<T> {
        let mut call = record(method, path);
        call.form = Some(form);
        self.respond(call).await
    }
}

/// Notifier that records what it was asked to show
#[derive(Default)]
pub struct RecordingNotifier {
    pub permission: Mutex<PermissionState>,
    /// Answer given to a permission request
    pub grant: Mutex<PermissionState>,
    pub requests: Mutex<usize>,
    pub shown: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn granting() -> Self {
        let notifier = Self::default();
        *notifier.grant.lock() = PermissionState::Granted;
        notifier
    }

    pub fn denying() -> Self {
        let notifier = Self::default();
        *notifier.grant.lock() = PermissionState::Denied;
        notifier
    }

    pub fn shown(&self) -> Vec<(String, String)> {
        self.shown.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        *self.requests.lock()
    }
}

#[async_trait]
impl NativeNotifier for RecordingNotifier {
    fn permission(&self) -> PermissionState {
        *self.permission.lock()
    }

    async fn request_permission(&self) -> PermissionState {
        *self.requests.lock() += 1;
        let granted = *self.grant.lock();
        *self.permission.lock() = granted;
        granted
    }

    fn show(&self, title: &str, body: &str) {
        self.shown.lock().push((title.to_string(), body.to_string()));
    }
}

// ========== Fixtures ==========

pub fn vendor(id: &str) -> User {
    User {
        id: id.into(),
        email: format!("{id}@example.com"),
        name: format!("Vendor {id}"),
        role: UserRole::Vendor,
    }
}

pub fn session(token: &str, user_id: &str) -> Session {
    Session::new(token, vendor(user_id))
}

pub fn notification_json(id: &str, is_read: bool) -> Value {
    json!({
        "_id": id,
        "title": format!("Title {id}"),
        "message": format!("Message {id}"),
        "type": "booking_request",
        "isRead": is_read,
        "data": { "eventId": "ev1" },
        "createdAt": "2026-05-01T12:00:00Z",
    })
}

pub fn page_json(ids: &[(&str, bool)], page: u32, has_more: bool, unread: u64) -> Value {
    let notifications: Vec<Value> = ids
        .iter()
        .map(|(id, read)| notification_json(id, *read))
        .collect();
    json!({
        "success": true,
        "data": {
            "notifications": notifications,
            "pagination": { "page": page, "limit": 20, "total": 100, "hasMore": has_more },
            "unreadCount": unread,
        }
    })
}

pub fn unread_json(count: u64) -> Value {
    json!({ "success": true, "data": { "unreadCount": count } })
}

pub fn ok_json() -> Value {
    json!({ "success": true })
}

/// Wait until the store satisfies `pred`, failing the test after a second
pub async fn wait_for_store(
    store: &NotificationStore,
    pred: impl FnMut(&market_client::NotificationState) -> bool,
) {
    let mut rx = store.subscribe();
    tokio::time::timeout(Duration::from_secs(1), rx.wait_for(pred))
        .await
        .expect("store condition not reached in time")
        .expect("store dropped");
}

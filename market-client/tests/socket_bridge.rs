// market-client/tests/socket_bridge.rs
// Socket bridge over the in-memory transport

mod common;

use common::*;
use market_client::notification::{AttachOutcome, PermissionState, SocketBridge};
use market_client::{
    ClientError, ConnectionState, MemoryTransport, NotificationStore, RealtimeTransport,
};
use serde_json::json;
use shared::SocketFrame;
use shared::message::{EVENT_MARK_READ, EVENT_NOTIFICATION};
use std::sync::Arc;
use std::time::Duration;

const READY_TIMEOUT: Duration = Duration::from_secs(10);

fn bridge(notifier: Arc<RecordingNotifier>) -> (SocketBridge, NotificationStore) {
    let store = NotificationStore::new();
    (SocketBridge::new(store.clone(), notifier, READY_TIMEOUT), store)
}

fn push(transport: &MemoryTransport, data: serde_json::Value) {
    transport.push(SocketFrame::raw(EVENT_NOTIFICATION, data));
}

#[tokio::test]
async fn test_pushed_notifications_reach_store() {
    let notifier = Arc::new(RecordingNotifier::granting());
    let (bridge, store) = bridge(notifier.clone());
    let transport = MemoryTransport::connected();

    let outcome = bridge
        .attach(Arc::new(transport.clone()), session("tok", "u1").key())
        .await
        .unwrap();
    assert_eq!(outcome, AttachOutcome::Attached);
    assert!(bridge.is_attached());
    assert_eq!(notifier.request_count(), 1);

    push(&transport, json!({ "notification": notification_json("n1", false) }));
    wait_for_store(&store, |s| s.contains("n1")).await;
    assert_eq!(notifier.shown(), vec![("Title n1".to_string(), "Message n1".to_string())]);

    push(&transport, json!({ "type": "unread_count_update", "data": { "unreadCount": 7 } }));
    wait_for_store(&store, |s| s.unread_count == 7).await;

    push(&transport, json!({ "type": "notification_read_success", "data": { "notificationId": "n1" } }));
    wait_for_store(&store, |s| s.get("n1").is_some_and(|n| n.is_read)).await;
    assert_eq!(store.snapshot().unread_count, 6);
}

#[tokio::test]
async fn test_errors_and_unknown_frames_leave_store_alone() {
    let (bridge, store) = bridge(Arc::new(RecordingNotifier::granting()));
    let transport = MemoryTransport::connected();
    bridge
        .attach(Arc::new(transport.clone()), session("tok", "u1").key())
        .await
        .unwrap();

    push(&transport, json!({ "type": "notification_error", "data": { "message": "denied" } }));
    push(&transport, json!({ "something": "else" }));
    transport.push(SocketFrame::raw("chat", json!({ "notification": notification_json("x", false) })));
    // Marker processed after the frames above
    push(&transport, json!({ "type": "unread_count_update", "data": { "unreadCount": 1 } }));

    wait_for_store(&store, |s| s.unread_count == 1).await;
    assert!(store.snapshot().notifications.is_empty());
}

#[tokio::test]
async fn test_no_native_notification_without_permission() {
    let notifier = Arc::new(RecordingNotifier::denying());
    let (bridge, store) = bridge(notifier.clone());
    let transport = MemoryTransport::connected();
    bridge
        .attach(Arc::new(transport.clone()), session("tok", "u1").key())
        .await
        .unwrap();

    push(&transport, json!({ "notification": notification_json("n1", false) }));
    wait_for_store(&store, |s| s.contains("n1")).await;
    assert!(notifier.shown().is_empty());
}

#[tokio::test]
async fn test_permission_only_requested_when_undecided() {
    let notifier = Arc::new(RecordingNotifier::granting());
    *notifier.permission.lock() = PermissionState::Denied;
    let (bridge, _store) = bridge(notifier.clone());

    bridge
        .attach(Arc::new(MemoryTransport::connected()), session("tok", "u1").key())
        .await
        .unwrap();
    assert_eq!(notifier.request_count(), 0);
}

#[tokio::test]
async fn test_one_attachment_per_session() {
    let (bridge, _store) = bridge(Arc::new(RecordingNotifier::granting()));
    let transport = MemoryTransport::connected();
    let key = session("tok", "u1").key();

    bridge.attach(Arc::new(transport.clone()), key.clone()).await.unwrap();
    let again = bridge.attach(Arc::new(transport.clone()), key).await.unwrap();
    assert_eq!(again, AttachOutcome::AlreadyAttached);
    assert_eq!(transport.subscriber_count(), 1);
}

#[tokio::test]
async fn test_new_session_replaces_old_listener() {
    let (bridge, store) = bridge(Arc::new(RecordingNotifier::granting()));
    let old = MemoryTransport::connected();
    let new = MemoryTransport::connected();

    bridge.attach(Arc::new(old.clone()), session("tok", "u1").key()).await.unwrap();
    bridge.attach(Arc::new(new.clone()), session("tok2", "u2").key()).await.unwrap();
    assert_eq!(bridge.attached_key().unwrap().user_id, "u2");

    push(&old, json!({ "notification": notification_json("stale", false) }));
    push(&new, json!({ "notification": notification_json("fresh", false) }));
    wait_for_store(&store, |s| s.contains("fresh")).await;
    tokio::task::yield_now().await;
    assert!(!store.snapshot().contains("stale"));
}

#[tokio::test(start_paused = true)]
async fn test_ready_timeout_abandons_setup() {
    let (bridge, store) = bridge(Arc::new(RecordingNotifier::granting()));
    let transport = MemoryTransport::new();
    transport.set_state(ConnectionState::Connecting);

    let started = tokio::time::Instant::now();
    let err = bridge
        .attach(Arc::new(transport.clone()), session("tok", "u1").key())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Timeout(_)));
    assert!(started.elapsed() >= READY_TIMEOUT);

    // Nothing registered, and nothing listens once the socket shows up
    assert!(!bridge.is_attached());
    assert!(bridge.attached_key().is_none());
    assert_eq!(transport.subscriber_count(), 0);

    transport.set_state(ConnectionState::Connected);
    push(&transport, json!({ "notification": notification_json("late", false) }));
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(store.snapshot().notifications.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_connect_within_budget_attaches() {
    let (bridge, _store) = bridge(Arc::new(RecordingNotifier::granting()));
    let transport = MemoryTransport::new();

    let t = transport.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(9)).await;
        t.set_state(ConnectionState::Connected);
    });

    let outcome = bridge
        .attach(Arc::new(transport.clone()), session("tok", "u1").key())
        .await
        .unwrap();
    assert_eq!(outcome, AttachOutcome::Attached);
    assert_eq!(transport.subscriber_count(), 1);
}

#[tokio::test]
async fn test_detach_keeps_transport_open() {
    let (bridge, store) = bridge(Arc::new(RecordingNotifier::granting()));
    let transport = MemoryTransport::connected();
    bridge
        .attach(Arc::new(transport.clone()), session("tok", "u1").key())
        .await
        .unwrap();

    bridge.detach();
    assert!(!bridge.is_attached());
    assert!(!transport.is_closed());
    assert!(transport.is_connected());

    push(&transport, json!({ "notification": notification_json("n1", false) }));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(store.snapshot().notifications.is_empty());

    // Detached: can attach again with the same key
    let outcome = bridge
        .attach(Arc::new(transport.clone()), session("tok", "u1").key())
        .await
        .unwrap();
    assert_eq!(outcome, AttachOutcome::Attached);
}

#[tokio::test]
async fn test_request_mark_read_emits_frame() {
    let (bridge, _store) = bridge(Arc::new(RecordingNotifier::granting()));
    let transport = MemoryTransport::connected();

    assert!(bridge.request_mark_read("n1").is_err());

    bridge
        .attach(Arc::new(transport.clone()), session("tok", "u1").key())
        .await
        .unwrap();
    bridge.request_mark_read("n1").unwrap();

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].is(EVENT_MARK_READ));
    assert_eq!(sent[0].data, json!({ "notificationId": "n1" }));
}

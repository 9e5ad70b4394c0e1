use shared::ApiEnvelope;
use shared::models::{
    MarkManyRead, MarkManyReadResult, Notification, NotificationPage, NotificationQuery,
    UnreadCount,
};

use super::{MarketApi, resource_path};
use crate::error::ClientResult;
use crate::http::{HttpClient, expect_success, unwrap_envelope};

pub const NOTIFICATIONS_PATH: &str = "notifications";

impl<H: HttpClient> MarketApi<H> {
    /// One page of the caller's notifications, newest first
    pub async fn list_notifications(&self, query: &NotificationQuery) -> ClientResult<NotificationPage> {
        let envelope: ApiEnvelope<NotificationPage> = self
            .http
            .get(NOTIFICATIONS_PATH, &query.to_query_pairs())
            .await?;
        unwrap_envelope(envelope, "fetch notifications")
    }

    pub async fn unread_count(&self) -> ClientResult<u64> {
        let envelope: ApiEnvelope<UnreadCount> = self
            .http
            .get(&format!("{NOTIFICATIONS_PATH}/unread-count"), &[])
            .await?;
        Ok(unwrap_envelope(envelope, "fetch unread count")?.unread_count)
    }

    pub async fn mark_notification_read(&self, id: &str) -> ClientResult<Option<Notification>> {
        let envelope: ApiEnvelope<Notification> = self
            .http
            .patch(
                &format!("{}/read", resource_path(NOTIFICATIONS_PATH, id)),
                &serde_json::json!({}),
            )
            .await?;
        expect_success(envelope, "mark notification as read")
    }

    /// Mark several notifications read; an empty list marks every unread one
    pub async fn mark_notifications_read(&self, ids: &[String]) -> ClientResult<u64> {
        let body = MarkManyRead {
            notification_ids: ids.to_vec(),
        };
        let envelope: ApiEnvelope<MarkManyReadResult> = self
            .http
            .patch(&format!("{NOTIFICATIONS_PATH}/mark-read"), &body)
            .await?;
        let fallback = ids.len() as u64;
        expect_success(envelope, "mark notifications as read")
            .map(|result| result.map_or(fallback, |r| r.modified_count))
    }

    pub async fn delete_notification(&self, id: &str) -> ClientResult<()> {
        let envelope: ApiEnvelope<serde_json::Value> = self
            .http
            .delete(&resource_path(NOTIFICATIONS_PATH, id))
            .await?;
        expect_success(envelope, "delete notification").map(drop)
    }
}

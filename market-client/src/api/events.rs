use reqwest::Method;
use shared::ApiEnvelope;
use shared::models::EventDetails;

use super::{MarketApi, resource_path};
use crate::error::ClientResult;
use crate::http::{HttpClient, UploadForm, unwrap_envelope};

pub const EVENTS_PATH: &str = "events";
/// Multipart field name carrying image files
pub const IMAGES_FIELD: &str = "images";

pub fn event_path(id: &str) -> String {
    resource_path(EVENTS_PATH, id)
}

impl<H: HttpClient> MarketApi<H> {
    pub async fn create_event(&self, form: UploadForm) -> ClientResult<EventDetails> {
        let envelope: ApiEnvelope<EventDetails> =
            self.http.multipart(Method::POST, EVENTS_PATH, form).await?;
        let event = unwrap_envelope(envelope, "create event")?;
        tracing::info!(event_id = %event.id, "Event created");
        Ok(event)
    }

    pub async fn update_event(&self, id: &str, form: UploadForm) -> ClientResult<EventDetails> {
        let envelope: ApiEnvelope<EventDetails> =
            self.http.multipart(Method::PUT, &event_path(id), form).await?;
        let event = unwrap_envelope(envelope, "update event")?;
        tracing::info!(event_id = %event.id, "Event updated");
        Ok(event)
    }

    pub async fn get_event(&self, id: &str) -> ClientResult<EventDetails> {
        let envelope: ApiEnvelope<EventDetails> = self.http.get(&event_path(id), &[]).await?;
        unwrap_envelope(envelope, "fetch event")
    }
}

//! HTTP client for the marketplace REST API

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::ApiEnvelope;
use shared::models::UploadFile;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::AuthSession;

/// Multipart body: JSON-ish text fields plus binary files
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadForm {
    pub fields: Vec<(String, String)>,
    pub files: Vec<(String, UploadFile)>,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Add a field holding the JSON encoding of `value`
    pub fn json<T: Serialize + ?Sized>(self, name: impl Into<String>, value: &T) -> ClientResult<Self> {
        let encoded = serde_json::to_string(value)?;
        Ok(self.text(name, encoded))
    }

    pub fn file(mut self, name: impl Into<String>, file: UploadFile) -> Self {
        self.files.push((name.into(), file));
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn into_reqwest(self) -> ClientResult<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        for (name, file) in self.files {
            let part = reqwest::multipart::Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(&file.mime_type)?;
            form = form.part(name, part);
        }
        Ok(form)
    }
}

/// HTTP client trait
///
/// Paths are relative to the API base URL. Implementations attach the
/// bearer token of the current session.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> ClientResult<T>;
    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T>;
    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T>;
    async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T>;
    async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T>;
    async fn multipart<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: UploadForm,
    ) -> ClientResult<T>;
}

/// Network HTTP client
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    base_url: String,
    session: AuthSession,
}

impl NetworkHttpClient {
    pub fn new(config: &ClientConfig, session: AuthSession) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.client_name.clone())
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base().to_string(),
            session,
        })
    }

    /// Base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self.client.request(method, self.url(path));
        if let Some(token) = self.session.token() {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn execute<T: DeserializeOwned>(&self, req: RequestBuilder) -> ClientResult<T> {
        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            // The backend wraps most errors in the usual envelope
            let message = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&text)
                .ok()
                .and_then(|env| env.message)
                .unwrap_or(text);
            let err = ClientError::from_status(status, message);
            if err.is_auth_failure() {
                tracing::warn!(%status, "Request rejected: session no longer valid");
            }
            return Err(err);
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl HttpClient for NetworkHttpClient {
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> ClientResult<T> {
        let req = self.request(Method::GET, path).query(query);
        self.execute(req).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let req = self.request(Method::POST, path).json(body);
        self.execute(req).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let req = self.request(Method::PUT, path).json(body);
        self.execute(req).await
    }

    async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let req = self.request(Method::PATCH, path).json(body);
        self.execute(req).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let req = self.request(Method::DELETE, path);
        self.execute(req).await
    }

    async fn multipart<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: UploadForm,
    ) -> ClientResult<T> {
        let file_count = form.files.len();
        let req = self.request(method, path).multipart(form.into_reqwest()?);
        tracing::debug!(path = %path, file_count, "Sending multipart request");
        self.execute(req).await
    }
}

/// Unwrap the `{ success, data }` envelope
pub(crate) fn unwrap_envelope<T>(envelope: ApiEnvelope<T>, what: &str) -> ClientResult<T> {
    if !envelope.success {
        return Err(ClientError::Api {
            code: shared::ErrorCode::Internal,
            message: envelope.message_or(&format!("Failed to {what}")),
        });
    }
    envelope
        .data
        .ok_or_else(|| ClientError::InvalidResponse(format!("Missing {what} data")))
}

/// Check a `{ success }` envelope whose data is optional
pub(crate) fn expect_success<T>(envelope: ApiEnvelope<T>, what: &str) -> ClientResult<Option<T>> {
    if envelope.success {
        Ok(envelope.data)
    } else {
        Err(ClientError::Api {
            code: shared::ErrorCode::Internal,
            message: envelope.message_or(&format!("Failed to {what}")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upload_form_fields() {
        let form = UploadForm::new()
            .text("name", "DJ")
            .json("tags", &vec!["a", "b"])
            .unwrap()
            .file("images", UploadFile::new("image-0.png", "image/png", vec![1]));
        assert_eq!(form.field("name"), Some("DJ"));
        assert_eq!(form.field("tags"), Some(r#"["a","b"]"#));
        assert_eq!(form.files.len(), 1);
        assert!(form.into_reqwest().is_ok());
    }

    #[test]
    fn test_bad_mime_is_rejected() {
        let form = UploadForm::new().file("images", UploadFile::new("x", "not a mime", vec![1]));
        assert!(matches!(form.into_reqwest(), Err(ClientError::Http(_))));
    }

    #[test]
    fn test_unwrap_envelope() {
        let ok: ApiEnvelope<u32> = serde_json::from_value(json!({"success": true, "data": 3})).unwrap();
        assert_eq!(unwrap_envelope(ok, "count").unwrap(), 3);

        let missing: ApiEnvelope<u32> = serde_json::from_value(json!({"success": true})).unwrap();
        assert!(matches!(
            unwrap_envelope(missing, "count"),
            Err(ClientError::InvalidResponse(_))
        ));

        let failed: ApiEnvelope<u32> =
            serde_json::from_value(json!({"success": false, "message": "nope"})).unwrap();
        match unwrap_envelope(failed, "count") {
            Err(ClientError::Api { message, .. }) => assert_eq!(message, "nope"),
            other => panic!("unexpected {other:?}"),
        }
        let rejected: ApiEnvelope<()> =
            serde_json::from_value(json!({"success": false, "message": "x"})).unwrap();
        assert!(expect_success(rejected, "delete").is_err());
    }

    #[test]
    fn test_url_join() {
        let session = AuthSession::restore(std::sync::Arc::new(crate::storage::MemoryStorage::new()));
        let client = NetworkHttpClient::new(&ClientConfig::new("http://h/api/"), session).unwrap();
        assert_eq!(client.url("/notifications"), "http://h/api/notifications");
        assert_eq!(client.url("events/1"), "http://h/api/events/1");
    }
}

//! HTTP storage-gateway content store.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::ContentStore;
use crate::domain::ContentId;
use crate::error::PipelineError;

/// Transport-level timeout for upload requests.
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Content store backed by a storage-node HTTP gateway.
///
/// Uploads the payload with `POST {base}/upload` and expects a JSON
/// body of the form `{"cid": "..."}`. The returned identifier is
/// treated as fully opaque.
#[derive(Debug, Clone)]
pub struct HttpContentStore {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    cid: String,
}

impl HttpContentStore {
    /// Creates a store client for the given gateway base URL.
    ///
    /// # Errors
    ///
    /// Returns a [`reqwest::Error`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(base_url: String) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn put(&self, payload: &[u8]) -> Result<ContentId, PipelineError> {
        let url = format!("{}/upload", self.base_url);

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload.to_vec())
            .send()
            .await
            .map_err(|e| PipelineError::StorageUnavailable(format!("upload failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::StorageUnavailable(format!(
                "gateway returned {status}"
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::StorageUnavailable(format!("malformed response: {e}")))?;

        if body.cid.is_empty() {
            return Err(PipelineError::StorageUnavailable(
                "gateway returned an empty content identifier".to_string(),
            ));
        }

        Ok(ContentId::new(body.cid))
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn put_returns_the_gateway_cid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .and(body_json(serde_json::json!({"analysis": "text"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"cid": "bafkreialpha123"})),
            )
            .mount(&server)
            .await;

        let store = HttpContentStore::new(server.uri()).unwrap();
        let payload = serde_json::to_vec(&serde_json::json!({"analysis": "text"})).unwrap();
        let cid = store.put(&payload).await.unwrap();
        assert_eq!(cid.as_str(), "bafkreialpha123");
    }

    #[tokio::test]
    async fn gateway_failure_maps_to_storage_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = HttpContentStore::new(server.uri()).unwrap();
        let err = store.put(b"{}").await.unwrap_err();
        assert!(matches!(err, PipelineError::StorageUnavailable(_)));
    }

    #[tokio::test]
    async fn empty_cid_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"cid": ""})))
            .mount(&server)
            .await;

        let store = HttpContentStore::new(server.uri()).unwrap();
        let err = store.put(b"{}").await.unwrap_err();
        assert!(matches!(err, PipelineError::StorageUnavailable(_)));
    }
}

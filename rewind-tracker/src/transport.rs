//! Transport to the progress server.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rewind_model::{ApiResponse, UpdateProgressRequest, Video, VideoID, ViewerID, WatchRecord};
use serde::de::DeserializeOwned;

/// How session snapshots reach the server. Abstract so sessions can be
/// driven against a fake in tests.
#[async_trait]
pub trait ProgressTransport: Send + Sync {
    /// Video metadata, needed for the runtime duration.
    async fn fetch_video(&self, video_id: VideoID) -> Result<Video>;

    /// Existing progress (the server creates a default record on first read).
    async fn fetch_progress(&self, viewer_id: ViewerID, video_id: VideoID) -> Result<WatchRecord>;

    /// Ship a progress update.
    async fn save_progress(
        &self,
        viewer_id: ViewerID,
        video_id: VideoID,
        update: UpdateProgressRequest,
    ) -> Result<WatchRecord>;

    /// Reset progress to creation defaults.
    async fn reset_progress(&self, viewer_id: ViewerID, video_id: VideoID) -> Result<WatchRecord>;
}

/// HTTP transport against the rewind-server REST API
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    api_version: String,
}

impl HttpTransport {
    /// Create a new transport for `base_url` (scheme + authority, no path).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_version: "v1".to_string(),
        })
    }

    /// Build a versioned API URL
    fn build_url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/api/{}/{}", self.base_url, self.api_version, path)
    }

    /// Execute a request and unwrap the standard response envelope.
    async fn execute<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request.send().await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                let envelope: ApiResponse<T> = response.json().await?;
                envelope
                    .data
                    .ok_or_else(|| anyhow::anyhow!("empty response from server"))
            }
            status => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown error".to_string());
                Err(anyhow::anyhow!(
                    "request failed with status {status}: {error_text}"
                ))
            }
        }
    }
}

#[async_trait]
impl ProgressTransport for HttpTransport {
    async fn fetch_video(&self, video_id: VideoID) -> Result<Video> {
        let url = self.build_url(&format!("videos/{video_id}"));
        self.execute(self.client.get(url)).await
    }

    async fn fetch_progress(&self, viewer_id: ViewerID, video_id: VideoID) -> Result<WatchRecord> {
        let url = self.build_url(&format!("progress/{viewer_id}/{video_id}"));
        self.execute(self.client.get(url)).await
    }

    async fn save_progress(
        &self,
        viewer_id: ViewerID,
        video_id: VideoID,
        update: UpdateProgressRequest,
    ) -> Result<WatchRecord> {
        let url = self.build_url(&format!("progress/{viewer_id}/{video_id}"));
        self.execute(self.client.post(url).json(&update)).await
    }

    async fn reset_progress(&self, viewer_id: ViewerID, video_id: VideoID) -> Result<WatchRecord> {
        let url = self.build_url(&format!("progress/{viewer_id}/{video_id}"));
        self.execute(self.client.delete(url)).await
    }
}

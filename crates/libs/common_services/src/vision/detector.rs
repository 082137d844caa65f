use app_state::DetectorSettings;
use async_trait::async_trait;
use common_types::DetectedFace;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("detector request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("detector unavailable after {0} attempts")]
    Unavailable(u32),
}

/// Black-box face detection capability: image bytes in, zero or more faces
/// with bounding box, confidence and embedding out.
#[async_trait]
pub trait DetectFaces: Send + Sync {
    async fn detect(&self, image: &[u8]) -> Result<Vec<DetectedFace>, DetectorError>;
}

/// HTTP client for the detection sidecar. Transport failures are retried
/// with exponential backoff for a bounded number of attempts before they
/// surface as a capability-unavailable error.
pub struct RemoteDetector {
    client: reqwest::Client,
    base_url: String,
    max_attempts: u32,
    backoff: Duration,
}

impl RemoteDetector {
    #[must_use]
    pub fn new(settings: &DetectorSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            max_attempts: settings.max_attempts.max(1),
            backoff: Duration::from_millis(settings.backoff_ms),
        }
    }
}

#[async_trait]
impl DetectFaces for RemoteDetector {
    async fn detect(&self, image: &[u8]) -> Result<Vec<DetectedFace>, DetectorError> {
        let url = format!("{}/detect", self.base_url);

        for attempt in 1..=self.max_attempts {
            let response = self
                .client
                .post(&url)
                .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                .body(image.to_vec())
                .send()
                .await
                .and_then(reqwest::Response::error_for_status);

            match response {
                Ok(response) => return Ok(response.json::<Vec<DetectedFace>>().await?),
                Err(err) if attempt < self.max_attempts => {
                    let delay = self.backoff * 2u32.saturating_pow(attempt - 1);
                    warn!(
                        "Detector attempt {attempt}/{} failed, retrying in {delay:?}: {err}",
                        self.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    warn!("Detector gave up after {attempt} attempts: {err}");
                    return Err(DetectorError::Unavailable(self.max_attempts));
                }
            }
        }

        Err(DetectorError::Unavailable(self.max_attempts))
    }
}

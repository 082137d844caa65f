use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct RawSettings {
    pub database: DatabaseSettings,
    pub vision: VisionSettings,
    pub curation: CurationSettings,
    pub discovery: RawDiscoverySettings,
    pub source: SourceSettings,
    pub detector: DetectorSettings,
    pub api: ApiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
}

/// Thresholds for the per-photo vision pipeline.
#[derive(Debug, Deserialize, Clone)]
pub struct VisionSettings {
    /// Variance-of-Laplacian below this value rejects the photo as blurry.
    pub min_blur_score: f64,
    /// Minimum fraction of the frame area the face bounding box must cover.
    pub min_face_area_frac: f32,
    /// Minimum detector confidence for the single detected face.
    pub min_confidence: f32,
    /// How many photos of one candidate may be processed concurrently.
    pub max_concurrency: usize,
    pub model_name: String,
    pub model_version: String,
}

/// Knobs for the photo curator.
#[derive(Debug, Deserialize, Clone)]
pub struct CurationSettings {
    /// How many photos to keep per candidate.
    pub top_k: usize,
    /// Cosine similarity at or above this value marks a near-duplicate.
    pub duplicate_threshold: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawDiscoverySettings {
    /// Where downloaded candidate photos land, one folder per candidate.
    pub photos_dir: PathBuf,
    /// How many photos per candidate to download for analysis.
    pub download_limit: usize,
    /// How many queued candidates to pre-process ahead of the cursor.
    pub preload_ahead: usize,
}

/// The social network the candidates come from.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    pub base_url: String,
    pub api_version: String,
}

/// Connection to the face-detection sidecar.
#[derive(Debug, Deserialize, Clone)]
pub struct DetectorSettings {
    pub base_url: String,
    /// Attempts before a capability-unavailable failure is recorded.
    pub max_attempts: u32,
    /// Base delay for exponential backoff between attempts.
    pub backoff_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

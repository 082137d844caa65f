use async_trait::async_trait;
use common_types::SearchFilter;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("social network request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("social network returned an error: {0}")]
    Api(String),
}

/// Candidate attributes as returned by one discovery call. The result list
/// is finite per call and not guaranteed deduplicated across calls.
#[derive(Debug, Clone)]
pub struct DiscoveredCandidate {
    pub remote_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub domain: String,
}

/// One available photo of a candidate, with its ranking signal.
#[derive(Debug, Clone)]
pub struct DiscoveredPhoto {
    pub source_photo_id: i64,
    pub url: String,
    pub likes_count: i64,
}

/// The social-network collaborator: profile search, per-candidate photo
/// listing and raw photo download. Implementations live at the edge; the
/// discovery services only see this seam.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn resolve_city(&self, access_token: &str, city_name: &str)
    -> Result<Option<i64>, SourceError>;

    async fn search(
        &self,
        access_token: &str,
        filter: &SearchFilter,
    ) -> Result<Vec<DiscoveredCandidate>, SourceError>;

    async fn candidate_photos(
        &self,
        access_token: &str,
        remote_id: i64,
    ) -> Result<Vec<DiscoveredPhoto>, SourceError>;

    async fn download(&self, url: &str) -> Result<Vec<u8>, SourceError>;
}

/// HTTP implementation against a VK-style JSON API
/// (`{base}/method?access_token=..&v=..` with a `response.items` envelope).
pub struct RemoteSource {
    client: reqwest::Client,
    base_url: String,
    api_version: String,
    search_count: u32,
}

impl RemoteSource {
    #[must_use]
    pub fn new(base_url: &str, api_version: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_version: api_version.to_string(),
            search_count: 50,
        }
    }

    async fn call(
        &self,
        method: &str,
        access_token: &str,
        params: &[(&str, String)],
    ) -> Result<Value, SourceError> {
        let url = format!("{}/{method}", self.base_url);
        let mut query: Vec<(&str, String)> = params.to_vec();
        query.push(("access_token", access_token.to_string()));
        query.push(("v", self.api_version.clone()));

        let body: Value = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = body.get("error") {
            return Err(SourceError::Api(error.to_string()));
        }
        Ok(body)
    }

    fn items(body: &Value) -> &[Value] {
        body.pointer("/response/items")
            .and_then(Value::as_array)
            .map_or(&[], Vec::as_slice)
    }

    /// Largest available size of a photo item, by the source's size codes.
    fn best_size_url(item: &Value) -> Option<String> {
        const PRIORITY: [&str; 10] = ["w", "z", "y", "x", "r", "q", "p", "o", "m", "s"];
        let sizes = item.get("sizes")?.as_array()?;
        sizes
            .iter()
            .min_by_key(|size| {
                let code = size.get("type").and_then(Value::as_str).unwrap_or("");
                PRIORITY.iter().position(|p| *p == code).unwrap_or(PRIORITY.len())
            })
            .and_then(|size| size.get("url").and_then(Value::as_str))
            .map(ToString::to_string)
    }
}

#[async_trait]
impl CandidateSource for RemoteSource {
    async fn resolve_city(
        &self,
        access_token: &str,
        city_name: &str,
    ) -> Result<Option<i64>, SourceError> {
        let body = self
            .call(
                "database.getCities",
                access_token,
                &[("q", city_name.to_string()), ("count", "1".to_string())],
            )
            .await?;
        Ok(Self::items(&body)
            .first()
            .and_then(|item| item.get("id"))
            .and_then(Value::as_i64))
    }

    async fn search(
        &self,
        access_token: &str,
        filter: &SearchFilter,
    ) -> Result<Vec<DiscoveredCandidate>, SourceError> {
        let city_id = filter
            .city_id
            .ok_or_else(|| SourceError::Api("search requires a resolved city id".to_string()))?;
        let body = self
            .call(
                "users.search",
                access_token,
                &[
                    ("city", city_id.to_string()),
                    ("sex", filter.gender.remote_code().to_string()),
                    ("age_from", filter.age_from.to_string()),
                    ("age_to", filter.age_to.to_string()),
                    ("has_photo", "1".to_string()),
                    ("fields", "domain".to_string()),
                    ("count", self.search_count.to_string()),
                ],
            )
            .await?;

        let candidates = Self::items(&body)
            .iter()
            .filter_map(|item| {
                let remote_id = item.get("id").and_then(Value::as_i64)?;
                let field = |name: &str| {
                    item.get(name)
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                };
                Some(DiscoveredCandidate {
                    remote_id,
                    first_name: field("first_name"),
                    last_name: field("last_name"),
                    domain: field("domain"),
                })
            })
            .collect();
        Ok(candidates)
    }

    async fn candidate_photos(
        &self,
        access_token: &str,
        remote_id: i64,
    ) -> Result<Vec<DiscoveredPhoto>, SourceError> {
        let body = self
            .call(
                "photos.get",
                access_token,
                &[
                    ("owner_id", remote_id.to_string()),
                    ("album_id", "profile".to_string()),
                    ("extended", "1".to_string()),
                ],
            )
            .await?;

        let photos = Self::items(&body)
            .iter()
            .filter_map(|item| {
                let source_photo_id = item.get("id").and_then(Value::as_i64)?;
                let url = Self::best_size_url(item)?;
                let likes_count = item
                    .pointer("/likes/count")
                    .and_then(Value::as_i64)
                    .unwrap_or(0);
                Some(DiscoveredPhoto {
                    source_photo_id,
                    url,
                    likes_count,
                })
            })
            .collect();
        Ok(photos)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}

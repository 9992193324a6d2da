use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use thiserror::Error;

use super::cache::BoundedCache;
use super::endpoints::{FoodDetails, FoodSearchHit, FoodSearchResponse, DEFAULT_FDC_BASE_URL};
use super::FoodDataProvider;

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("USDA API key is not configured")]
    MissingApiKey,
    #[error("Invalid USDA API key")]
    InvalidApiKey,
    #[error("USDA API request timed out for {0}")]
    Timeout(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("USDA API rate limit exceeded")]
    UpstreamRateLimited,
    #[error("USDA API error {status}: {error_body}")]
    ApiError {
        status: StatusCode,
        error_body: String,
    },
    #[error("Network error: {0}")]
    NetworkError(#[source] reqwest::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl ApiConnectionError {
    fn from_request(err: reqwest::Error, target: &str) -> Self {
        if err.is_timeout() {
            ApiConnectionError::Timeout(target.to_string())
        } else {
            ApiConnectionError::NetworkError(err)
        }
    }

    async fn from_status(response: Response, target: &str) -> Self {
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiConnectionError::InvalidApiKey,
            StatusCode::NOT_FOUND => ApiConnectionError::NotFound(target.to_string()),
            StatusCode::TOO_MANY_REQUESTS => ApiConnectionError::UpstreamRateLimited,
            status => {
                let error_body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Failed to read error body".to_string());
                ApiConnectionError::ApiError { status, error_body }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FdcClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    /// Entries kept per cache (food details and search pages are cached separately)
    pub cache_size: usize,
}

impl Default for FdcClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_FDC_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            cache_size: 1024,
        }
    }
}

type SearchKey = (String, u32);

/// USDA FoodData Central client.
///
/// Food details and search pages are held in bounded LRU caches, so repeated
/// lookups never reach the network.
pub struct FdcClient {
    config: FdcClientConfig,
    http_client: Client,
    details_cache: BoundedCache<u64, FoodDetails>,
    search_cache: BoundedCache<SearchKey, Vec<FoodSearchHit>>,
}

impl FdcClient {
    pub fn new(config: FdcClientConfig) -> Result<Self, ApiConnectionError> {
        let details_cache = BoundedCache::new(config.cache_size);
        let search_cache = BoundedCache::new(config.cache_size);
        Self::with_caches(config, details_cache, search_cache)
    }

    /// Builds a client around caches the caller owns the sizing of.
    pub fn with_caches(
        config: FdcClientConfig,
        details_cache: BoundedCache<u64, FoodDetails>,
        search_cache: BoundedCache<SearchKey, Vec<FoodSearchHit>>,
    ) -> Result<Self, ApiConnectionError> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiConnectionError::NetworkError)?;
        Ok(Self {
            config,
            http_client,
            details_cache,
            search_cache,
        })
    }

    pub fn config(&self) -> &FdcClientConfig {
        &self.config
    }

    /// Cached (details, search) entry counts.
    pub async fn cache_stats(&self) -> (usize, usize) {
        (self.details_cache.len().await, self.search_cache.len().await)
    }

    pub async fn clear_caches(&self) {
        self.details_cache.clear().await;
        self.search_cache.clear().await;
    }

    fn api_key(&self) -> Result<&str, ApiConnectionError> {
        let key = self.config.api_key.trim();
        if key.is_empty() {
            Err(ApiConnectionError::MissingApiKey)
        } else {
            Ok(key)
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl FoodDataProvider for FdcClient {
    async fn search_foods(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<FoodSearchHit>, ApiConnectionError> {
        if let Some(hits) = self.cached_search(query, limit).await {
            return Ok(hits);
        }
        let cache_key = (query.to_string(), limit);

        let api_key = self.api_key()?;
        let target = format!("query '{query}'");
        let limit_param = limit.to_string();
        tracing::debug!(query, limit, "querying FDC foods/search");

        let response = self
            .http_client
            .get(self.url("foods/search"))
            .query(&[
                ("api_key", api_key),
                ("query", query),
                ("pageSize", limit_param.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ApiConnectionError::from_request(e, &target))?;

        if !response.status().is_success() {
            let err = ApiConnectionError::from_status(response, &target).await;
            tracing::warn!(error = %err, "FDC search failed");
            return Err(err);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiConnectionError::from_request(e, &target))?;
        let parsed: FoodSearchResponse = serde_json::from_slice(&body)?;

        self.search_cache.insert(cache_key, parsed.foods.clone()).await;
        Ok(parsed.foods)
    }

    async fn get_food(&self, fdc_id: u64) -> Result<FoodDetails, ApiConnectionError> {
        if let Some(details) = self.cached_food(fdc_id).await {
            return Ok(details);
        }

        let api_key = self.api_key()?;
        let target = format!("Food with FDC ID {fdc_id}");
        tracing::debug!(fdc_id, "querying FDC food details");

        let response = self
            .http_client
            .get(self.url(&format!("food/{fdc_id}")))
            .query(&[("api_key", api_key)])
            .send()
            .await
            .map_err(|e| ApiConnectionError::from_request(e, &target))?;

        if !response.status().is_success() {
            let err = ApiConnectionError::from_status(response, &target).await;
            tracing::warn!(fdc_id, error = %err, "FDC food lookup failed");
            return Err(err);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiConnectionError::from_request(e, &target))?;
        let details: FoodDetails = serde_json::from_slice(&body)?;

        if let Some((evicted, _)) = self.details_cache.insert(fdc_id, details.clone()).await {
            tracing::debug!(evicted, "food cache full, evicted least recently used entry");
        }
        Ok(details)
    }

    async fn cached_search(&self, query: &str, limit: u32) -> Option<Vec<FoodSearchHit>> {
        let hits = self.search_cache.get(&(query.to_string(), limit)).await?;
        tracing::debug!(query, limit, "search cache hit");
        Some(hits)
    }

    async fn cached_food(&self, fdc_id: u64) -> Option<FoodDetails> {
        let details = self.details_cache.get(&fdc_id).await?;
        tracing::debug!(fdc_id, "food cache hit");
        Some(details)
    }
}

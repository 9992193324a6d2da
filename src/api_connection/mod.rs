pub mod cache;
pub mod connection;
pub mod endpoints;
pub mod rate_limiter;

use async_trait::async_trait;

use connection::ApiConnectionError;
use endpoints::{FoodDetails, FoodSearchHit};

/// Upstream source of food records.
#[async_trait]
pub trait FoodDataProvider: Send + Sync {
    /// Returns up to `limit` matches for an already-cleaned query.
    async fn search_foods(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<FoodSearchHit>, ApiConnectionError>;

    async fn get_food(&self, fdc_id: u64) -> Result<FoodDetails, ApiConnectionError>;

    /// Answers a search from local state only. Providers without a cache
    /// always miss.
    async fn cached_search(&self, _query: &str, _limit: u32) -> Option<Vec<FoodSearchHit>> {
        None
    }

    async fn cached_food(&self, _fdc_id: u64) -> Option<FoodDetails> {
        None
    }
}

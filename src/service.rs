use futures::future::join_all;

use crate::api_connection::endpoints::{FoodDetails, FoodSearchHit};
use crate::api_connection::rate_limiter::RateLimiter;
use crate::api_connection::FoodDataProvider;
use crate::errors::{NutritionError, ServiceError};
use crate::ingredient::{Ingredient, Suggestion};
use crate::ingredient_builder::{build_ingredient, suggestion_from_hit};
use crate::recipe_aggregator::{build_recipe_output, RecipeOutput};
use crate::recipe_parser::IngredientInput;

pub const MAX_SEARCH_LIMIT: u32 = 50;

/// Strips punctuation so "Tomatillos, raw" searches as "Tomatillos  raw".
pub fn clean_query(query: &str) -> String {
    query
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Ingredient lookup, rescaling and recipe totals on top of a food data
/// provider.
///
/// Every call that has to reach upstream is charged to `caller` in the rate
/// limiter. Answers the provider already has cached are free.
pub struct NutritionService<P: FoodDataProvider> {
    provider: P,
    rate_limiter: RateLimiter,
    default_page_size: u32,
}

impl<P: FoodDataProvider> NutritionService<P> {
    pub fn new(provider: P, rate_limiter: RateLimiter, default_page_size: u32) -> Self {
        Self {
            provider,
            rate_limiter,
            default_page_size: default_page_size.clamp(1, MAX_SEARCH_LIMIT),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Search suggestions for `query`; `limit` defaults to the configured page size.
    pub async fn suggest(
        &self,
        caller: &str,
        query: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Suggestion>, ServiceError> {
        let limit = limit.unwrap_or(self.default_page_size);
        if limit == 0 || limit > MAX_SEARCH_LIMIT {
            return Err(ServiceError::InvalidRequest(format!(
                "limit must be between 1 and {MAX_SEARCH_LIMIT}, got {limit}"
            )));
        }
        let cleaned = clean_query(query);
        if cleaned.is_empty() {
            return Err(ServiceError::InvalidRequest(
                "query must not be empty".to_string(),
            ));
        }

        let hits = self.search(caller, &cleaned, limit).await?;
        tracing::info!(query = %cleaned, hits = hits.len(), "search complete");
        Ok(hits.into_iter().map(suggestion_from_hit).collect())
    }

    /// Resolves one ingredient by FDC id (preferred) or by its best search
    /// match, rescaled when both `amount` and `unit` are given.
    pub async fn get_ingredient(
        &self,
        caller: &str,
        input: &IngredientInput,
    ) -> Result<Ingredient, ServiceError> {
        let fdc_id = match (input.fdc_id, input.q.as_deref()) {
            (Some(id), _) => id,
            (None, Some(q)) if !clean_query(q).is_empty() => {
                let cleaned = clean_query(q);
                let hits = self.search(caller, &cleaned, 1).await?;
                hits.first()
                    .map(|hit| hit.fdc_id)
                    .ok_or_else(|| ServiceError::NotFound(format!("No USDA match for '{q}'")))?
            }
            _ => {
                return Err(ServiceError::InvalidRequest(
                    "Must provide q or fdc_id".to_string(),
                ))
            }
        };

        let mut ingredient = build_ingredient(self.food(caller, fdc_id).await?);
        let unit = input.unit.as_deref().map(str::trim).filter(|u| !u.is_empty());
        if let (Some(amount), Some(unit)) = (input.amount, unit) {
            ingredient.rescale(amount, unit)?;
        }
        Ok(ingredient)
    }

    /// Resolves every recipe line concurrently and sums their nutrients.
    ///
    /// The first failing line (in input order) fails the whole recipe.
    pub async fn calculate_recipe(
        &self,
        caller: &str,
        items: &[IngredientInput],
    ) -> Result<RecipeOutput, ServiceError> {
        if items.is_empty() {
            return Err(NutritionError::EmptyInput.into());
        }

        let results = join_all(items.iter().map(|item| self.get_ingredient(caller, item))).await;

        let mut ingredients = Vec::with_capacity(results.len());
        for (i, result) in results.into_iter().enumerate() {
            match result {
                Ok(ingredient) => ingredients.push(ingredient),
                Err(source) => {
                    tracing::warn!(index = i + 1, error = %source, "recipe ingredient failed");
                    return Err(ServiceError::Ingredient {
                        index: i + 1,
                        source: Box::new(source),
                    });
                }
            }
        }

        let output = build_recipe_output(ingredients)?;
        tracing::info!(
            items = output.items.len(),
            nutrients = output.total.len(),
            "recipe calculated"
        );
        Ok(output)
    }

    async fn search(
        &self,
        caller: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<FoodSearchHit>, ServiceError> {
        if let Some(hits) = self.provider.cached_search(query, limit).await {
            return Ok(hits);
        }
        self.admit(caller)?;
        Ok(self.provider.search_foods(query, limit).await?)
    }

    async fn food(&self, caller: &str, fdc_id: u64) -> Result<FoodDetails, ServiceError> {
        if let Some(details) = self.provider.cached_food(fdc_id).await {
            return Ok(details);
        }
        self.admit(caller)?;
        Ok(self.provider.get_food(fdc_id).await?)
    }

    fn admit(&self, caller: &str) -> Result<(), ServiceError> {
        let decision = self.rate_limiter.increment(caller);
        if !decision.allowed {
            tracing::warn!(caller, "rate limit exceeded");
            return Err(ServiceError::RateLimited);
        }
        tracing::debug!(caller, remaining = decision.remaining, "upstream call admitted");
        Ok(())
    }
}

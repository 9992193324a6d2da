use thiserror::Error;

use crate::api_connection::connection::ApiConnectionError;

/// Validation errors raised by the conversion, rescale and aggregation core.
///
/// All of them are deterministic: retrying with the same input fails the same way.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NutritionError {
    #[error("Amount must be non-negative, got {0}")]
    InvalidAmount(f64),
    /// Carries the caller's unit strings as given, before normalization.
    #[error("Cannot convert from '{from}' to '{to}'.")]
    UnsupportedConversion { from: String, to: String },
    #[error("Empty ingredient list")]
    EmptyInput,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Rate limit exceeded. Try again later.")]
    RateLimited,
    #[error(transparent)]
    Upstream(#[from] ApiConnectionError),
    #[error(transparent)]
    Nutrition(#[from] NutritionError),
    #[error("Error fetching ingredient {index}: {source}")]
    Ingredient {
        index: usize,
        #[source]
        source: Box<ServiceError>,
    },
}

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tokio::fs;

/// One recipe line: either an FDC id or a search query, plus an optional serving.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct IngredientInput {
    /// Used when present; `q` is ignored then
    #[serde(default)]
    pub fdc_id: Option<u64>,
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "trimmed_lowercase")]
    pub unit: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RecipeRequest {
    #[serde(default, alias = "title")]
    pub recipe_title: Option<String>,
    pub ingredients: Vec<IngredientInput>,
}

#[derive(Debug, Error)]
pub enum RecipeParseError {
    #[error("Failed to read recipe file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid recipe JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn trimmed_lowercase<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .map(|u| u.trim().to_lowercase())
        .filter(|u| !u.is_empty()))
}

// Accepts either `{"recipe_title": ..., "ingredients": [...]}` or a bare list of ingredients
#[derive(Deserialize)]
#[serde(untagged)]
enum RecipeDocument {
    Full(RecipeRequest),
    Items(Vec<IngredientInput>),
}

pub fn parse_recipe_request(text: &str) -> Result<RecipeRequest, RecipeParseError> {
    let document: RecipeDocument = serde_json::from_str(text)?;
    Ok(match document {
        RecipeDocument::Full(request) => request,
        RecipeDocument::Items(ingredients) => RecipeRequest {
            recipe_title: None,
            ingredients,
        },
    })
}

pub async fn load_recipe_request(path: &Path) -> Result<RecipeRequest, RecipeParseError> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|source| RecipeParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let request = parse_recipe_request(&text)?;
    tracing::debug!(
        path = %path.display(),
        ingredients = request.ingredients.len(),
        "loaded recipe request"
    );
    Ok(request)
}

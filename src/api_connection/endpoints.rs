use serde::{Deserialize, Serialize};

pub const DEFAULT_FDC_BASE_URL: &str = "https://api.nal.usda.gov/fdc/v1";

/// `GET /foods/search` response. Pagination fields are ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FoodSearchResponse {
    #[serde(default)]
    pub foods: Vec<FoodSearchHit>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodSearchHit {
    pub fdc_id: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub food_category: Option<FoodCategory>,
    #[serde(default)]
    pub brand_owner: Option<String>,
}

/// FDC sends the category as a bare string on search hits and as an object
/// on some detail records.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FoodCategory {
    Name(String),
    Detailed {
        #[serde(default)]
        description: Option<String>,
    },
}

impl FoodCategory {
    pub fn into_name(self) -> Option<String> {
        match self {
            FoodCategory::Name(name) => Some(name),
            FoodCategory::Detailed { description } => description,
        }
    }
}

/// `GET /food/{fdcId}` response.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodDetails {
    pub fdc_id: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub food_category: Option<FoodCategory>,
    #[serde(default)]
    pub food_nutrients: Vec<FoodNutrientRecord>,
    #[serde(default)]
    pub food_portions: Vec<FoodPortionRecord>,
    #[serde(default)]
    pub serving_size: Option<f64>,
    #[serde(default)]
    pub serving_size_unit: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FoodNutrientRecord {
    #[serde(default)]
    pub nutrient: Option<NutrientInfo>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientInfo {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unit_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodPortionRecord {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub gram_weight: Option<f64>,
    #[serde(default)]
    pub modifier: Option<String>,
    #[serde(default)]
    pub portion_description: Option<String>,
    #[serde(default)]
    pub measure_unit: Option<MeasureUnit>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MeasureUnit {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub abbreviation: Option<String>,
}

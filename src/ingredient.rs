use serde::{Deserialize, Serialize};

use crate::errors::NutritionError;
use crate::units::{convert, normalize, round4};

/// Type-ahead search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub fdc_id: u64,
    pub description: String,
    pub category: Option<String>,
    pub data_type: String,
}

/// `amount` of `unit` weighs `grams` grams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portion {
    pub unit: String,
    pub amount: f64,
    pub grams: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Portion {
    /// Builds a portion with its unit normalized.
    pub fn new(unit: &str, amount: f64, grams: f64, description: Option<String>) -> Self {
        Self {
            unit: normalize(unit),
            amount,
            grams,
            description,
        }
    }

    pub fn hundred_grams() -> Self {
        Self::new("g", 100.0, 100.0, Some("100 g".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientEntry {
    /// Friendly key, e.g. "fat", "protein"
    pub key: String,
    /// Upstream nutrient name
    pub name: String,
    /// Amount per current serving, in `unit`
    pub value: f64,
    pub unit: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NutrientEntry {
    /// This nutrient's value expressed in `to_unit`, rounded to 4 decimals.
    pub fn convert_to(&self, to_unit: &str) -> Result<f64, NutritionError> {
        convert(self.value, &self.unit, to_unit).map(round4)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub fdc_id: u64,
    pub description: String,
    pub category: Option<String>,
    pub data_type: Option<String>,
    /// The serving every nutrient value is expressed against
    pub serving: Portion,
    pub portions: Vec<Portion>,
    pub nutrients: Vec<NutrientEntry>,
}

impl Ingredient {
    /// Rescales to a new serving of `amount` `unit`.
    ///
    /// A portion with the same unit wins over unit conversion, and is scaled
    /// linearly from its own amount (it need not be a 1-unit portion). Every
    /// nutrient is multiplied by `new_grams / old_grams` and rounded to 4
    /// decimals; if either gram weight is zero the values are left alone.
    ///
    /// Nothing is modified when an error is returned.
    ///
    /// # Errors
    /// `InvalidAmount` for a negative or non-finite amount,
    /// `UnsupportedConversion` when no portion matches and `unit` cannot be
    /// converted to grams.
    pub fn rescale(&mut self, amount: f64, unit: &str) -> Result<(), NutritionError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(NutritionError::InvalidAmount(amount));
        }

        let unit_norm = normalize(unit);
        let old_grams = self.serving.grams;

        let matched = self
            .portions
            .iter()
            .find(|p| p.unit == unit_norm && p.amount > 0.0);
        let new_grams = match matched {
            Some(portion) => amount / portion.amount * portion.grams,
            None => convert(amount, unit, "g")?,
        };

        let factor = if old_grams != 0.0 && new_grams != 0.0 {
            new_grams / old_grams
        } else {
            1.0
        };

        // past this point nothing can fail
        self.serving = Portion {
            description: Some(format!("{amount} {unit_norm}")),
            unit: unit_norm,
            amount,
            grams: new_grams,
        };
        for nutrient in &mut self.nutrients {
            nutrient.value = round4(nutrient.value * factor);
        }
        Ok(())
    }

    pub fn nutrient(&self, key: &str) -> Option<&NutrientEntry> {
        self.nutrients.iter().find(|n| n.key == key)
    }
}

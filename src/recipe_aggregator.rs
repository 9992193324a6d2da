use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::NutritionError;
use crate::ingredient::Ingredient;

/// One summed nutrient across a recipe.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NutrientTotal {
    pub key: String,
    pub name: String,
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RecipeOutput {
    /// Per-ingredient details, at their requested servings
    pub items: Vec<Ingredient>,
    /// Summed nutrient values, sorted by key
    pub total: Vec<NutrientTotal>,
    /// Combined serving mass; `None` when no item has a positive gram weight
    #[serde(default)]
    pub total_mass_g: Option<f64>,
    /// Totals normalized per 100 g of `total_mass_g`
    #[serde(default)]
    pub per_100g: BTreeMap<String, f64>,
}

impl RecipeOutput {
    pub fn total_value(&self, key: &str) -> Option<f64> {
        self.total.iter().find(|t| t.key == key).map(|t| t.value)
    }
}

/// Sums nutrient values by key across `ingredients`.
///
/// An ingredient that lacks a key simply contributes nothing to it.
pub fn aggregate(ingredients: &[Ingredient]) -> Result<BTreeMap<String, f64>, NutritionError> {
    if ingredients.is_empty() {
        return Err(NutritionError::EmptyInput);
    }

    let mut totals = BTreeMap::new();
    for ingredient in ingredients {
        for nutrient in &ingredient.nutrients {
            *totals.entry(nutrient.key.clone()).or_insert(0.0) += nutrient.value;
        }
    }
    Ok(totals)
}

/// Like [`aggregate`], but keeps the first name and unit seen for each key
/// and rounds totals to 2 decimals.
pub fn summarize_totals(ingredients: &[Ingredient]) -> Result<Vec<NutrientTotal>, NutritionError> {
    let sums = aggregate(ingredients)?;

    let mut labels: BTreeMap<&str, (&str, &str)> = BTreeMap::new();
    for nutrient in ingredients.iter().flat_map(|i| &i.nutrients) {
        labels
            .entry(nutrient.key.as_str())
            .or_insert((nutrient.name.as_str(), nutrient.unit.as_str()));
    }

    Ok(sums
        .into_iter()
        .map(|(key, value)| {
            let (name, unit) = labels.get(key.as_str()).copied().unwrap_or_default();
            NutrientTotal {
                name: name.to_string(),
                unit: unit.to_string(),
                value: round2(value),
                key,
            }
        })
        .collect())
}

pub fn build_recipe_output(items: Vec<Ingredient>) -> Result<RecipeOutput, NutritionError> {
    let total = summarize_totals(&items)?;
    let total_mass_g: f64 = items
        .iter()
        .map(|i| i.serving.grams)
        .filter(|g| *g > 0.0)
        .sum();

    let mut per_100g = BTreeMap::new();
    if total_mass_g > 0.0 {
        let scale_factor = 100.0 / total_mass_g;
        for t in &total {
            per_100g.insert(t.key.clone(), round2(t.value * scale_factor));
        }
    }

    Ok(RecipeOutput {
        items,
        total,
        total_mass_g: (total_mass_g > 0.0).then_some(total_mass_g),
        per_100g,
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingredient::tests::{nutrient, sample_ingredient};

    fn second_ingredient() -> Ingredient {
        let mut ing = sample_ingredient();
        ing.fdc_id = 2;
        ing.nutrients = vec![nutrient("protein", 5.5, "g"), nutrient("fiber", 2.0, "g")];
        ing
    }

    #[test]
    fn test_aggregate_sums_by_key() {
        let totals = aggregate(&[sample_ingredient(), second_ingredient()]).unwrap();
        assert_eq!(totals["protein"], 15.5);
        assert_eq!(totals["energy"], 52.0);
        // missing from the first ingredient, so only the second contributes
        assert_eq!(totals["fiber"], 2.0);
    }

    #[test]
    fn test_aggregate_is_order_independent() {
        let a = aggregate(&[sample_ingredient(), second_ingredient()]).unwrap();
        let b = aggregate(&[second_ingredient(), sample_ingredient()]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_aggregate_empty_fails() {
        assert_eq!(aggregate(&[]), Err(NutritionError::EmptyInput));
        assert!(matches!(build_recipe_output(vec![]), Err(NutritionError::EmptyInput)));
    }

    #[test]
    fn test_summarize_totals_sorted_and_rounded() {
        let mut first = sample_ingredient();
        first.rescale(2.0, "oz").unwrap();
        let totals = summarize_totals(&[first, second_ingredient()]).unwrap();

        let keys: Vec<&str> = totals.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["energy", "fiber", "protein", "sodium"]);

        let protein = totals.iter().find(|t| t.key == "protein").unwrap();
        // 10 g * 0.56699 + 5.5 g
        assert_eq!(protein.value, 11.17);
        assert_eq!(protein.unit, "g");
    }

    #[test]
    fn test_recipe_output_per_100g() {
        let mut first = sample_ingredient();
        first.rescale(300.0, "g").unwrap();
        let output = build_recipe_output(vec![first, second_ingredient()]).unwrap();

        assert_eq!(output.total_mass_g, Some(400.0));
        assert_eq!(output.total_value("protein"), Some(35.5));
        assert_eq!(output.per_100g["protein"], 8.88);
        assert_eq!(output.per_100g["energy"], 39.0);
    }

    #[test]
    fn test_recipe_output_without_mass() {
        let mut ing = sample_ingredient();
        ing.serving.grams = 0.0;
        let output = build_recipe_output(vec![ing]).unwrap();
        assert_eq!(output.total_mass_g, None);
        assert!(output.per_100g.is_empty());
        assert_eq!(output.total.len(), 3);
    }
}

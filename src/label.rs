use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::recipe_aggregator::RecipeOutput;
use crate::units::convert;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LabelError {
    #[error("Invalid label input: missing {}", .missing.join(", "))]
    MissingElements { missing: Vec<String> },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LabelInput {
    pub recipe_title: String,
    pub recipe_data: RecipeOutput,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub hide_business_info: bool,
    #[serde(default)]
    pub allergens: Vec<String>,
    /// Label key (`calories`, `fat`, ...) to a value that replaces the recipe total
    #[serde(default)]
    pub nutrition_adjustments: BTreeMap<String, f64>,
}

struct RowSpec {
    label_key: &'static str,
    recipe_key: &'static str,
    title: &'static str,
    unit: &'static str,
    daily_reference: Option<f64>,
    indented: bool,
    /// Optional rows are never reported missing and only printed when present
    required: bool,
}

const fn row(
    label_key: &'static str,
    recipe_key: &'static str,
    title: &'static str,
    unit: &'static str,
    daily_reference: Option<f64>,
    indented: bool,
) -> RowSpec {
    RowSpec {
        label_key,
        recipe_key,
        title,
        unit,
        daily_reference,
        indented,
        required: true,
    }
}

const fn optional(row: RowSpec) -> RowSpec {
    RowSpec {
        required: false,
        ..row
    }
}

// Daily references for a 2,000 calorie diet
const LABEL_ROWS: [RowSpec; 14] = [
    row("calories", "energy", "Calories", "", None, false),
    row("fat", "fat", "Total Fat", "g", Some(65.0), false),
    row("saturated_fat", "sat_fat", "Saturated Fat", "g", Some(20.0), true),
    row("trans_fat", "trans_fat", "Trans Fat", "g", None, true),
    row("cholesterol", "cholesterol", "Cholesterol", "mg", Some(300.0), false),
    row("sodium", "sodium", "Sodium", "mg", Some(2400.0), false),
    row("carbohydrates", "carbs", "Total Carbohydrate", "g", Some(300.0), false),
    row("dietary_fiber", "fiber", "Dietary Fiber", "g", Some(25.0), true),
    row("sugars", "sugars", "Total Sugars", "g", None, true),
    row("protein", "protein", "Protein", "g", None, false),
    optional(row("vitamin_d", "vitamin_d", "Vitamin D", "mcg", Some(20.0), false)),
    optional(row("calcium", "calcium", "Calcium", "mg", Some(1300.0), false)),
    optional(row("iron", "iron", "Iron", "mg", Some(18.0), false)),
    optional(row("potassium", "potassium", "Potassium", "mg", Some(4700.0), false)),
];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LabelRow {
    pub key: String,
    pub title: String,
    pub amount: f64,
    pub unit: String,
    pub daily_value_percent: Option<u32>,
    #[serde(default)]
    pub indented: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NutritionLabel {
    pub title: String,
    pub business_name: Option<String>,
    pub rows: Vec<LabelRow>,
    pub allergens: Vec<String>,
}

impl NutritionLabel {
    pub fn row(&self, key: &str) -> Option<&LabelRow> {
        self.rows.iter().find(|r| r.key == key)
    }
}

/// Lists every element a label still needs, in a fixed order.
pub fn validate_label_input(input: &LabelInput) -> Result<(), LabelError> {
    let mut missing = Vec::new();

    if input.recipe_title.trim().is_empty() {
        missing.push("recipe_title".to_string());
    }
    if input.recipe_data.items.is_empty() {
        missing.push("recipe_data.items".to_string());
    } else if input.recipe_data.total.is_empty() {
        missing.push("recipe_data.total".to_string());
    }

    let has_business = input
        .business_name
        .as_deref()
        .is_some_and(|name| !name.trim().is_empty());
    if !input.hide_business_info && !has_business {
        missing.push("business_info.business_name".to_string());
    }

    if !input.recipe_data.total.is_empty() {
        for layout in LABEL_ROWS.iter().filter(|l| l.required) {
            if !is_present(input, layout) {
                missing.push(format!("nutrient.{}", layout.label_key));
            }
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(LabelError::MissingElements { missing })
    }
}

fn is_present(input: &LabelInput, layout: &RowSpec) -> bool {
    input
        .recipe_data
        .total
        .iter()
        .any(|t| t.key == layout.recipe_key || t.key == layout.label_key)
        || input.nutrition_adjustments.contains_key(layout.label_key)
}

pub fn build_label(input: &LabelInput) -> Result<NutritionLabel, LabelError> {
    validate_label_input(input)?;

    let rows = LABEL_ROWS
        .iter()
        .filter(|layout| layout.required || is_present(input, layout))
        .map(|layout| {
            let amount = input
                .nutrition_adjustments
                .get(layout.label_key)
                .copied()
                .unwrap_or_else(|| recipe_amount(&input.recipe_data, layout));
            LabelRow {
                key: layout.label_key.to_string(),
                title: layout.title.to_string(),
                amount,
                unit: layout.unit.to_string(),
                daily_value_percent: layout.daily_reference.map(|r| daily_value(amount, r)),
                indented: layout.indented,
            }
        })
        .collect();

    Ok(NutritionLabel {
        title: input.recipe_title.trim().to_string(),
        business_name: if input.hide_business_info {
            None
        } else {
            input.business_name.clone()
        },
        rows,
        allergens: input.allergens.clone(),
    })
}

// Totals arriving in another mass unit (sodium in g, say) are brought to the row's unit
fn recipe_amount(recipe: &RecipeOutput, layout: &RowSpec) -> f64 {
    let Some(total) = recipe
        .total
        .iter()
        .find(|t| t.key == layout.recipe_key || t.key == layout.label_key)
    else {
        return 0.0;
    };
    if layout.unit.is_empty() || total.unit.eq_ignore_ascii_case(layout.unit) {
        return total.value;
    }
    convert(total.value, &total.unit, layout.unit)
        .map(|v| (v * 100.0).round() / 100.0)
        .unwrap_or(total.value)
}

/// Truncated percent of the daily reference; zero and below report 0.
fn daily_value(amount: f64, reference: f64) -> u32 {
    if amount <= 0.0 {
        0
    } else {
        (amount * 100.0 / reference) as u32
    }
}

const LABEL_WIDTH: usize = 40;

impl fmt::Display for NutritionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(LABEL_WIDTH);
        writeln!(f, "Nutrition Facts")?;
        writeln!(f, "{}", self.title)?;
        if let Some(business) = &self.business_name {
            writeln!(f, "{business}")?;
        }
        writeln!(f, "{rule}")?;
        writeln!(f, "Amount Per Serving")?;

        for row in &self.rows {
            if row.key == "calories" {
                writeln!(f, "{:<30}{:>10}", row.title, row.amount)?;
                writeln!(f, "{rule}")?;
                writeln!(f, "{:>width$}", "% Daily Value*", width = LABEL_WIDTH)?;
                continue;
            }
            let indent = if row.indented { "  " } else { "" };
            let name = format!("{indent}{} {}{}", row.title, row.amount, row.unit);
            let percent = row
                .daily_value_percent
                .map(|p| format!("{p}%"))
                .unwrap_or_default();
            writeln!(f, "{name:<30}{percent:>10}")?;
        }

        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "* The % Daily Value tells you how much a nutrient in a serving\n  contributes to a daily diet. 2,000 calories a day is used for\n  general nutrition advice."
        )?;
        if !self.allergens.is_empty() {
            writeln!(f, "Contains: {}", self.allergens.join(", "))?;
        }
        Ok(())
    }
}

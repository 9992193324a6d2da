use std::collections::HashSet;

use crate::api_connection::endpoints::{
    FoodDetails, FoodNutrientRecord, FoodPortionRecord, FoodSearchHit,
};
use crate::ingredient::{Ingredient, NutrientEntry, Portion, Suggestion};
use crate::nutrient_keys::{resolve_key, KeySource};
use crate::units::{convert, normalize};

/// FDC's placeholder when a portion has no real measure unit.
const UNDETERMINED_UNIT: &str = "undetermined";

pub fn suggestion_from_hit(hit: FoodSearchHit) -> Suggestion {
    Suggestion {
        fdc_id: hit.fdc_id,
        description: title_case(&hit.description),
        category: hit.food_category.and_then(|c| c.into_name()),
        data_type: hit.data_type.unwrap_or_else(|| "Unknown".to_string()),
    }
}

/// Builds the uniform ingredient model from an FDC food record.
///
/// FDC reports nutrients per 100 g, so the serving starts as the 100 g
/// portion, which is also always the first available portion.
pub fn build_ingredient(details: FoodDetails) -> Ingredient {
    let mut portions = vec![Portion::hundred_grams()];
    portions.extend(details.food_portions.iter().filter_map(portion_from_record));

    let is_branded = details.data_type.as_deref() == Some("Branded");
    if let (true, Some(size), Some(unit)) = (
        is_branded,
        details.serving_size,
        details.serving_size_unit.as_deref(),
    ) {
        if let Some(portion) = branded_serving(size, unit) {
            portions.push(portion);
        }
    }

    Ingredient {
        fdc_id: details.fdc_id,
        description: details.description,
        category: details.food_category.and_then(|c| c.into_name()),
        data_type: details.data_type,
        serving: Portion::hundred_grams(),
        portions,
        nutrients: extract_nutrients(&details.food_nutrients),
    }
}

fn portion_from_record(record: &FoodPortionRecord) -> Option<Portion> {
    let grams = record.gram_weight.filter(|g| *g > 0.0)?;
    let amount = record.amount.unwrap_or(1.0);
    if amount <= 0.0 {
        return None;
    }

    let description = record
        .portion_description
        .clone()
        .or_else(|| record.modifier.clone())
        .filter(|d| !d.trim().is_empty());

    let unit = record
        .measure_unit
        .as_ref()
        .and_then(|m| m.abbreviation.as_deref().or(m.name.as_deref()))
        .map(first_token)
        .filter(|u| !u.is_empty() && u != UNDETERMINED_UNIT)
        .or_else(|| description.as_deref().map(unit_from_text))
        .filter(|u| !u.is_empty() && u != UNDETERMINED_UNIT)?;

    Some(Portion::new(&unit, amount, grams, description))
}

/// Branded labels give one serving as e.g. "240 ml"; only mass and volume
/// units that reach grams become a portion.
fn branded_serving(size: f64, unit: &str) -> Option<Portion> {
    if size <= 0.0 {
        return None;
    }
    let grams = convert(size, unit, "g").ok()?;
    Some(Portion::new(
        "serving",
        1.0,
        grams,
        Some(format!("{size} {}", normalize(unit))),
    ))
}

fn first_token(raw: &str) -> String {
    normalize(raw.split(',').next().unwrap_or_default())
}

/// "1 cup, chopped" -> "cup"
fn unit_from_text(text: &str) -> String {
    let head = text.split(',').next().unwrap_or_default().trim();
    let without_amount = head
        .split_once(char::is_whitespace)
        .filter(|(first, _)| first.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '/'))
        .map(|(_, rest)| rest)
        .unwrap_or(head);
    normalize(without_amount)
}

fn extract_nutrients(records: &[FoodNutrientRecord]) -> Vec<NutrientEntry> {
    let resolved: Vec<_> = records
        .iter()
        .filter_map(|record| {
            let info = record.nutrient.as_ref()?;
            let (key, source) = resolve_key(info.number.as_deref(), &info.name)?;
            Some((key, source, record, info))
        })
        .collect();

    // a name-derived key never shadows one the code table produced
    let coded: HashSet<&str> = resolved
        .iter()
        .filter(|(_, source, _, _)| *source == KeySource::Code)
        .map(|(key, _, _, _)| key.as_str())
        .collect();

    let mut seen = HashSet::new();
    let mut nutrients = Vec::new();
    for (key, source, record, info) in &resolved {
        if *source == KeySource::Name && coded.contains(key.as_str()) {
            continue;
        }
        if !seen.insert(key.clone()) {
            continue;
        }
        nutrients.push(NutrientEntry {
            key: key.clone(),
            name: info.name.clone(),
            value: record.amount.unwrap_or(0.0),
            unit: info.unit_name.to_lowercase(),
            min: record.min,
            max: record.max,
        });
    }
    nutrients
}

/// Capitalizes the first letter of every alphabetic run and lowercases the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_connection::endpoints::FoodCategory;
    use serde_json::json;

    fn pineapple_juice() -> FoodDetails {
        serde_json::from_value(json!({
            "fdcId": 169124,
            "description": "Pineapple juice, canned or bottled, unsweetened",
            "dataType": "SR Legacy",
            "foodCategory": { "description": "Fruits and Fruit Juices" },
            "foodNutrients": [
                { "nutrient": { "id": 1008, "number": "208", "name": "Energy", "unitName": "kcal" }, "amount": 53.0 },
                { "nutrient": { "id": 1062, "number": "268", "name": "Energy", "unitName": "kJ" }, "amount": 222.0 },
                { "nutrient": { "id": 1003, "number": "203", "name": "Protein", "unitName": "G" }, "amount": 0.36, "min": 0.3, "max": 0.4 },
                { "nutrient": { "id": 1093, "number": "307", "name": "Sodium, Na", "unitName": "MG" }, "amount": 2.0 },
                { "nutrient": { "id": 1104, "number": "318", "name": "Vitamin A, IU", "unitName": "IU" }, "amount": 5.0 },
                { "amount": 1.0 }
            ],
            "foodPortions": [
                { "amount": 1.0, "gramWeight": 250.0, "modifier": "cup", "measureUnit": { "name": "undetermined", "abbreviation": "undetermined" } },
                { "amount": 6.0, "gramWeight": 190.0, "modifier": "fl oz can", "measureUnit": { "name": "undetermined", "abbreviation": "undetermined" } },
                { "amount": 1.0, "gramWeight": 0.0, "modifier": "dash" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn builds_hundred_gram_serving_first() {
        let ing = build_ingredient(pineapple_juice());
        assert_eq!(ing.serving, Portion::hundred_grams());
        assert_eq!(ing.portions[0], Portion::hundred_grams());
        assert_eq!(ing.category.as_deref(), Some("Fruits and Fruit Juices"));
    }

    #[test]
    fn portions_fall_back_to_modifier_text() {
        let ing = build_ingredient(pineapple_juice());
        let units: Vec<&str> = ing.portions.iter().map(|p| p.unit.as_str()).collect();
        // "fl oz can" is not a synonym and stays free text; zero-gram portions are skipped
        assert_eq!(units, vec!["g", "cup", "fl oz can"]);
        assert_eq!(ing.portions[1].grams, 250.0);
    }

    #[test]
    fn nutrients_prefer_code_table_and_drop_shadowed_names() {
        let ing = build_ingredient(pineapple_juice());
        let keys: Vec<&str> = ing.nutrients.iter().map(|n| n.key.as_str()).collect();
        // the kJ energy row resolves by name to "energy" and is dropped
        assert_eq!(keys, vec!["energy", "protein", "sodium", "vitamin_a_iu"]);

        let protein = ing.nutrient("protein").unwrap();
        assert_eq!(protein.value, 0.36);
        assert_eq!(protein.unit, "g");
        assert_eq!(protein.min, Some(0.3));
        assert_eq!(protein.max, Some(0.4));
    }

    #[test]
    fn built_ingredient_rescales_through_its_portions() {
        let mut ing = build_ingredient(pineapple_juice());
        ing.rescale(2.0, "cups").unwrap();
        assert_eq!(ing.serving.grams, 500.0);
        assert_eq!(ing.nutrient("energy").unwrap().value, 265.0);
    }

    #[test]
    fn branded_foods_get_a_serving_portion() {
        let details: FoodDetails = serde_json::from_value(json!({
            "fdcId": 2_001_234,
            "description": "ORANGE JUICE",
            "dataType": "Branded",
            "foodCategory": "Fruit & Vegetable Juices",
            "servingSize": 240.0,
            "servingSizeUnit": "ml",
            "foodNutrients": []
        }))
        .unwrap();
        let ing = build_ingredient(details);
        let serving = ing.portions.iter().find(|p| p.unit == "serving").unwrap();
        assert_eq!(serving.grams, 240.0);
        assert_eq!(serving.description.as_deref(), Some("240 ml"));
        assert_eq!(ing.category.as_deref(), Some("Fruit & Vegetable Juices"));
    }

    #[test]
    fn suggestions_are_title_cased() {
        let hit = FoodSearchHit {
            fdc_id: 7,
            description: "CHEESE, cheddar, SHARP".to_string(),
            data_type: None,
            food_category: Some(FoodCategory::Name("Dairy".to_string())),
            brand_owner: None,
        };
        let suggestion = suggestion_from_hit(hit);
        assert_eq!(suggestion.description, "Cheese, Cheddar, Sharp");
        assert_eq!(suggestion.data_type, "Unknown");
        assert_eq!(suggestion.category.as_deref(), Some("Dairy"));
    }

    #[test]
    fn unit_from_text_strips_leading_amount() {
        assert_eq!(unit_from_text("1 cup, chopped"), "cup");
        assert_eq!(unit_from_text("1/2 Tablespoons"), "tbsp");
        assert_eq!(unit_from_text("large"), "large");
    }
}

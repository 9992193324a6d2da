use crate::errors::NutritionError;

use super::table::{CanonicalUnit, UNIT_SYNONYMS};

/// Rounds to 4 decimal places, the precision of every same-domain conversion.
pub fn round4(value: f64) -> f64 {
    (value * 1e4).round() / 1e4
}

/// Normalizes a free-text unit to its canonical spelling.
///
/// Unknown spellings come back trimmed and lowercased, so the function is
/// total and idempotent.
pub fn normalize(unit: &str) -> String {
    let lowered = unit.trim().to_lowercase();
    match UNIT_SYNONYMS.get(lowered.as_str()) {
        Some(canonical) => canonical.as_str().to_string(),
        None => lowered,
    }
}

/// Converts `amount` from `from_unit` to `to_unit`.
///
/// Same-domain conversions go through grams or milliliters and are rounded to
/// 4 decimals. Volume to grams (and grams to volume) uses the water-density
/// table and is left unrounded. No other mass unit takes part in a
/// cross-domain conversion.
///
/// # Errors
/// `InvalidAmount` for negative or NaN amounts, `UnsupportedConversion` when
/// no path exists between the two units.
pub fn convert(amount: f64, from_unit: &str, to_unit: &str) -> Result<f64, NutritionError> {
    if amount.is_nan() || amount < 0.0 {
        return Err(NutritionError::InvalidAmount(amount));
    }

    let from = normalize(from_unit);
    let to = normalize(to_unit);

    if from == to {
        return Ok(amount);
    }

    let unsupported = || NutritionError::UnsupportedConversion {
        from: from_unit.to_string(),
        to: to_unit.to_string(),
    };

    let (Some(f), Some(t)) = (
        CanonicalUnit::from_canonical(&from),
        CanonicalUnit::from_canonical(&to),
    ) else {
        return Err(unsupported());
    };

    if f.domain() == t.domain() {
        let base = amount * f.base_multiplier();
        return Ok(round4(base / t.base_multiplier()));
    }

    // domains differ from here on
    match (f, t) {
        (volume, CanonicalUnit::G) => volume
            .water_grams()
            .map(|grams| amount * grams)
            .ok_or_else(unsupported),
        (CanonicalUnit::G, volume) => volume
            .water_grams()
            .map(|grams| amount / grams)
            .ok_or_else(unsupported),
        _ => Err(unsupported()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::table::ALL_UNITS;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_normalize_synonyms() {
        assert_eq!(normalize("Grams"), "g");
        assert_eq!(normalize("  fluid ounces "), "fl_oz");
        assert_eq!(normalize("fl oz"), "fl_oz");
        assert_eq!(normalize("Gallons"), "gallon");
        assert_eq!(normalize("TBSP"), "tbsp");
    }

    #[test]
    fn test_normalize_unknown_passes_through_lowercased() {
        assert_eq!(normalize(" Slice "), "slice");
        assert_eq!(normalize("RACC"), "racc");
    }

    #[test]
    fn test_single_letter_spoon_abbreviations_are_not_guessed() {
        // "t" and "T" collide once lowercased, so neither is a synonym
        assert_eq!(normalize("t"), "t");
        assert_eq!(normalize("T"), "t");
        assert_eq!(
            convert(1.0, "T", "tsp"),
            Err(NutritionError::UnsupportedConversion {
                from: "T".to_string(),
                to: "tsp".to_string()
            })
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["Cups", "fl oz", "Pound", "LARGE", " medium ", "", "qt", "ml"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn test_documented_conversions() {
        assert_eq!(convert(100.0, "g", "oz").unwrap(), 3.5274);
        assert_eq!(convert(1.0, "cup", "tbsp").unwrap(), 16.0);
        assert_eq!(convert(0.5, "gallon", "cup").unwrap(), 8.0);
        assert_eq!(convert(1000.0, "mg", "g").unwrap(), 1.0);
        assert_eq!(convert(2.0, "tbsp", "tsp").unwrap(), 6.0);
        assert_eq!(convert(1.0, "gallon", "quart").unwrap(), 4.0);
        assert_eq!(convert(1.0, "kilograms", "Pounds").unwrap(), 2.2046);
    }

    #[test]
    fn test_identity_returns_amount_exactly() {
        assert_eq!(convert(1.0 / 3.0, "g", "g").unwrap(), 1.0 / 3.0);
        assert_eq!(convert(0.123456789, "Cups", "cup").unwrap(), 0.123456789);
        // unrecognized units still short-circuit
        assert_eq!(convert(3.3333333, "slice", "Slice").unwrap(), 3.3333333);
    }

    #[test]
    fn test_volume_to_grams_uses_water_density() {
        assert_eq!(convert(1.0, "cup", "g").unwrap(), 240.0);
        assert_eq!(convert(2.0, "tablespoons", "grams").unwrap(), 30.0);
        assert_eq!(convert(1.0, "fl oz", "g").unwrap(), 30.0);
        assert_eq!(convert(0.5, "l", "g").unwrap(), 500.0);
    }

    #[test]
    fn test_grams_to_volume_is_not_rounded() {
        let cups = convert(1.0, "g", "cup").unwrap();
        assert_eq!(cups, 1.0 / 240.0);
        assert_ne!(cups, round4(cups));
        assert_eq!(convert(240.0, "g", "cup").unwrap(), 1.0);
    }

    #[test]
    fn test_cross_domain_only_through_grams() {
        let err = convert(1.0, "Cup", "oz").unwrap_err();
        assert_eq!(
            err,
            NutritionError::UnsupportedConversion {
                from: "Cup".to_string(),
                to: "oz".to_string()
            }
        );
        assert!(convert(1.0, "kg", "ml").is_err());
        assert!(convert(1.0, "mg", "tsp").is_err());
    }

    #[test]
    fn test_unknown_units_are_unsupported() {
        let err = convert(1.0, "Large", "g").unwrap_err();
        assert_eq!(err.to_string(), "Cannot convert from 'Large' to 'g'.");
    }

    #[test]
    fn test_negative_amount_rejected() {
        assert_eq!(
            convert(-1.0, "g", "g").unwrap_err(),
            NutritionError::InvalidAmount(-1.0)
        );
        assert!(matches!(
            convert(f64::NAN, "g", "oz"),
            Err(NutritionError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_zero_amount_converts_to_zero() {
        assert_eq!(convert(0.0, "lb", "kg").unwrap(), 0.0);
        assert_eq!(convert(0.0, "cup", "g").unwrap(), 0.0);
    }

    #[test]
    fn test_same_domain_round_trip() {
        let amounts = [0.0, 1.0, 2.5, 12.0, 100.0, 750.0];
        for u1 in ALL_UNITS {
            for u2 in ALL_UNITS {
                if u1.domain() != u2.domain() {
                    continue;
                }
                // small ratios lose the round trip to 4-decimal rounding
                let ratio = u1.base_multiplier() / u2.base_multiplier();
                if ratio < 0.1 {
                    continue;
                }
                for a in amounts {
                    let there = convert(a, u1.as_str(), u2.as_str()).unwrap();
                    let back = convert(there, u2.as_str(), u1.as_str()).unwrap();
                    assert!(approx(back, a, 1e-3), "{a} {u1} -> {u2} -> {back}");
                }
            }
        }
    }
}

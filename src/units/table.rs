use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitDomain {
    /// Base unit: grams
    Mass,
    /// Base unit: milliliters
    Volume,
}

/// The fixed set of units the converter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalUnit {
    Mg,
    G,
    Kg,
    Oz,
    Lb,
    Ml,
    L,
    Tsp,
    Tbsp,
    FlOz,
    Cup,
    Pint,
    Quart,
    Gallon,
}

pub const ALL_UNITS: [CanonicalUnit; 14] = [
    CanonicalUnit::Mg,
    CanonicalUnit::G,
    CanonicalUnit::Kg,
    CanonicalUnit::Oz,
    CanonicalUnit::Lb,
    CanonicalUnit::Ml,
    CanonicalUnit::L,
    CanonicalUnit::Tsp,
    CanonicalUnit::Tbsp,
    CanonicalUnit::FlOz,
    CanonicalUnit::Cup,
    CanonicalUnit::Pint,
    CanonicalUnit::Quart,
    CanonicalUnit::Gallon,
];

impl CanonicalUnit {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mg => "mg",
            Self::G => "g",
            Self::Kg => "kg",
            Self::Oz => "oz",
            Self::Lb => "lb",
            Self::Ml => "ml",
            Self::L => "l",
            Self::Tsp => "tsp",
            Self::Tbsp => "tbsp",
            Self::FlOz => "fl_oz",
            Self::Cup => "cup",
            Self::Pint => "pint",
            Self::Quart => "quart",
            Self::Gallon => "gallon",
        }
    }

    pub const fn domain(self) -> UnitDomain {
        match self {
            Self::Mg | Self::G | Self::Kg | Self::Oz | Self::Lb => UnitDomain::Mass,
            _ => UnitDomain::Volume,
        }
    }

    /// Multiplier to the domain's base unit (grams or milliliters).
    ///
    /// Volume units are US customary, so 16 tbsp round to one cup and
    /// 16 cups to one gallon at the converter's 4-decimal precision.
    pub const fn base_multiplier(self) -> f64 {
        match self {
            Self::Mg => 1e-3,
            Self::G => 1.0,
            Self::Kg => 1e3,
            Self::Oz => 28.3495,
            Self::Lb => 453.59237,
            Self::Ml => 1.0,
            Self::L => 1e3,
            Self::Tsp => 4.92892,
            Self::Tbsp => 14.7868,
            Self::FlOz => 29.5735,
            Self::Cup => 236.5882,
            Self::Pint => 473.1765,
            Self::Quart => 946.3529,
            Self::Gallon => 3785.4118,
        }
    }

    /// Grams per unit under the water-density approximation.
    ///
    /// Only volume units have an entry. These figures are rounder than the
    /// milliliter multipliers above (a cup is 240 g here) and must stay that way.
    pub const fn water_grams(self) -> Option<f64> {
        match self {
            Self::Cup => Some(240.0),
            Self::Tbsp => Some(15.0),
            Self::Tsp => Some(5.0),
            Self::FlOz => Some(30.0),
            Self::Ml => Some(1.0),
            Self::L => Some(1000.0),
            Self::Pint => Some(473.0),
            Self::Quart => Some(946.0),
            Self::Gallon => Some(3785.0),
            _ => None,
        }
    }

    /// Looks up an already-normalized spelling.
    pub fn from_canonical(unit: &str) -> Option<Self> {
        ALL_UNITS.iter().copied().find(|u| u.as_str() == unit)
    }
}

impl fmt::Display for CanonicalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-text spelling (already trimmed and lowercased) to canonical unit.
pub static UNIT_SYNONYMS: LazyLock<HashMap<&'static str, CanonicalUnit>> = LazyLock::new(|| {
    use CanonicalUnit::*;

    let mut m = HashMap::new();
    for unit in ALL_UNITS {
        m.insert(unit.as_str(), unit);
    }

    // mass
    m.insert("milligram", Mg);
    m.insert("milligrams", Mg);
    m.insert("gram", G);
    m.insert("grams", G);
    m.insert("gm", G);
    m.insert("kilogram", Kg);
    m.insert("kilograms", Kg);
    m.insert("ounce", Oz);
    m.insert("ounces", Oz);
    m.insert("pound", Lb);
    m.insert("pounds", Lb);
    m.insert("lbs", Lb);

    // volume
    m.insert("milliliter", Ml);
    m.insert("milliliters", Ml);
    m.insert("millilitre", Ml);
    m.insert("millilitres", Ml);
    m.insert("liter", L);
    m.insert("liters", L);
    m.insert("litre", L);
    m.insert("litres", L);
    m.insert("teaspoon", Tsp);
    m.insert("teaspoons", Tsp);
    m.insert("tsps", Tsp);
    m.insert("tablespoon", Tbsp);
    m.insert("tablespoons", Tbsp);
    m.insert("tbs", Tbsp);
    m.insert("tbsps", Tbsp);
    m.insert("fl oz", FlOz);
    m.insert("floz", FlOz);
    m.insert("fl. oz", FlOz);
    m.insert("fluid ounce", FlOz);
    m.insert("fluid ounces", FlOz);
    m.insert("cups", Cup);
    m.insert("pints", Pint);
    m.insert("pt", Pint);
    m.insert("quarts", Quart);
    m.insert("qt", Quart);
    m.insert("gallons", Gallon);
    m.insert("gal", Gallon);

    m
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_canonical_unit_maps_to_itself() {
        for unit in ALL_UNITS {
            assert_eq!(UNIT_SYNONYMS.get(unit.as_str()), Some(&unit));
            assert_eq!(CanonicalUnit::from_canonical(unit.as_str()), Some(unit));
        }
    }

    #[test]
    fn synonyms_stay_in_their_domain() {
        assert_eq!(UNIT_SYNONYMS["fluid ounces"].domain(), UnitDomain::Volume);
        assert_eq!(UNIT_SYNONYMS["ounces"].domain(), UnitDomain::Mass);
        assert_eq!(UNIT_SYNONYMS["gal"], CanonicalUnit::Gallon);
    }

    #[test]
    fn only_volume_units_have_water_density() {
        for unit in ALL_UNITS {
            assert_eq!(
                unit.water_grams().is_some(),
                unit.domain() == UnitDomain::Volume,
                "{unit}"
            );
        }
    }
}

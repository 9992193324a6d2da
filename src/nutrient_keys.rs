use std::collections::HashMap;
use std::sync::LazyLock;

/// FDC nutrient number to friendly key.
pub static NUTRIENT_CODES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("208", "energy"),
        ("204", "fat"),
        ("203", "protein"),
        ("205", "carbs"),
        ("291", "fiber"),
        ("269", "sugars"),
        ("606", "sat_fat"),
        ("605", "trans_fat"),
        ("601", "cholesterol"),
        ("307", "sodium"),
        ("301", "calcium"),
        ("303", "iron"),
        ("306", "potassium"),
        ("328", "vitamin_d"),
    ])
});

/// Lowercased FDC nutrient names for records that arrive without a usable number.
static NUTRIENT_NAMES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("energy", "energy"),
        ("total lipid (fat)", "fat"),
        ("total fat", "fat"),
        ("protein", "protein"),
        ("carbohydrate, by difference", "carbs"),
        ("fiber, total dietary", "fiber"),
        ("sugars, total including nlea", "sugars"),
        ("total sugars", "sugars"),
        ("fatty acids, total saturated", "sat_fat"),
        ("fatty acids, total trans", "trans_fat"),
        ("cholesterol", "cholesterol"),
        ("sodium, na", "sodium"),
        ("calcium, ca", "calcium"),
        ("iron, fe", "iron"),
        ("potassium, k", "potassium"),
        ("vitamin d (d2 + d3)", "vitamin_d"),
    ])
});

/// How a nutrient key was derived; code-table keys take precedence over the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum KeySource {
    Code,
    Name,
}

/// Resolves the friendly key for an upstream nutrient.
///
/// The number is always tried first. Only when it is missing or not in the
/// code table do we look at the name, first through the known-name table and
/// then as a slug. Returns `None` when there is nothing to key on.
pub fn resolve_key(number: Option<&str>, name: &str) -> Option<(String, KeySource)> {
    if let Some(key) = number.and_then(|n| NUTRIENT_CODES.get(n.trim())) {
        return Some((key.to_string(), KeySource::Code));
    }

    let lowered = name.trim().to_lowercase();
    if let Some(key) = NUTRIENT_NAMES.get(lowered.as_str()) {
        return Some((key.to_string(), KeySource::Name));
    }

    let slug = slugify(&lowered);
    if slug.is_empty() {
        None
    } else {
        Some((slug, KeySource::Name))
    }
}

/// Lowercases and collapses every run of non-alphanumerics into one `_`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}

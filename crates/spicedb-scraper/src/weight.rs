//! Gram quantities from free-text tokens and structured weight fields.
//!
//! Two entry points with deliberately different unit handling:
//! - [`WeightParser::parse_token`] scans text for `<number><unit>` and strips
//!   a trailing period from the matched unit before looking it up.
//! - [`WeightParser::convert`] looks the unit up exactly as given (lowercased
//!   only). A structured unit such as `"pounds"` or `"lbs "` does not convert
//!   and yields `None`.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

pub const GRAMS_PER_OUNCE: f64 = 28.3495;
pub const GRAMS_PER_POUND: f64 = 453.592;

static INLINE_WEIGHT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?P<val>[0-9]+(?:\.[0-9]+)?)\s*(?P<unit>oz|ounce|ounces|lb\.?|lbs\.?|pound|kg|kilogram|g|gram)s?",
    )
    .expect("valid regex")
});

/// Grams-per-unit lookup, keyed by lowercase unit spelling.
#[derive(Debug, Clone)]
pub struct UnitTable {
    grams_per_unit: HashMap<String, f64>,
}

impl Default for UnitTable {
    fn default() -> Self {
        Self::new([
            ("g", 1.0),
            ("gram", 1.0),
            ("grams", 1.0),
            ("kg", 1000.0),
            ("kilogram", 1000.0),
            ("oz", GRAMS_PER_OUNCE),
            ("ounce", GRAMS_PER_OUNCE),
            ("ounces", GRAMS_PER_OUNCE),
            ("lb", GRAMS_PER_POUND),
            ("lb.", GRAMS_PER_POUND),
            ("lbs", GRAMS_PER_POUND),
            ("lbs.", GRAMS_PER_POUND),
            ("pound", GRAMS_PER_POUND),
        ])
    }
}

impl UnitTable {
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        let grams_per_unit = entries
            .into_iter()
            .map(|(unit, factor)| (unit.to_lowercase(), factor))
            .collect();
        Self { grams_per_unit }
    }

    /// Exact lookup of an already-lowercased unit.
    #[must_use]
    pub fn factor(&self, unit: &str) -> Option<f64> {
        self.grams_per_unit.get(unit).copied()
    }

    #[cfg(test)]
    pub(crate) fn units(&self) -> impl Iterator<Item = &str> {
        self.grams_per_unit.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default)]
pub struct WeightParser {
    units: UnitTable,
}

impl WeightParser {
    #[must_use]
    pub fn new(units: UnitTable) -> Self {
        Self { units }
    }

    #[cfg(test)]
    pub(crate) fn units(&self) -> &UnitTable {
        &self.units
    }

    /// Parses the first `<number><optional space><unit>` in `text` into grams,
    /// rounded to 3 decimals.
    ///
    /// `"2 oz"` → `56.699`, `"1.5lbs."` → `680.388`, `"Ground"` → `None`.
    /// There is no word boundary check, so `"12 good"` reads as 12 g.
    #[must_use]
    pub fn parse_token(&self, text: &str) -> Option<f64> {
        let caps = INLINE_WEIGHT_RE.captures(text)?;
        let value = caps.name("val")?.as_str().parse::<f64>().ok()?;
        let unit = caps.name("unit")?.as_str().to_lowercase();
        let factor = self.units.factor(unit.trim_end_matches('.'))?;
        Some(round_grams(value * factor))
    }

    /// Converts a structured `value` + `unit` pair into grams.
    ///
    /// The unit is lowercased and then looked up verbatim.
    #[must_use]
    pub fn convert(&self, value: f64, unit: &str) -> Option<f64> {
        let factor = self.units.factor(&unit.to_lowercase())?;
        Some(round_grams(value * factor))
    }
}

/// Rounds a gram quantity to 3 decimal places.
#[must_use]
pub fn round_grams(grams: f64) -> f64 {
    (grams * 1000.0).round() / 1000.0
}

use serde::{Deserialize, Serialize};

/// Name terms that mark a listing as a multi-item bundle or a blend rather
/// than a single spice.
pub const DEFAULT_EXCLUDE_TERMS: &[&str] = &[
    "blend",
    "seasoning",
    "mix",
    "rub",
    "box",
    "bundle",
    "gift",
    "set",
    "kit",
];

/// Where a row's `net_weight_g` came from, highest confidence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightSource {
    /// The vendor's structured `grams` field.
    Grams,
    /// The vendor's structured `weight` + `weight_unit` pair.
    WeightField,
    /// An inline quantity in the variant title, e.g. `"2 oz"`.
    Title,
    /// A `(74g)` annotation from the product page, matched to the variant by
    /// position. Heuristic: may be misaligned.
    PageAnnotation,
}

impl WeightSource {
    /// `true` for weights derived by the positional page-annotation heuristic.
    #[must_use]
    pub fn is_low_confidence(self) -> bool {
        matches!(self, WeightSource::PageAnnotation)
    }
}

/// One purchasable variant of a spice product, normalized across vendors.
///
/// Serialized field order is the CSV column order:
/// `name,form,size_label,net_weight_g,price_usd,in_stock,url,vendor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    /// Product display title, e.g. `"Cumin Seed"`.
    pub name: String,
    /// Preparation state, e.g. `"Ground"` or `"Whole"`.
    pub form: Option<String>,
    /// Vendor size name that is not itself a weight, e.g. `"Small"` or `"Jar"`.
    pub size_label: Option<String>,
    /// Net weight in grams, absent when no source provided one.
    pub net_weight_g: Option<f64>,
    pub price_usd: Option<f64>,
    pub in_stock: bool,
    pub url: String,
    /// Vendor slug, set when the row is attributed to a vendor.
    pub vendor: Option<String>,
    /// Not part of the exported table.
    #[serde(skip)]
    pub weight_source: Option<WeightSource>,
}

impl NormalizedRow {
    /// Returns the row tagged with `vendor`.
    #[must_use]
    pub fn with_vendor(mut self, vendor: &str) -> Self {
        self.vendor = Some(vendor.to_owned());
        self
    }

    /// `true` when the weight came from the positional page-annotation fallback.
    #[must_use]
    pub fn has_low_confidence_weight(&self) -> bool {
        self.weight_source
            .is_some_and(WeightSource::is_low_confidence)
    }
}

/// Drops rows whose product name contains any configured term.
///
/// Matching is a case-insensitive substring test, so `"set"` also drops
/// `"Sunset Pepper"`; the terms are meant to be coarse.
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    terms: Vec<String>,
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDE_TERMS.iter().copied())
    }
}

impl ExclusionFilter {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { terms }
    }

    #[must_use]
    pub fn is_excluded(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.terms.iter().any(|t| lower.contains(t.as_str()))
    }

    /// Returns the rows that survive the filter, preserving order.
    #[must_use]
    pub fn apply(&self, rows: Vec<NormalizedRow>) -> Vec<NormalizedRow> {
        rows.into_iter()
            .filter(|r| !self.is_excluded(&r.name))
            .collect()
    }
}

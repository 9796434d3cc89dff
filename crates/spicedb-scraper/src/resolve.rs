//! Net-weight resolution across the sources a vendor may provide.
//!
//! Priority, first present value wins:
//! 1. structured `grams` (nonzero)
//! 2. structured `weight` + `weight_unit`, when the unit converts
//! 3. an inline quantity in the variant title
//! 4. the product page's `(NNg)` annotations, matched to size labels by
//!    position
//!
//! Step 4 is a heuristic. It assumes size labels first appear in the same
//! order as ascending weight, and silently drops whichever side is longer.
//! Weights from it are tagged [`WeightSource::PageAnnotation`].

use std::sync::LazyLock;

use regex::Regex;
use spicedb_core::WeightSource;

use crate::classify::ClassifiedVariant;
use crate::types::RawVariant;
use crate::weight::WeightParser;

static PAGE_WEIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([0-9]+)\s*g\)").expect("valid regex"));

/// Distinct gram values found on a product page, ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageWeightSet {
    grams: Vec<f64>,
}

impl PageWeightSet {
    /// Extracts every `(74g)` / `(74 g)` annotation from raw page text.
    #[must_use]
    pub fn from_html(html: &str) -> Self {
        Self::from_grams(
            PAGE_WEIGHT_RE
                .captures_iter(html)
                .filter_map(|c| c.get(1)?.as_str().parse::<f64>().ok()),
        )
    }

    /// Sorts ascending and removes duplicates.
    pub fn from_grams(grams: impl IntoIterator<Item = f64>) -> Self {
        let mut grams: Vec<f64> = grams.into_iter().filter(|g| g.is_finite()).collect();
        grams.sort_by(f64::total_cmp);
        grams.dedup();
        Self { grams }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grams.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.grams
    }
}

/// Size label → grams, built once per product from its page weights.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelWeightMap {
    entries: Vec<(String, f64)>,
}

impl LabelWeightMap {
    /// Zips the distinct `labels` (first-appearance order) against the
    /// ascending page weights. The shorter side decides the length.
    pub fn zip<'a>(labels: impl IntoIterator<Item = &'a str>, weights: &PageWeightSet) -> Self {
        let mut distinct: Vec<&str> = Vec::new();
        for label in labels {
            if !distinct.contains(&label) {
                distinct.push(label);
            }
        }

        let entries = distinct
            .into_iter()
            .zip(weights.as_slice().iter().copied())
            .map(|(label, grams)| (label.to_owned(), grams))
            .collect();
        Self { entries }
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, g)| *g)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// A resolved net weight and the source it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedWeight {
    pub grams: f64,
    pub source: WeightSource,
}

/// Picks the best available net weight for one variant.
#[must_use]
pub fn resolve_weight(
    parser: &WeightParser,
    raw: &RawVariant,
    classified: &ClassifiedVariant,
    labels: &LabelWeightMap,
) -> Option<ResolvedWeight> {
    let found = |grams: f64, source: WeightSource| ResolvedWeight { grams, source };

    if let Some(grams) = raw.grams.filter(|g| g.is_finite() && *g != 0.0) {
        return Some(found(grams, WeightSource::Grams));
    }

    if let (Some(weight), Some(unit)) = (
        raw.weight.filter(|w| w.is_finite() && *w != 0.0),
        &raw.weight_unit,
    ) {
        if let Some(grams) = parser.convert(weight, unit) {
            return Some(found(grams, WeightSource::WeightField));
        }
    }

    if let Some(grams) = classified.weight_from_title {
        return Some(found(grams, WeightSource::Title));
    }

    classified
        .size_label
        .as_deref()
        .and_then(|label| labels.get(label))
        .map(|grams| found(grams, WeightSource::PageAnnotation))
}

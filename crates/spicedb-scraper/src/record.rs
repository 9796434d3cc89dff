//! Normalization from vendor [`RawProduct`]s to [`spicedb_core::NormalizedRow`]s.
//!
//! Title tokenizing lives in [`crate::classify`] and weight selection in
//! [`crate::resolve`]; this module sequences them per variant. Nothing here
//! fails: a field that cannot be derived is left as `None`.

use spicedb_core::{NormalizedRow, PriceUnit};

use crate::classify::TokenClassifier;
use crate::resolve::{resolve_weight, LabelWeightMap, PageWeightSet};
use crate::types::{RawProduct, RawVariant};

/// Builds normalized rows with an injected classifier (and through it, the
/// unit table and form vocabulary).
#[derive(Debug, Clone, Default)]
pub struct VariantNormalizer {
    classifier: TokenClassifier,
}

impl VariantNormalizer {
    #[must_use]
    pub fn new(classifier: TokenClassifier) -> Self {
        Self { classifier }
    }

    /// Builds the per-product size-label → grams fallback.
    ///
    /// Empty unless page weights were collected.
    #[must_use]
    pub fn label_map(
        &self,
        variants: &[RawVariant],
        page_weights: Option<&PageWeightSet>,
    ) -> LabelWeightMap {
        let Some(weights) = page_weights.filter(|w| !w.is_empty()) else {
            return LabelWeightMap::default();
        };

        let labels: Vec<String> = variants
            .iter()
            .filter_map(|v| self.classifier.classify_title(&v.title).size_label)
            .collect();
        LabelWeightMap::zip(labels.iter().map(String::as_str), weights)
    }

    /// Builds one row from one raw variant.
    #[must_use]
    pub fn build(
        &self,
        raw: &RawVariant,
        product_name: &str,
        product_url: &str,
        labels: &LabelWeightMap,
        price_unit: PriceUnit,
    ) -> NormalizedRow {
        let classified = self.classifier.classify_title(&raw.title);
        let resolved = resolve_weight(self.classifier.weights(), raw, &classified, labels);

        if let Some(w) = resolved.filter(|w| w.source.is_low_confidence()) {
            tracing::debug!(
                product = product_name,
                size_label = classified.size_label.as_deref().unwrap_or(""),
                grams = w.grams,
                "net weight taken from page annotation by position"
            );
        }

        NormalizedRow {
            name: product_name.to_owned(),
            form: classified.form,
            size_label: classified.size_label,
            net_weight_g: resolved.map(|w| w.grams),
            price_usd: raw.price.map(|p| price_unit.to_usd(p)),
            in_stock: raw.available.unwrap_or(true),
            url: product_url.to_owned(),
            vendor: None,
            weight_source: resolved.map(|w| w.source),
        }
    }

    /// Builds one row per variant, in variant order.
    #[must_use]
    pub fn normalize_product(&self, product: &RawProduct, price_unit: PriceUnit) -> Vec<NormalizedRow> {
        let labels = self.label_map(&product.variants, product.page_weights.as_ref());
        product
            .variants
            .iter()
            .map(|v| self.build(v, &product.name, &product.url, &labels, price_unit))
            .collect()
    }
}

#[cfg(test)]
#[path = "record_test.rs"]
mod tests;

use spicedb_core::WeightSource;

use super::*;

const URL: &str = "https://worldspice.com/products/cumin";

fn make_product(variants: Vec<RawVariant>, page_weights: Option<Vec<f64>>) -> RawProduct {
    RawProduct {
        name: "Cumin".to_owned(),
        url: URL.to_owned(),
        variants,
        page_weights: page_weights.map(PageWeightSet::from_grams),
    }
}

fn assert_grams(row: &NormalizedRow, expected: f64) {
    let got = row
        .net_weight_g
        .unwrap_or_else(|| panic!("expected {expected}g, got None for {row:?}"));
    assert!((got - expected).abs() < 1e-9, "expected {expected}, got {got}");
}

// -----------------------------------------------------------------------
// weight resolution through the builder
// -----------------------------------------------------------------------

#[test]
fn json_grams_beat_title_weight() {
    let raw = RawVariant {
        grams: Some(100.0),
        price: Some(549.0),
        ..RawVariant::titled("8 oz / Ground")
    };
    let row = VariantNormalizer::default().build(
        &raw,
        "Cumin",
        URL,
        &LabelWeightMap::default(),
        PriceUnit::Cents,
    );
    assert_grams(&row, 100.0);
    assert_eq!(row.weight_source, Some(WeightSource::Grams));
    assert_eq!(row.form.as_deref(), Some("Ground"));
}

#[test]
fn title_weight_used_when_no_structured_fields() {
    let raw = RawVariant::titled("2 oz / Ground");
    let row = VariantNormalizer::default().build(
        &raw,
        "Cumin",
        URL,
        &LabelWeightMap::default(),
        PriceUnit::Cents,
    );
    assert_grams(&row, 56.699);
    assert_eq!(row.form.as_deref(), Some("Ground"));
    assert!(row.size_label.is_none());
    assert_eq!(row.weight_source, Some(WeightSource::Title));
}

#[test]
fn unsplit_title_with_weight_and_form_parses_weight() {
    // No separator: the whole title is one token, consumed by the weight.
    let row = VariantNormalizer::default().build(
        &RawVariant::titled("2 oz Ground"),
        "Cumin",
        URL,
        &LabelWeightMap::default(),
        PriceUnit::Dollars,
    );
    assert_grams(&row, 56.699);
    assert!(row.form.is_none());
    assert!(row.size_label.is_none());
}

#[test]
fn page_weights_map_to_size_labels_by_position() {
    let product = make_product(
        vec![RawVariant::titled("Small"), RawVariant::titled("Large")],
        Some(vec![112.0, 28.0]),
    );
    let rows = VariantNormalizer::default().normalize_product(&product, PriceUnit::Cents);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].size_label.as_deref(), Some("Small"));
    assert_grams(&rows[0], 28.0);
    assert_eq!(rows[1].size_label.as_deref(), Some("Large"));
    assert_grams(&rows[1], 112.0);
    assert!(rows.iter().all(NormalizedRow::has_low_confidence_weight));
}

#[test]
fn label_map_uses_distinct_labels_across_forms() {
    let product = make_product(
        vec![
            RawVariant::titled("Small / Ground"),
            RawVariant::titled("Small / Whole"),
            RawVariant::titled("Large / Ground"),
        ],
        Some(vec![74.0, 224.0]),
    );
    let rows = VariantNormalizer::default().normalize_product(&product, PriceUnit::Cents);
    assert_grams(&rows[0], 74.0);
    assert_grams(&rows[1], 74.0);
    assert_grams(&rows[2], 224.0);
    assert_eq!(rows[1].form.as_deref(), Some("Whole"));
}

#[test]
fn structured_weight_beats_page_annotation() {
    let product = make_product(
        vec![
            RawVariant {
                weight: Some(2.0),
                weight_unit: Some("oz".to_owned()),
                ..RawVariant::titled("Small")
            },
            RawVariant::titled("Large"),
        ],
        Some(vec![28.0, 112.0]),
    );
    let rows = VariantNormalizer::default().normalize_product(&product, PriceUnit::Cents);
    assert_grams(&rows[0], 56.699);
    assert_eq!(rows[0].weight_source, Some(WeightSource::WeightField));
    assert_grams(&rows[1], 112.0);
}

#[test]
fn no_weight_source_leaves_weight_absent() {
    let product = make_product(vec![RawVariant::titled("Jar")], None);
    let rows = VariantNormalizer::default().normalize_product(&product, PriceUnit::Cents);
    assert_eq!(rows.len(), 1);
    assert!(rows[0].net_weight_g.is_none());
    assert!(rows[0].weight_source.is_none());
    assert_eq!(rows[0].size_label.as_deref(), Some("Jar"));
}

#[test]
fn empty_page_weights_build_no_label_map() {
    let normalizer = VariantNormalizer::default();
    let variants = vec![RawVariant::titled("Small")];
    let empty = PageWeightSet::default();
    assert!(normalizer.label_map(&variants, Some(&empty)).is_empty());
    assert!(normalizer.label_map(&variants, None).is_empty());
}

// -----------------------------------------------------------------------
// price, stock, and totality
// -----------------------------------------------------------------------

#[test]
fn cents_price_is_divided() {
    let raw = RawVariant {
        price: Some(1299.0),
        ..RawVariant::titled("Large")
    };
    let row = VariantNormalizer::default().build(
        &raw,
        "Cumin",
        URL,
        &LabelWeightMap::default(),
        PriceUnit::Cents,
    );
    assert!((row.price_usd.unwrap() - 12.99).abs() < 1e-9);
}

#[test]
fn dollar_price_passes_through() {
    let raw = RawVariant {
        price: Some(5.49),
        ..RawVariant::titled("Large")
    };
    let row = VariantNormalizer::default().build(
        &raw,
        "Cumin",
        URL,
        &LabelWeightMap::default(),
        PriceUnit::Dollars,
    );
    assert!((row.price_usd.unwrap() - 5.49).abs() < 1e-9);
}

#[test]
fn stock_defaults_to_true_and_passes_false_through() {
    let normalizer = VariantNormalizer::default();
    let labels = LabelWeightMap::default();
    let unknown = normalizer.build(
        &RawVariant::titled("Small"),
        "Cumin",
        URL,
        &labels,
        PriceUnit::Cents,
    );
    assert!(unknown.in_stock);

    let sold_out = RawVariant {
        available: Some(false),
        ..RawVariant::titled("Small")
    };
    let row = normalizer.build(&sold_out, "Cumin", URL, &labels, PriceUnit::Cents);
    assert!(!row.in_stock);
}

#[test]
fn empty_raw_variant_still_builds_a_row() {
    let row = VariantNormalizer::default().build(
        &RawVariant::default(),
        "Cumin",
        URL,
        &LabelWeightMap::default(),
        PriceUnit::Cents,
    );
    assert_eq!(row.name, "Cumin");
    assert_eq!(row.url, URL);
    assert!(row.form.is_none());
    assert!(row.size_label.is_none());
    assert!(row.net_weight_g.is_none());
    assert!(row.price_usd.is_none());
    assert!(row.in_stock);
    assert!(row.vendor.is_none());
}

#[test]
fn product_without_variants_yields_no_rows() {
    let product = make_product(vec![], Some(vec![28.0]));
    assert!(VariantNormalizer::default()
        .normalize_product(&product, PriceUnit::Cents)
        .is_empty());
}

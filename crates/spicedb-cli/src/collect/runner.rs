//! Sequential per-vendor collection loop.

use spicedb_core::{NormalizedRow, VendorConfig};
use spicedb_scraper::{scrape_vendor, PoliteClient, VariantNormalizer};

/// Rows gathered across vendors, plus per-vendor bookkeeping for reporting.
#[derive(Debug, Default)]
pub(crate) struct CollectSummary {
    pub rows: Vec<NormalizedRow>,
    /// `(slug, row count)` for every vendor that finished, in run order.
    pub per_vendor: Vec<(String, usize)>,
    /// Slugs of vendors whose scrape returned an error.
    pub failed: Vec<String>,
}

/// Scrapes `vendors` one after another.
///
/// A vendor that fails is logged at `error` and contributes nothing; the
/// loop moves on to the next one.
pub(crate) async fn collect_all(
    client: &PoliteClient,
    normalizer: &VariantNormalizer,
    vendors: &[&VendorConfig],
    limit: Option<usize>,
) -> CollectSummary {
    let mut summary = CollectSummary::default();

    for vendor in vendors {
        let slug = vendor.slug();
        tracing::info!(vendor = %slug, kind = %vendor.kind, "collecting vendor");

        match scrape_vendor(client, normalizer, vendor, limit).await {
            Ok(rows) => {
                let low_confidence = rows.iter().filter(|r| r.has_low_confidence_weight()).count();
                tracing::info!(
                    vendor = %slug,
                    rows = rows.len(),
                    low_confidence,
                    "collected {} variant rows",
                    rows.len()
                );
                summary.per_vendor.push((slug, rows.len()));
                summary.rows.extend(rows);
            }
            Err(e) => {
                tracing::error!(vendor = %slug, error = %e, "vendor scrape failed");
                summary.failed.push(slug);
            }
        }
    }

    summary
}

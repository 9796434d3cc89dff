//! Per-platform adapters that turn a storefront into normalized rows.
//!
//! Adapters only translate pages into [`crate::types::RawProduct`]s; every
//! row goes through the shared [`VariantNormalizer`].

pub mod penzeys;
pub mod shopify;

use spicedb_core::{NormalizedRow, VendorConfig, VendorKind};

use crate::client::PoliteClient;
use crate::error::ScraperError;
use crate::record::VariantNormalizer;

/// Scrapes one vendor and tags every row with the vendor's slug.
///
/// `limit` caps the number of products visited; `None` visits all of them.
///
/// # Errors
///
/// Returns whatever the platform adapter could not recover from. Rows
/// gathered before the failure are discarded.
pub async fn scrape_vendor(
    client: &PoliteClient,
    normalizer: &VariantNormalizer,
    vendor: &VendorConfig,
    limit: Option<usize>,
) -> Result<Vec<NormalizedRow>, ScraperError> {
    let rows = match vendor.kind {
        VendorKind::Shopify => shopify::scrape(client, normalizer, vendor, limit).await?,
        VendorKind::Penzeys => penzeys::scrape(client, normalizer, vendor, limit).await?,
    };

    let slug = vendor.slug();
    Ok(rows.into_iter().map(|r| r.with_vendor(&slug)).collect())
}

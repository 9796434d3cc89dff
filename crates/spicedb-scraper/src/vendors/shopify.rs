//! Shopify storefronts: collection pages for discovery, `{product}.js` for
//! variant data.

use scraper::Html;
use spicedb_core::{NormalizedRow, VendorConfig};

use crate::client::PoliteClient;
use crate::error::ScraperError;
use crate::html;
use crate::pagination::{listing_page_url, LinkFrontier, MAX_PAGES};
use crate::record::VariantNormalizer;
use crate::resolve::PageWeightSet;
use crate::types::{RawProduct, ShopifyProductJs};

const PRODUCT_LINK_SELECTOR: &str = r#"a[href^="/products/"]"#;

/// Walks `vendor`'s collection and normalizes up to `limit` products.
///
/// A product whose `.js` fetch fails is logged and skipped.
///
/// # Errors
///
/// Returns the first listing-page failure, or
/// [`ScraperError::PaginationLimit`] when the collection never stops
/// producing new links.
pub async fn scrape(
    client: &PoliteClient,
    normalizer: &VariantNormalizer,
    vendor: &VendorConfig,
    limit: Option<usize>,
) -> Result<Vec<NormalizedRow>, ScraperError> {
    let links = discover_products(client, vendor, limit).await?;
    tracing::debug!(vendor = %vendor.name, products = links.len(), "collection walk finished");

    let mut rows = Vec::new();
    for url in links {
        match fetch_product(client, &url, vendor.page_weights).await {
            Ok(product) => rows.extend(normalizer.normalize_product(&product, vendor.price_unit)),
            Err(e) => {
                tracing::warn!(vendor = %vendor.name, url = %url, error = %e, "skipping product");
            }
        }
    }
    Ok(rows)
}

/// Collects product URLs from `?page=1, 2, …` until a page adds nothing new
/// or `limit` links are known.
///
/// # Errors
///
/// See [`scrape`].
pub async fn discover_products(
    client: &PoliteClient,
    vendor: &VendorConfig,
    limit: Option<usize>,
) -> Result<Vec<String>, ScraperError> {
    let base = vendor.base();
    let path = vendor.collection_path();
    let mut frontier = LinkFrontier::new();

    for page in 1..=MAX_PAGES {
        if frontier.reached(limit) {
            return Ok(frontier.into_links(limit));
        }
        let url = listing_page_url(base, path, page);
        let body = client.get_text(&url).await?;
        let found = collection_links(&body, base)?;
        if frontier.admit(found) == 0 {
            return Ok(frontier.into_links(limit));
        }
    }

    if frontier.reached(limit) {
        return Ok(frontier.into_links(limit));
    }
    Err(ScraperError::PaginationLimit {
        url: listing_page_url(base, path, 1),
        max_pages: MAX_PAGES,
    })
}

/// Absolute product URLs linked from one collection page, query stripped.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] when `base` is not an absolute URL.
pub fn collection_links(body: &str, base: &str) -> Result<Vec<String>, ScraperError> {
    let document = Html::parse_document(body);
    html::hrefs(&document, PRODUCT_LINK_SELECTOR)?
        .iter()
        .map(|href| html::absolute_link(base, href))
        .collect()
}

/// Fetches `{url}.js` and, when `with_page_weights` is set, the product page
/// itself for its `(NNg)` annotations.
///
/// A failed page fetch only loses the page weights.
///
/// # Errors
///
/// Propagates any failure fetching or decoding the `.js` payload.
pub async fn fetch_product(
    client: &PoliteClient,
    url: &str,
    with_page_weights: bool,
) -> Result<RawProduct, ScraperError> {
    let js_url = format!("{}.js", url.trim_end_matches('/'));
    let data: ShopifyProductJs = client.get_json(&js_url).await?;

    let page_weights = if with_page_weights {
        match client.get_text(url).await {
            Ok(body) => Some(PageWeightSet::from_html(&body)),
            Err(e) => {
                tracing::warn!(url, error = %e, "product page unavailable, no page weights");
                None
            }
        }
    } else {
        None
    };

    Ok(RawProduct {
        name: data.title,
        url: url.to_owned(),
        variants: data.variants.into_iter().map(Into::into).collect(),
        page_weights,
    })
}

//! Penzeys-style catalogs: an alphabetical spice index and server-rendered
//! product pages whose size options carry their price as `$N.NN` text.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;
use spicedb_core::{NormalizedRow, VendorConfig};

use crate::client::PoliteClient;
use crate::error::ScraperError;
use crate::html;
use crate::pagination::{strip_query, LinkFrontier};
use crate::record::VariantNormalizer;
use crate::types::{RawProduct, RawVariant};

const INDEX_PATH: &str = "/shop/spices/";
const PRODUCT_LINK_SELECTOR: &str = r#"a[href*="/shop/spices/"]"#;
const OPTION_SELECTOR: &str = "select#size option, div.product-variant, div#variant-select option";
const PAGE_PRICE_SELECTOR: &str = "span#price, span.price, div.price";
const UNKNOWN_NAME: &str = "Unknown";

static DOLLAR_PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([0-9.]+)").expect("valid regex"));

/// Walks the A–Z index and normalizes up to `limit` products.
///
/// Index pages and product pages that fail to load are logged and skipped.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] when the vendor's base URL cannot be
/// joined with the index links.
pub async fn scrape(
    client: &PoliteClient,
    normalizer: &VariantNormalizer,
    vendor: &VendorConfig,
    limit: Option<usize>,
) -> Result<Vec<NormalizedRow>, ScraperError> {
    let base = vendor.base();
    let mut frontier = LinkFrontier::new();
    let mut rows = Vec::new();

    for letter in 'A'..='Z' {
        if frontier.reached(limit) {
            break;
        }
        let index_url = format!("{base}{INDEX_PATH}?letter={letter}");
        let body = match client.get_text(&index_url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(vendor = %vendor.name, url = %index_url, error = %e, "skipping index page");
                continue;
            }
        };

        for link in index_links(&body, base)? {
            if frontier.reached(limit) {
                break;
            }
            if frontier.admit([link.as_str()]) == 0 {
                continue;
            }
            match client.get_text(&link).await {
                Ok(page) => {
                    let product = parse_product_page(&page, &link)?;
                    rows.extend(normalizer.normalize_product(&product, vendor.price_unit));
                }
                Err(e) => {
                    tracing::warn!(vendor = %vendor.name, url = %link, error = %e, "skipping product");
                }
            }
        }
    }

    Ok(rows)
}

/// Product URLs linked from one index page, in document order.
///
/// Links back to the index itself (any `?letter=` variant) are dropped.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] when `base` is not an absolute URL.
pub fn index_links(body: &str, base: &str) -> Result<Vec<String>, ScraperError> {
    let document = Html::parse_document(body);
    let mut links = Vec::new();
    for href in html::hrefs(&document, PRODUCT_LINK_SELECTOR)? {
        let link = html::absolute_link(base, &href)?;
        if !is_index_link(&link) {
            links.push(link);
        }
    }
    Ok(links)
}

fn is_index_link(link: &str) -> bool {
    let path = reqwest::Url::parse(link).map_or_else(
        |_| strip_query(link).to_owned(),
        |u| u.path().to_owned(),
    );
    path.trim_end_matches('/') == INDEX_PATH.trim_end_matches('/')
}

/// Reads the product name and one raw variant per size option.
///
/// Each option's text supplies a dollar price and, with the price removed,
/// the variant title. A page without options becomes a single untitled
/// variant priced from the page's price element.
///
/// # Errors
///
/// Only fails on an invalid built-in selector.
pub fn parse_product_page(body: &str, url: &str) -> Result<RawProduct, ScraperError> {
    let document = Html::parse_document(body);
    let name = html::first_text(&document, "h1")?
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| UNKNOWN_NAME.to_owned());

    let option_sel = html::selector(OPTION_SELECTOR)?;
    let mut variants: Vec<RawVariant> = document
        .select(&option_sel)
        .map(|el| option_variant(&html::element_text(el)))
        .collect();

    if variants.is_empty() {
        let price = html::first_text(&document, PAGE_PRICE_SELECTOR)?
            .and_then(|t| t.replace('$', "").trim().parse::<f64>().ok());
        variants.push(RawVariant {
            price,
            ..RawVariant::default()
        });
    }

    Ok(RawProduct {
        name,
        url: url.to_owned(),
        variants,
        page_weights: None,
    })
}

/// `"2 oz. Bag $5.49"` → title `"2 oz. Bag"`, price `5.49`.
fn option_variant(text: &str) -> RawVariant {
    let price = DOLLAR_PRICE_RE
        .captures(text)
        .and_then(|c| c.get(1)?.as_str().parse::<f64>().ok());
    let title = DOLLAR_PRICE_RE
        .replace_all(text, "")
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '|' | ','))
        .to_owned();
    RawVariant {
        title,
        price,
        ..RawVariant::default()
    }
}

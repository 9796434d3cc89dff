//! Small helpers over the `scraper` crate for storefront HTML.

use scraper::{ElementRef, Html, Selector};

use crate::error::ScraperError;
use crate::pagination::strip_query;

/// Parses a CSS selector, mapping the parser's error into [`ScraperError`].
///
/// # Errors
///
/// Returns [`ScraperError::Selector`] when `css` is not a valid selector.
pub fn selector(css: &str) -> Result<Selector, ScraperError> {
    Selector::parse(css).map_err(|e| ScraperError::Selector {
        selector: css.to_owned(),
        reason: e.to_string(),
    })
}

/// Text content of an element: each text node trimmed, empty nodes dropped,
/// the rest joined with single spaces.
#[must_use]
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first element matching `css`, if any.
///
/// # Errors
///
/// Returns [`ScraperError::Selector`] for an invalid selector.
pub fn first_text(document: &Html, css: &str) -> Result<Option<String>, ScraperError> {
    let sel = selector(css)?;
    Ok(document.select(&sel).next().map(element_text))
}

/// `href` values of every element matching `css`, in document order.
///
/// # Errors
///
/// Returns [`ScraperError::Selector`] for an invalid selector.
pub fn hrefs(document: &Html, css: &str) -> Result<Vec<String>, ScraperError> {
    let sel = selector(css)?;
    Ok(document
        .select(&sel)
        .filter_map(|el| el.value().attr("href"))
        .map(str::to_owned)
        .collect())
}

/// Resolves `href` against `base` and drops its query string and fragment.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] when `base` is not an absolute URL
/// or `href` cannot be joined onto it.
pub fn absolute_link(base: &str, href: &str) -> Result<String, ScraperError> {
    let invalid = |reason: String| ScraperError::InvalidUrl {
        url: href.to_owned(),
        reason,
    };
    let base = reqwest::Url::parse(base).map_err(|e| invalid(format!("bad base {base}: {e}")))?;
    let joined = base
        .join(strip_query(href))
        .map_err(|e| invalid(e.to_string()))?;
    Ok(joined.to_string())
}

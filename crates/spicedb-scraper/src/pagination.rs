//! Page-numbered listing walks.
//!
//! Storefront collection pages are fetched as `?page=1`, `?page=2`, … until a
//! page contributes no product link that was not already seen. Themes keep
//! serving the last page (or the first) for out-of-range numbers, so "no new
//! links" is the only reliable end marker. [`MAX_PAGES`] bounds the walk for
//! stores that cycle.

use std::collections::HashSet;

/// Maximum number of listing pages fetched for one vendor.
pub const MAX_PAGES: u32 = 200;

/// URL of listing page `page` (1-based) under `base`.
///
/// `base` must not end with `/`; `path` must start with one.
#[must_use]
pub fn listing_page_url(base: &str, path: &str, page: u32) -> String {
    let sep = if path.contains('?') { '&' } else { '?' };
    format!("{base}{path}{sep}page={page}")
}

/// Drops the query string and fragment from an href.
#[must_use]
pub fn strip_query(href: &str) -> &str {
    let end = href.find(['?', '#']).unwrap_or(href.len());
    &href[..end]
}

/// Product links discovered so far, in first-seen order.
#[derive(Debug, Default)]
pub struct LinkFrontier {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl LinkFrontier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `links` and returns how many were new.
    pub fn admit<I, S>(&mut self, links: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.ordered.len();
        for link in links {
            let link = link.into();
            if self.seen.insert(link.clone()) {
                self.ordered.push(link);
            }
        }
        self.ordered.len() - before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// True once `limit` links are known. `None` never saturates.
    #[must_use]
    pub fn reached(&self, limit: Option<usize>) -> bool {
        limit.is_some_and(|n| self.ordered.len() >= n)
    }

    /// The first `limit` links (all of them when `limit` is `None`).
    #[must_use]
    pub fn into_links(mut self, limit: Option<usize>) -> Vec<String> {
        if let Some(n) = limit {
            self.ordered.truncate(n);
        }
        self.ordered
    }
}

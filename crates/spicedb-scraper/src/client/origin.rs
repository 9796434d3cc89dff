//! Origin and host helpers for request headers and error messages.

/// Returns the scheme+host origin of `url`.
///
/// `"https://worldspice.com/collections/pure-spices?page=2"` becomes
/// `"https://worldspice.com"`. Unparseable input falls back to the first
/// three `/`-separated segments.
#[must_use]
pub fn extract_origin(url: &str) -> String {
    reqwest::Url::parse(url).map_or_else(
        |e| {
            tracing::warn!(url, error = %e, "could not parse URL, splitting on '/' for origin");
            url.trim_end_matches('/')
                .splitn(4, '/')
                .take(3)
                .collect::<Vec<_>>()
                .join("/")
        },
        |u| u.origin().ascii_serialization(),
    )
}

/// Hostname of `url`, or the whole input when it does not parse.
pub(crate) fn extract_domain(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}

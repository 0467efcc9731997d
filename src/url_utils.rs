//! URL Utility Functions
//!
//! Validation of audit targets, origin derivation and relative-link
//! resolution shared by the fetcher, extractor and suggestion builders.

use url::Url;

use crate::error::{Error, Result};

/// Parse and validate an audit target.
///
/// Only absolute `http`/`https` URLs with a host are accepted. This runs
/// before any network access.
pub fn parse_audit_url(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    let url = Url::parse(trimmed).map_err(|e| Error::ValidationFailed(format!("{trimmed}: {e}")))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(Error::ValidationFailed(format!(
            "unsupported scheme {:?}",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::ValidationFailed(format!("{trimmed}: missing host")));
    }

    Ok(url)
}

/// Serialized origin (`scheme://host[:port]`) of a URL.
#[must_use]
pub fn origin(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Hostname of a URL, empty when it has none.
#[must_use]
pub fn hostname(url: &Url) -> String {
    url.host_str().unwrap_or_default().to_string()
}

/// Resolve `path` (e.g. `/robots.txt`) against the origin of `url`.
#[must_use]
pub fn origin_join(url: &Url, path: &str) -> Option<Url> {
    Url::parse(&origin(url)).ok()?.join(path).ok()
}

/// Resolve an href against a base, returning `None` for unparseable targets.
#[must_use]
pub fn resolve(href: &str, base: &Url) -> Option<Url> {
    base.join(href.trim()).ok()
}

/// Last non-empty path segment of a URL (`None` for the root path).
#[must_use]
pub fn last_path_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(ToString::to_string)
}

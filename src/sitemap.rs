//! Sitemap discovery and freshness.
//!
//! Candidates are the robots-declared sitemaps followed by
//! `{origin}/sitemap.xml`. The first candidate that parses as a `urlset` or
//! `sitemapindex` wins; only its first entry's `<lastmod>` is consulted.
//! When nothing parses the run continues with "no sitemap".

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::constants::SITEMAP_FRESH_DAYS;
use crate::error::{Error, Result};
use crate::network::guard_url;
use crate::options::AuditOptions;
use crate::url_utils;

/// Bytes read from a sitemap before parsing what arrived so far.
const SITEMAP_MAX_BYTES: usize = 10 * 1024 * 1024;

static SITEMAP_ROOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:[\w-]+:)?(?:urlset|sitemapindex)\b").expect("SITEMAP_ROOT regex")
});

static FIRST_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(?:[\w-]+:)?(?:url|sitemap)\b[^>]*>(.*?)</(?:[\w-]+:)?(?:url|sitemap)\s*>")
        .expect("FIRST_ENTRY regex")
});

static LASTMOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(?:[\w-]+:)?lastmod\s*>(.*?)</(?:[\w-]+:)?lastmod\s*>").expect("LASTMOD regex")
});

/// Sitemap location and freshness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapMeta {
    /// Candidate that parsed, `None` when no sitemap was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Raw `<lastmod>` of the first entry when it was a valid date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<String>,
    /// `lastmod` lies within 365 days of the audit.
    pub within_365_days: bool,
}

/// Outcome of parsing one sitemap document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// Not a `urlset`/`sitemapindex`, or no entries.
    Unrecognized,
    /// Recognized sitemap; `lastmod` of the first entry if present.
    Entries {
        /// Trimmed `<lastmod>` text of the first entry.
        first_lastmod: Option<String>,
    },
}

/// Parse a sitemap or sitemap index.
#[must_use]
pub fn parse_sitemap(xml: &str) -> SitemapDocument {
    let Some(root) = SITEMAP_ROOT.find(xml) else {
        return SitemapDocument::Unrecognized;
    };
    let Some(entry) = FIRST_ENTRY.captures(&xml[root.end()..]) else {
        return SitemapDocument::Unrecognized;
    };
    let first_lastmod = entry
        .get(1)
        .and_then(|body| LASTMOD.captures(body.as_str()))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty());
    SitemapDocument::Entries { first_lastmod }
}

/// Parse W3C datetime variants used in `<lastmod>`.
#[must_use]
pub fn parse_lastmod(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d"))
        .ok()?;
    date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc())
}

/// Build metadata for a parsed candidate relative to `now`.
#[must_use]
pub fn sitemap_meta(candidate: &str, first_lastmod: Option<&str>, now: DateTime<Utc>) -> SitemapMeta {
    let Some((raw, date)) = first_lastmod.and_then(|raw| parse_lastmod(raw).map(|d| (raw, d))) else {
        return SitemapMeta {
            url: Some(candidate.to_string()),
            lastmod: None,
            within_365_days: false,
        };
    };
    SitemapMeta {
        url: Some(candidate.to_string()),
        lastmod: Some(raw.to_string()),
        within_365_days: (now - date).num_days() <= SITEMAP_FRESH_DAYS,
    }
}

/// Candidate list: robots-declared sitemaps, then the default location.
#[must_use]
pub fn sitemap_candidates(target: &Url, robots_sitemaps: &[String]) -> Vec<String> {
    let mut candidates = robots_sitemaps.to_vec();
    if let Some(default) = url_utils::origin_join(target, "/sitemap.xml") {
        let default = default.to_string();
        if !candidates.contains(&default) {
            candidates.push(default);
        }
    }
    candidates
}

async fn fetch_sitemap(client: &Client, candidate: &str, options: &AuditOptions) -> Result<String> {
    let unresolvable = |reason: String| Error::SitemapUnresolvable(format!("{candidate}: {reason}"));

    let url = Url::parse(candidate).map_err(|e| unresolvable(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(unresolvable(format!("unsupported scheme {:?}", url.scheme())));
    }
    // Declared sitemaps come from the audited site and may point anywhere.
    if !options.allow_private_networks {
        guard_url(&url).await?;
    }

    let mut response = client
        .get(url)
        .header(ACCEPT, "application/xml,text/xml")
        .timeout(options.request_timeout)
        .send()
        .await
        .map_err(|e| unresolvable(e.to_string()))?;
    if !response.status().is_success() {
        return Err(unresolvable(format!("status {}", response.status().as_u16())));
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(|e| unresolvable(e.to_string()))? {
        body.extend_from_slice(&chunk);
        if body.len() >= SITEMAP_MAX_BYTES {
            break;
        }
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Try each candidate in order until one parses.
///
/// Candidates that resolve to private addresses are skipped unless
/// `allow_private_networks` is set.
pub async fn resolve_sitemap_meta(
    client: &Client,
    target: &Url,
    robots_sitemaps: &[String],
    options: &AuditOptions,
    now: DateTime<Utc>,
) -> SitemapMeta {
    for candidate in sitemap_candidates(target, robots_sitemaps) {
        let xml = match fetch_sitemap(client, &candidate, options).await {
            Ok(xml) => xml,
            Err(err) => {
                debug!(error = %err, "sitemap candidate skipped");
                continue;
            }
        };
        match parse_sitemap(&xml) {
            SitemapDocument::Entries { first_lastmod } => {
                return sitemap_meta(&candidate, first_lastmod.as_deref(), now);
            }
            SitemapDocument::Unrecognized => {
                debug!(candidate = %candidate, "sitemap candidate did not parse");
            }
        }
    }

    let err = Error::SitemapUnresolvable(format!("no sitemap for {}", url_utils::origin(target)));
    debug!(error = %err, "continuing without sitemap");
    SitemapMeta::default()
}

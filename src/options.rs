//! Configuration options for audit runs.
//!
//! The `AuditOptions` struct controls network behaviour of the pipeline:
//! timeouts, retry policy, size limits and where results are persisted.

use std::path::PathBuf;
use std::time::Duration;

use crate::constants;

/// Configuration options for an audit run.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use geo_audit::AuditOptions;
///
/// let options = AuditOptions {
///     retries: 0,
///     request_timeout: Duration::from_secs(5),
///     ..AuditOptions::default()
/// };
/// assert_eq!(options.max_html_bytes, 2_000_000);
/// ```
#[derive(Debug, Clone)]
pub struct AuditOptions {
    /// Agent identity sent as `User-Agent` and matched against robots.txt groups.
    ///
    /// Default: `GEOAuditBot/1.0 (+https://geo-audit.dev/bot)`
    pub user_agent: String,

    /// `Accept` header for the raw HTML fetch.
    ///
    /// Default: `text/html,application/xhtml+xml;q=0.9,*/*;q=0.8`
    pub accept: String,

    /// Timeout for each HTTP attempt (page, robots.txt, sitemap).
    ///
    /// Default: 12 seconds
    pub request_timeout: Duration,

    /// Timeout handed to the rendering service.
    ///
    /// Default: 15 seconds
    pub render_timeout: Duration,

    /// Additional attempts after a retryable fetch failure.
    ///
    /// Default: `2`
    pub retries: u32,

    /// Linear backoff unit; attempt `n` waits `backoff * n` before retrying.
    ///
    /// Default: 600 ms
    pub backoff: Duration,

    /// Maximum raw HTML body size in bytes.
    ///
    /// Default: `2_000_000`
    pub max_html_bytes: usize,

    /// Skip the private-network guard.
    ///
    /// Only meant for auditing loopback fixtures in tests.
    ///
    /// Default: `false`
    pub allow_private_networks: bool,

    /// Directory used by [`crate::FileRunStore`].
    ///
    /// Default: `.geo-artifacts/runs`
    pub store_dir: PathBuf,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            user_agent: constants::USER_AGENT.to_string(),
            accept: constants::HTML_ACCEPT.to_string(),
            request_timeout: constants::REQUEST_TIMEOUT,
            render_timeout: constants::RENDER_TIMEOUT,
            retries: constants::FETCH_RETRIES,
            backoff: constants::FETCH_BACKOFF,
            max_html_bytes: constants::MAX_HTML_BYTES,
            allow_private_networks: false,
            store_dir: PathBuf::from(".geo-artifacts").join("runs"),
        }
    }
}

impl AuditOptions {
    /// Product token of the user agent (`GEOAuditBot` for the default agent).
    ///
    /// robots.txt groups are matched against this token.
    #[must_use]
    pub fn agent_token(&self) -> &str {
        self.user_agent
            .split(['/', ' '])
            .next()
            .unwrap_or(&self.user_agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let opts = AuditOptions::default();
        assert_eq!(opts.retries, 2);
        assert_eq!(opts.backoff, Duration::from_millis(600));
        assert_eq!(opts.request_timeout, Duration::from_secs(12));
        assert_eq!(opts.render_timeout, Duration::from_secs(15));
        assert_eq!(opts.max_html_bytes, 2_000_000);
        assert!(!opts.allow_private_networks);
        assert!(opts.user_agent.starts_with("GEOAuditBot/"));
    }

    #[test]
    fn test_agent_token_strips_version() {
        let opts = AuditOptions::default();
        assert_eq!(opts.agent_token(), "GEOAuditBot");

        let custom = AuditOptions {
            user_agent: "PlainAgent".into(),
            ..AuditOptions::default()
        };
        assert_eq!(custom.agent_token(), "PlainAgent");
    }
}

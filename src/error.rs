//! Error types for geo-audit.
//!
//! Guard, robots and fetch failures abort a run and surface verbatim.
//! Rendering and sitemap failures are produced internally and absorbed by the
//! pipeline as degraded signals.

use std::net::IpAddr;

/// Reasons a raw HTML fetch can fail after retries are exhausted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Server answered with a non-success status.
    #[error("fetch failed with status {0}")]
    Status(u16),

    /// Body exceeded the configured byte limit.
    #[error("page is too large to analyze (limit {limit} bytes)")]
    TooLarge {
        /// Configured byte limit.
        limit: usize,
    },

    /// Response was not an HTML document.
    #[error("URL did not return HTML (content-type {content_type:?})")]
    NotHtml {
        /// Content type the server reported.
        content_type: String,
    },

    /// Request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS or protocol failure.
    #[error("transport error: {0}")]
    Transport(String),
}

impl FetchError {
    /// Whether another attempt may succeed.
    ///
    /// 5xx, 408 and 429 responses and transport/timeout failures are retried;
    /// other 4xx, size and content-type failures are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status(code) => *code >= 500 || *code == 408 || *code == 429,
            Self::Timeout | Self::Transport(_) => true,
            Self::TooLarge { .. } | Self::NotHtml { .. } => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Error type for audit operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input URL is malformed or not http(s).
    #[error("invalid URL: {0}")]
    ValidationFailed(String),

    /// Target resolves to a private, loopback or link-local address.
    #[error("blocked host {host} ({address})")]
    BlockedHost {
        /// Hostname from the URL.
        host: String,
        /// Offending address.
        address: IpAddr,
    },

    /// robots.txt disallows the audit agent on this path.
    #[error("robots.txt disallows auditing {url}")]
    RobotsDisallowed {
        /// URL that was refused.
        url: String,
    },

    /// Raw HTML could not be fetched.
    #[error(transparent)]
    FetchFailed(#[from] FetchError),

    /// Rendering service could not produce a result.
    #[error("rendering unavailable: {0}")]
    RenderingUnavailable(String),

    /// No sitemap candidate could be fetched and parsed.
    #[error("sitemap unresolvable: {0}")]
    SitemapUnresolvable(String),

    /// Run store read/write failure.
    #[error("run store error: {0}")]
    Store(String),
}

impl Error {
    /// True for refusals callers should surface as "not permitted".
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::RobotsDisallowed { .. })
    }

    /// Whether this error aborts an audit run.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::RenderingUnavailable(_) | Self::SitemapUnresolvable(_)
        )
    }
}

/// Result type alias for audit operations.
pub type Result<T> = std::result::Result<T, Error>;

//! Resilient raw-HTML fetcher.
//!
//! Streams the body and aborts once `max_html_bytes` is exceeded. Retries
//! 5xx/408/429 responses and transport failures with linear backoff
//! (`backoff * attempt`); other failures surface immediately.

use std::time::Instant;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::encoding;
use crate::error::FetchError;
use crate::options::AuditOptions;

/// Raw page as served without JavaScript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchedPage {
    /// Decoded HTML.
    pub html: String,
    /// Body size in bytes as received.
    pub bytes: usize,
    /// Milliseconds from request start to response headers.
    pub ttfb_ms: f64,
    /// `Content-Type` header value.
    pub content_type: String,
}

/// Fetch `url` as HTML, retrying transient failures.
///
/// Exhausting retries surfaces the last error.
pub async fn fetch_html(
    client: &Client,
    url: &Url,
    options: &AuditOptions,
) -> Result<FetchedPage, FetchError> {
    let mut attempt: u32 = 0;
    loop {
        match fetch_once(client, url, options).await {
            Ok(page) => {
                debug!(url = %url, bytes = page.bytes, ttfb_ms = page.ttfb_ms, "fetched raw HTML");
                return Ok(page);
            }
            Err(err) if err.is_retryable() && attempt < options.retries => {
                attempt += 1;
                let delay = options.backoff * attempt;
                warn!(url = %url, attempt, error = %err, delay_ms = delay.as_millis(), "retrying fetch");
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

async fn fetch_once(
    client: &Client,
    url: &Url,
    options: &AuditOptions,
) -> Result<FetchedPage, FetchError> {
    let start = Instant::now();
    let mut response = client
        .get(url.clone())
        .header(ACCEPT, options.accept.as_str())
        .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
        .timeout(options.request_timeout)
        .send()
        .await?;
    let ttfb_ms = start.elapsed().as_secs_f64() * 1000.0;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    if !is_html_content_type(&content_type) {
        return Err(FetchError::NotHtml { content_type });
    }

    let limit = options.max_html_bytes;
    if response
        .content_length()
        .is_some_and(|len| usize::try_from(len).map_or(true, |len| len > limit))
    {
        return Err(FetchError::TooLarge { limit });
    }

    let mut body: Vec<u8> = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > limit {
            return Err(FetchError::TooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(FetchedPage {
        html: encoding::decode_body(&body, &content_type),
        bytes: body.len(),
        ttfb_ms,
        content_type,
    })
}

/// Accept `text/html` and `application/xhtml+xml` in any casing.
#[must_use]
pub fn is_html_content_type(content_type: &str) -> bool {
    let lower = content_type.to_ascii_lowercase();
    lower.contains("text/html") || lower.contains("application/xhtml+xml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_content_types() {
        assert!(is_html_content_type("text/html"));
        assert!(is_html_content_type("Text/HTML; charset=UTF-8"));
        assert!(is_html_content_type("application/xhtml+xml"));
        assert!(!is_html_content_type("application/json"));
        assert!(!is_html_content_type(""));
    }
}

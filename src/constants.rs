//! Fixed limits and scoring constants shared across the pipeline.

use std::time::Duration;

/// Self-identifying agent string sent with every request and matched in robots.txt.
pub const USER_AGENT: &str = "GEOAuditBot/1.0 (+https://geo-audit.dev/bot)";

/// Default `Accept` header for page fetches.
pub const HTML_ACCEPT: &str = "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8";

/// Upper bound on raw HTML bytes (2 MB).
pub const MAX_HTML_BYTES: usize = 2_000_000;

/// Per-attempt HTTP timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(12_000);

/// Rendering service timeout.
pub const RENDER_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Additional attempts after the first failure.
pub const FETCH_RETRIES: u32 = 2;

/// Linear backoff unit between attempts.
pub const FETCH_BACKOFF: Duration = Duration::from_millis(600);

/// Fixed deduction for each red-flag condition.
pub const RED_FLAG_PENALTY: f64 = 10.0;

/// Paragraphs kept per snapshot.
pub const MAX_PARAGRAPHS: usize = 80;

/// Characters kept per paragraph or caption.
pub const MAX_PARAGRAPH_CHARS: usize = 320;

/// Outbound links kept per snapshot.
pub const MAX_LINKS: usize = 40;

/// Characters kept per link text.
pub const MAX_LINK_TEXT_CHARS: usize = 80;

/// Images kept per snapshot.
pub const MAX_IMAGES: usize = 30;

/// Table captions kept as dataset hints.
pub const MAX_DATASET_HINTS: usize = 5;

/// Distinct inline dates kept.
pub const MAX_INLINE_DATES: usize = 10;

/// Findings promoted to top fixes.
pub const MAX_TOP_FIXES: usize = 5;

/// Question headings considered for the FAQ artifact.
pub const MAX_FAQ_QUESTIONS: usize = 8;

/// Minimum question/answer pairs for a FAQ artifact.
pub const MIN_FAQ_PAIRS: usize = 3;

/// Words kept per FAQ answer.
pub const MAX_FAQ_ANSWER_WORDS: usize = 120;

/// Sitemap `lastmod` age still considered fresh.
pub const SITEMAP_FRESH_DAYS: i64 = 365;

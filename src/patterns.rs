//! Compiled regex patterns for content heuristics.
//!
//! All patterns are compiled once at first use using `LazyLock`.
//! Patterns are organized by the stage of the pipeline that consumes them.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Paragraph Heuristics
// =============================================================================

/// Claim, evidence and attribution vocabulary for claim-evidence blocks.
pub static CLAIM_VOCABULARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:claim|evidence|according to|source|study|report|research|analysis|survey|data shows)\b",
    )
    .expect("CLAIM_VOCABULARY regex")
});

/// Month names (optionally followed by `d, yyyy`) or bare four-digit years.
///
/// Case-sensitive on purpose: lowercase "may" is a verb far more often than a month.
pub static INLINE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|Jun(?:e)?|Jul(?:y)?|Aug(?:ust)?|Sep(?:t(?:ember)?)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)(?:\s+\d{1,2},\s+\d{4})?\b|\b\d{4}\b",
    )
    .expect("INLINE_DATE regex")
});

/// "Updated on ..." / "Updated: ..." markers.
pub static UPDATED_ON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bupdated(?: on\b|\s*:)").expect("UPDATED_ON regex")
});

/// Summary vocabulary that marks a TL;DR block.
pub static SUMMARY_VOCABULARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)tl;dr|key takeaways|summary").expect("SUMMARY_VOCABULARY regex")
});

/// Absolute http(s) link targets.
pub static ABSOLUTE_HTTP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://").expect("ABSOLUTE_HTTP regex"));

// =============================================================================
// Heading Heuristics
// =============================================================================

/// Headings counted as FAQ-shaped by the answer-readiness pillar.
pub static FAQ_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bfaq|questions?|how|why|what\b").expect("FAQ_HEADING regex")
});

/// Question-shaped headings used to build the FAQ artifact.
pub static QUESTION_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:what|why|how|when|where|faq|question)\b")
        .expect("QUESTION_HEADING regex")
});

/// Headings sampled for the inline FAQ fix snippet.
pub static SNIPPET_QUESTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bwhat|how|why|faq|when|where").expect("SNIPPET_QUESTION regex")
});

/// Trailing colons/question marks replaced by a single `?`.
pub static TRAILING_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[:?]+$").expect("TRAILING_PUNCTUATION regex"));

// =============================================================================
// Microdata Heuristics
// =============================================================================

/// Microdata item types naming an organization or website.
pub static ORGANIZATION_ITEMTYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Organization|WebSite").expect("ORGANIZATION_ITEMTYPE regex")
});

/// Microdata item types naming a person or product.
pub static PERSON_ITEMTYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Person|Product").expect("PERSON_ITEMTYPE regex"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_date_matches_months_and_years() {
        let text = "Published March 3, 2024 and revised in Oct 2025. It may rain.";
        let found: Vec<&str> = INLINE_DATE.find_iter(text).map(|m| m.as_str()).collect();
        assert_eq!(found, vec!["March 3, 2024", "Oct", "2025"]);
    }

    #[test]
    fn updated_on_accepts_both_forms() {
        assert!(UPDATED_ON.is_match("Updated on June 2, 2025"));
        assert!(UPDATED_ON.is_match("Last updated: 2025-06-02"));
        assert!(!UPDATED_ON.is_match("We updated the onboarding flow"));
    }

    #[test]
    fn question_heading_requires_whole_words() {
        assert!(QUESTION_HEADING.is_match("What is GEO"));
        assert!(QUESTION_HEADING.is_match("FAQ"));
        assert!(!QUESTION_HEADING.is_match("Showcase"));
    }

    #[test]
    fn claim_vocabulary_is_case_insensitive() {
        assert!(CLAIM_VOCABULARY.is_match("According to the survey"));
        assert!(CLAIM_VOCABULARY.is_match("A 2024 Study found"));
        assert!(!CLAIM_VOCABULARY.is_match("Plain marketing copy"));
    }
}

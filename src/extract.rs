//! Content extraction.
//!
//! Turns one HTML render into a [`RenderSnapshot`]: headings, paragraphs,
//! citation flags, links, images, tables and the inferred answer signals.
//! Script, style and noscript elements are removed before any text is read,
//! so JSON-LD must be collected from the document beforehand.

use std::collections::HashSet;

use url::Url;

use crate::constants::{
    MAX_DATASET_HINTS, MAX_IMAGES, MAX_INLINE_DATES, MAX_LINKS, MAX_LINK_TEXT_CHARS,
    MAX_PARAGRAPHS, MAX_PARAGRAPH_CHARS,
};
use crate::dom::{self, Document, Selection};
use crate::metadata::microdata_types;
use crate::patterns::{ABSOLUTE_HTTP, CLAIM_VOCABULARY, INLINE_DATE, SUMMARY_VOCABULARY, UPDATED_ON};
use crate::result::{ImageRef, OutboundLink, RenderSnapshot};
use crate::url_utils;

/// In-page anchors that point at a citation or reference list entry.
const CITATION_ANCHORS: &str = r##"a[href^="#cite"],a[href^="#ref"],a[href*="cite_note"]"##;

/// Anchors counted towards the page-wide reference total.
const REFERENCE_ANCHORS: &str = r##"a[href^="#cite"],a[href*="cite_note"]"##;

/// Upper bound on first-paragraph words for the short-intro TL;DR signal.
const SHORT_INTRO_WORDS: usize = 80;

/// Paragraphs scanned for summary vocabulary.
const SUMMARY_WINDOW: usize = 3;

/// Extract a snapshot from markup.
#[must_use]
pub fn extract_snapshot(html: &str, base: &Url) -> RenderSnapshot {
    let document = dom::parse(html);
    snapshot_from_document(&document, base)
}

/// Extract a snapshot from a parsed document.
///
/// Strips `script`, `noscript` and `style` from `document` in place.
#[must_use]
pub fn snapshot_from_document(document: &Document, base: &Url) -> RenderSnapshot {
    dom::remove_all(document, "script,noscript,style");

    let paragraphs = collect_paragraphs(document);
    let kept = &paragraphs[..paragraphs.len().min(MAX_PARAGRAPHS)];

    let truncated: Vec<String> = kept
        .iter()
        .map(|p| dom::truncate_chars(&p.text, MAX_PARAGRAPH_CHARS))
        .collect();
    let paragraph_word_counts: Vec<usize> = truncated.iter().map(|p| dom::word_count(p)).collect();
    let paragraph_has_citation: Vec<bool> = kept.iter().map(|p| p.has_citation).collect();

    let claim_citation_pairs = kept.iter().filter(|p| p.has_citation).count();
    let claim_evidence_blocks = kept
        .iter()
        .filter(|p| p.has_citation && CLAIM_VOCABULARY.is_match(&p.text))
        .count();

    let first_paragraph_word_count = paragraph_word_counts.first().copied().unwrap_or(0);
    let tl_dr_near_top = paragraphs
        .iter()
        .take(SUMMARY_WINDOW)
        .any(|p| SUMMARY_VOCABULARY.is_match(&p.text))
        || (1..=SHORT_INTRO_WORDS).contains(&first_paragraph_word_count);

    let visible_text = dom::normalized_text(&document.select("body"));

    RenderSnapshot {
        title: extract_title(document),
        description: meta_content(document, r#"meta[name="description"]"#),
        headings: collect_texts(document, "h1, h2, h3"),
        paragraphs: truncated,
        paragraph_word_counts,
        paragraph_has_citation,
        tl_dr_near_top,
        claim_evidence_blocks,
        claim_citation_pairs,
        microdata_types: microdata_types(document),
        first_paragraph_word_count,
        reference_citation_count: document.select("sup.reference").length()
            + document.select(REFERENCE_ANCHORS).length(),
        visible_text_length: visible_text.chars().count(),
        total_word_count: dom::word_count(&visible_text),
        inline_dates: inline_dates(&paragraphs),
        canonical_url: dom::non_empty_attribute(
            &document.select(r#"link[rel="canonical"]"#).first(),
            "href",
        ),
        images: collect_images(document),
        tables: document.select("table").length(),
        dataset_hints: collect_texts(document, "table caption")
            .into_iter()
            .take(MAX_DATASET_HINTS)
            .map(|caption| dom::truncate_chars(&caption, MAX_PARAGRAPH_CHARS))
            .collect(),
        outbound_links: collect_links(document, base),
        updated_on_snippet: updated_on(document, &paragraphs),
        has_robots_noindex: document
            .select(r#"meta[name="robots"]"#)
            .first()
            .attr("content")
            .is_some_and(|content| content.to_lowercase().contains("noindex")),
    }
}

struct Paragraph {
    text: String,
    has_citation: bool,
}

/// Non-empty `<p>` elements with their citation flag, in document order.
fn collect_paragraphs(document: &Document) -> Vec<Paragraph> {
    let mut paragraphs = Vec::new();
    for node in document.select("p").nodes() {
        let sel = Selection::from(*node);
        let text = dom::normalized_text(&sel);
        if text.is_empty() {
            continue;
        }
        paragraphs.push(Paragraph {
            text,
            has_citation: has_citation(&sel),
        });
    }
    paragraphs
}

/// Absolute outbound anchor, reference superscript or in-page citation anchor.
fn has_citation(paragraph: &Selection) -> bool {
    let external_anchor = paragraph.select("a[href]").nodes().iter().any(|node| {
        dom::get_attribute(&Selection::from(*node), "href")
            .is_some_and(|href| ABSOLUTE_HTTP.is_match(&href))
    });
    external_anchor
        || !paragraph.select("sup.reference").is_empty()
        || !paragraph.select(CITATION_ANCHORS).is_empty()
}

fn extract_title(document: &Document) -> String {
    let title = dom::normalized_text(&document.select("title").first());
    if title.is_empty() {
        dom::normalized_text(&document.select("h1").first())
    } else {
        title
    }
}

fn meta_content(document: &Document, selector: &str) -> Option<String> {
    document
        .select(selector)
        .first()
        .attr("content")
        .map(|content| dom::normalize_whitespace(&content))
        .filter(|content| !content.is_empty())
}

/// Whitespace-folded, non-empty text of every match.
fn collect_texts(document: &Document, selector: &str) -> Vec<String> {
    document
        .select(selector)
        .nodes()
        .iter()
        .map(|node| dom::normalized_text(&Selection::from(*node)))
        .filter(|text| !text.is_empty())
        .collect()
}

/// Distinct date mentions across all paragraphs, first-seen order.
fn inline_dates(paragraphs: &[Paragraph]) -> Vec<String> {
    let joined = paragraphs
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let mut seen = HashSet::new();
    INLINE_DATE
        .find_iter(&joined)
        .map(|m| m.as_str().trim().to_string())
        .filter(|token| seen.insert(token.clone()))
        .take(MAX_INLINE_DATES)
        .collect()
}

fn collect_images(document: &Document) -> Vec<ImageRef> {
    document
        .select("img")
        .nodes()
        .iter()
        .filter_map(|node| {
            let sel = Selection::from(*node);
            let src = dom::get_attribute(&sel, "src").filter(|src| !src.is_empty())?;
            let alt = dom::get_attribute(&sel, "alt")
                .map(|alt| dom::normalize_whitespace(&alt))
                .unwrap_or_default();
            Some(ImageRef { src, alt })
        })
        .take(MAX_IMAGES)
        .collect()
}

/// Anchors resolved against the page origin; fragments and mailto are skipped.
fn collect_links(document: &Document, base: &Url) -> Vec<OutboundLink> {
    let Some(origin) = url_utils::origin_join(base, "/") else {
        return Vec::new();
    };
    let page_host = url_utils::hostname(base);

    document
        .select("a[href]")
        .nodes()
        .iter()
        .filter_map(|node| {
            let sel = Selection::from(*node);
            let href = dom::get_attribute(&sel, "href")?;
            if href.is_empty() || href.starts_with('#') || href.starts_with("mailto:") {
                return None;
            }
            let target = url_utils::resolve(&href, &origin)?;
            Some(OutboundLink {
                is_external: url_utils::hostname(&target) != page_host,
                href: target.to_string(),
                text: dom::clip_chars(&dom::normalized_text(&sel), MAX_LINK_TEXT_CHARS),
            })
        })
        .take(MAX_LINKS)
        .collect()
}

/// First "updated on" text from `<time>` elements, then paragraphs.
fn updated_on(document: &Document, paragraphs: &[Paragraph]) -> Option<String> {
    collect_texts(document, "time")
        .into_iter()
        .find(|text| UPDATED_ON.is_match(text))
        .or_else(|| {
            paragraphs
                .iter()
                .find(|p| UPDATED_ON.is_match(&p.text))
                .map(|p| p.text.clone())
        })
}

//! FAQ artifact synthesis.
//!
//! Pairs question-shaped headings with paragraphs in document order and emits
//! a ready-to-publish FAQ page plus matching `FAQPage` JSON-LD. Pages with
//! fewer than [`MIN_FAQ_PAIRS`] usable questions produce nothing.

use serde_json::json;
use url::Url;

use crate::constants::{MAX_FAQ_ANSWER_WORDS, MAX_FAQ_QUESTIONS, MIN_FAQ_PAIRS};
use crate::dom::{escape_html, normalize_whitespace};
use crate::patterns::QUESTION_HEADING;
use crate::result::{AuditContext, FaqArtifact};
use crate::suggestions::{display_date, iso_date};
use crate::url_utils;

const FALLBACK_ANSWER: &str = "Provide a concise answer sourced from on-page copy.";

#[derive(Debug, Clone, PartialEq, Eq)]
struct QaPair {
    question: String,
    answer: String,
}

/// Fold whitespace and make sure the heading reads as a question.
fn normalize_question(heading: &str) -> String {
    let text = normalize_whitespace(heading);
    if text.ends_with('?') {
        text
    } else {
        format!("{text}?")
    }
}

/// Keep the first `max` words, marking the cut with `…`.
fn truncate_words(text: &str, max: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max {
        return words.join(" ");
    }
    format!("{}…", words[..max].join(" "))
}

fn collect_pairs(ctx: &AuditContext) -> Vec<QaPair> {
    let js = &ctx.dual.js.snapshot;
    let base = &ctx.dual.base.snapshot;

    js.headings
        .iter()
        .filter(|h| QUESTION_HEADING.is_match(h))
        .take(MAX_FAQ_QUESTIONS)
        .enumerate()
        .map(|(idx, heading)| {
            let answer = js
                .paragraphs
                .get(idx)
                .or_else(|| base.paragraphs.get(idx))
                .map_or(FALLBACK_ANSWER, String::as_str);
            QaPair {
                question: normalize_question(heading),
                answer: truncate_words(answer, MAX_FAQ_ANSWER_WORDS),
            }
        })
        .collect()
}

fn recommended_path(url: Option<&Url>) -> String {
    let slug = url
        .and_then(url_utils::last_path_segment)
        .unwrap_or_else(|| "geo-audit".to_string());
    format!("/{slug}/faq")
}

fn render_html(pairs: &[QaPair], provenance: &str) -> String {
    let mut html = String::from("<article class=\"prose prose-slate max-w-none\">\n");
    html.push_str(&format!(
        "  <p class=\"text-sm text-muted-foreground\">{}</p>\n",
        escape_html(provenance)
    ));
    for pair in pairs {
        html.push_str(&format!(
            "  <section class=\"border-b border-border py-4\">\n    <h2 class=\"text-xl font-semibold\">{}</h2>\n    <p>{}</p>\n  </section>\n",
            escape_html(&pair.question),
            escape_html(&pair.answer)
        ));
    }
    html.push_str("</article>");
    html
}

/// Build the FAQ artifact, or `None` when the page has too few questions.
#[must_use]
pub fn maybe_generate_faq(ctx: &AuditContext) -> Option<FaqArtifact> {
    let pairs = collect_pairs(ctx);
    if pairs.len() < MIN_FAQ_PAIRS {
        return None;
    }

    let parsed = Url::parse(&ctx.url).ok();
    let publisher = parsed
        .as_ref()
        .map_or_else(|| ctx.url.clone(), url_utils::hostname);
    let provenance = format!(
        "Generated from {} on {}.",
        ctx.url,
        display_date(ctx.timestamp)
    );

    let main_entity: Vec<_> = pairs
        .iter()
        .map(|pair| {
            json!({
                "@type": "Question",
                "name": pair.question,
                "acceptedAnswer": { "@type": "Answer", "text": pair.answer }
            })
        })
        .collect();
    let jsonld = json!({
        "@context": "https://schema.org",
        "@type": "FAQPage",
        "dateModified": iso_date(ctx.timestamp),
        "mainEntity": main_entity,
        "mainEntityOfPage": ctx.url,
        "publisher": { "@type": "Organization", "name": publisher }
    });

    Some(FaqArtifact {
        recommended_path: recommended_path(parsed.as_ref()),
        html: render_html(&pairs, &provenance),
        jsonld: serde_json::to_string_pretty(&jsonld).unwrap_or_default(),
        provenance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::DualRenderArtifacts;
    use chrono::{TimeZone, Utc};
    use serde_json::Value;

    fn ctx(url: &str, headings: &[&str], paragraphs: &[&str]) -> AuditContext {
        let mut dual = DualRenderArtifacts::default();
        dual.js.snapshot.headings = headings.iter().map(ToString::to_string).collect();
        dual.js.snapshot.paragraphs = paragraphs.iter().map(ToString::to_string).collect();
        AuditContext {
            url: url.to_string(),
            dual,
            timestamp: Utc.with_ymd_and_hms(2025, 3, 9, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn three_questions_produce_an_artifact() {
        let ctx = ctx(
            "https://example.com/docs/pricing",
            &["What is included", "Why pay yearly?", "Team size", "How do refunds work"],
            &["Everything.", "It is cheaper."],
        );
        let faq = maybe_generate_faq(&ctx).unwrap();

        assert_eq!(faq.recommended_path, "/pricing/faq");
        assert_eq!(faq.provenance, "Generated from https://example.com/docs/pricing on March 9, 2025.");
        assert!(faq.html.starts_with("<article class=\"prose prose-slate max-w-none\">"));
        assert!(faq.html.contains("<h2 class=\"text-xl font-semibold\">What is included?</h2>"));
        assert_eq!(faq.html.matches("<section").count(), 3);

        let value: Value = serde_json::from_str(&faq.jsonld).unwrap();
        assert_eq!(value["@type"], "FAQPage");
        assert_eq!(value["dateModified"], "2025-03-09");
        assert_eq!(value["publisher"]["name"], "example.com");
        let entities = value["mainEntity"].as_array().unwrap();
        assert_eq!(entities.len(), 3);
        assert_eq!(entities[1]["name"], "Why pay yearly?");
        assert_eq!(entities[1]["acceptedAnswer"]["text"], "It is cheaper.");
        assert_eq!(entities[2]["acceptedAnswer"]["text"], FALLBACK_ANSWER);
    }

    #[test]
    fn two_questions_produce_nothing() {
        let ctx = ctx("https://example.com/", &["What is it", "How to start", "Pricing"], &[]);
        assert!(maybe_generate_faq(&ctx).is_none());
    }

    #[test]
    fn root_path_uses_default_slug() {
        assert_eq!(recommended_path(Url::parse("https://example.com/").ok().as_ref()), "/geo-audit/faq");
    }

    #[test]
    fn answers_fall_back_to_base_paragraphs() {
        let mut ctx = ctx("https://example.com/a", &["What", "Why", "How"], &[]);
        ctx.dual.base.snapshot.paragraphs = vec!["From the server.".into()];
        let pairs = collect_pairs(&ctx);
        assert_eq!(pairs[0].answer, "From the server.");
        assert_eq!(pairs[1].answer, FALLBACK_ANSWER);
    }

    #[test]
    fn long_answers_are_truncated() {
        let long = vec!["word"; 130].join(" ");
        let truncated = truncate_words(&long, MAX_FAQ_ANSWER_WORDS);
        assert!(truncated.ends_with('…'));
        assert_eq!(truncated.trim_end_matches('…').split_whitespace().count(), 120);
        assert_eq!(truncate_words("a  b", 5), "a b");
    }

    #[test]
    fn questions_are_normalized_and_escaped() {
        assert_eq!(normalize_question("  What   is <b>?"), "What is <b>?");
        let html = render_html(
            &[QaPair { question: "Why <x>?".into(), answer: "A & B".into() }],
            "Generated.",
        );
        assert!(html.contains("Why &lt;x&gt;?"));
        assert!(html.contains("<p>A &amp; B</p>"));
    }
}

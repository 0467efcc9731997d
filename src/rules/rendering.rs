//! Rendering & Indexability: no-JS text, canonical, sitemap and robots.

use super::{clamp_score, into_pillar, Check};
use crate::result::{FindingKind, PillarName, RuleEvaluation};
use crate::signals::AuditSignals;

/// Share of text that must be present without JavaScript.
pub const TEXT_RATIO_TARGET: f64 = 0.6;

/// Evaluate the Rendering & Indexability rules.
#[must_use]
pub fn evaluate(signals: &AuditSignals) -> Vec<RuleEvaluation> {
    let ratio = signals.text_ratio_no_js;
    let ratio_ok = ratio >= TEXT_RATIO_TARGET;

    let canonical_score = if signals.canonical_matches_host {
        4.0
    } else if signals.canonical_exists {
        2.0
    } else {
        0.0
    };

    let sitemap_score = match (&signals.sitemap_url, signals.sitemap_fresh_within_365) {
        (None, _) => 0.0,
        (Some(_), true) => 4.0,
        (Some(_), false) => 3.0,
    };
    let sitemap_finding = if signals.sitemap_url.is_none() {
        FindingKind::SitemapMissing
    } else {
        FindingKind::SitemapStale
    };

    let robots_score = match (signals.robots_allow, signals.meta_noindex) {
        (true, false) => 4.0,
        (true, true) => 2.0,
        (false, _) => 0.0,
    };
    let robots_evidence = if signals.meta_noindex {
        "meta robots=noindex"
    } else if signals.robots_allow {
        "Robots allow"
    } else {
        "Robots disallow"
    };

    into_pillar(
        PillarName::RenderingIndexability,
        vec![
            Check {
                id: "render_text_ratio",
                title: "≥60% of text in no-JS HTML",
                max: 8.0,
                score: if ratio_ok { 8.0 } else { clamp_score(ratio * 8.0, 8.0) },
                passed: ratio_ok,
                finding: FindingKind::TextRatioLow,
                evidence: Some(format!("text_ratio_noJS={ratio}")),
            },
            Check {
                id: "render_canonical",
                title: "Canonical matches live URL",
                max: 4.0,
                score: canonical_score,
                passed: signals.canonical_matches_host,
                finding: FindingKind::CanonicalConflict,
                evidence: Some(
                    signals
                        .canonical
                        .clone()
                        .unwrap_or_else(|| "Not set".to_string()),
                ),
            },
            Check {
                id: "render_sitemap",
                title: "Sitemap discoverable",
                max: 4.0,
                score: sitemap_score,
                passed: sitemap_score == 4.0,
                finding: sitemap_finding,
                evidence: signals.sitemap_url.clone(),
            },
            Check {
                id: "render_robots",
                title: "Robots.txt + meta robots allow indexing",
                max: 4.0,
                score: robots_score,
                passed: robots_score == 4.0,
                finding: FindingKind::RobotsBlocking,
                evidence: Some(robots_evidence.to_string()),
            },
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures;

    fn rule<'a>(rules: &'a [RuleEvaluation], id: &str) -> &'a RuleEvaluation {
        rules.iter().find(|r| r.id == id).unwrap()
    }

    #[test]
    fn text_ratio_below_target_scales() {
        let mut signals = fixtures::healthy();
        signals.text_ratio_no_js = 0.25;
        let rules = evaluate(&signals);
        let r = rule(&rules, "render_text_ratio");
        assert_eq!(r.score, 2.0);
        assert_eq!(r.finding_id, Some(FindingKind::TextRatioLow));
        assert_eq!(r.evidence.as_deref(), Some("text_ratio_noJS=0.25"));

        signals.text_ratio_no_js = 1.0;
        let rules = evaluate(&signals);
        assert_eq!(rule(&rules, "render_text_ratio").evidence.as_deref(), Some("text_ratio_noJS=1"));
    }

    #[test]
    fn canonical_tiers() {
        let mut signals = fixtures::healthy();
        signals.canonical_matches_host = false;
        let r = evaluate(&signals);
        assert_eq!(rule(&r, "render_canonical").score, 2.0);
        assert_eq!(rule(&r, "render_canonical").finding_id, Some(FindingKind::CanonicalConflict));

        signals.canonical_exists = false;
        signals.canonical = None;
        let r = evaluate(&signals);
        assert_eq!(rule(&r, "render_canonical").score, 0.0);
        assert_eq!(rule(&r, "render_canonical").evidence.as_deref(), Some("Not set"));
    }

    #[test]
    fn sitemap_tiers() {
        let mut signals = fixtures::healthy();
        signals.sitemap_fresh_within_365 = false;
        let r = evaluate(&signals);
        assert_eq!(rule(&r, "render_sitemap").score, 3.0);
        assert_eq!(rule(&r, "render_sitemap").finding_id, Some(FindingKind::SitemapStale));

        signals.sitemap_url = None;
        let r = evaluate(&signals);
        assert_eq!(rule(&r, "render_sitemap").score, 0.0);
        assert_eq!(rule(&r, "render_sitemap").finding_id, Some(FindingKind::SitemapMissing));
        assert!(rule(&r, "render_sitemap").evidence.is_none());
    }

    #[test]
    fn robots_tiers() {
        let mut signals = fixtures::healthy();
        signals.meta_noindex = true;
        let r = evaluate(&signals);
        assert_eq!(rule(&r, "render_robots").score, 2.0);
        assert_eq!(rule(&r, "render_robots").evidence.as_deref(), Some("meta robots=noindex"));

        signals.meta_noindex = false;
        signals.robots_allow = false;
        let r = evaluate(&signals);
        assert_eq!(rule(&r, "render_robots").score, 0.0);
        assert_eq!(rule(&r, "render_robots").evidence.as_deref(), Some("Robots disallow"));
        assert_eq!(rule(&r, "render_robots").finding_id, Some(FindingKind::RobotsBlocking));
    }
}

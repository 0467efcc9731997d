//! Score aggregation.
//!
//! Folds rule scores into the five pillars, normalizes to 0–100 and subtracts
//! the capped red-flag penalty. Findings are recorded once per identifier in
//! first-seen order: pillar rules first, then penalty rows.
//!
//! # Examples
//!
//! ```
//! use geo_audit::scoring::normalized_score;
//!
//! assert_eq!(normalized_score(90.0, 0.0), 100.0);
//! assert_eq!(normalized_score(45.0, 10.0), 40.0);
//! assert_eq!(normalized_score(5.0, 20.0), 0.0);
//! ```

use std::collections::HashMap;

use crate::constants::MAX_TOP_FIXES;
use crate::result::{
    round2, AuditContext, Evidence, Finding, FindingKind, Pillar, PillarName, RuleEvaluation, TopFix,
};
use crate::rules::{self, clamp_score};
use crate::signals::{compute_signals, AuditSignals};
use crate::suggestions;

/// Everything of an [`AuditResult`](crate::AuditResult) except its id and
/// generated artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredAudit {
    /// Final score in `[0, 100]`, two decimals.
    pub geo_score: f64,
    /// Pillars in reporting order.
    pub pillars: Vec<Pillar>,
    /// Findings in first-seen order.
    pub findings: Vec<Finding>,
    /// First five findings as fixes.
    pub top_fixes: Vec<TopFix>,
    /// Evidence summary.
    pub evidence: Evidence,
    /// Pillar rules followed by penalty rows.
    pub score_trace: Vec<RuleEvaluation>,
}

impl ScoredAudit {
    /// Whether a finding with this kind was raised.
    #[must_use]
    pub fn has_finding(&self, kind: FindingKind) -> bool {
        self.findings.iter().any(|f| f.id == kind.as_str())
    }
}

/// Normalize a pillar sum to 0–100, subtract penalties and clamp.
#[must_use]
pub fn normalized_score(pillar_sum: f64, penalty: f64) -> f64 {
    let normalized = pillar_sum / PillarName::total_possible() * 100.0;
    (normalized - penalty).clamp(0.0, 100.0)
}

/// Fold pillar rules into clamped per-pillar totals.
///
/// Penalty rows are ignored here; they only reduce the final score.
#[must_use]
pub fn aggregate_pillars(rules: &[RuleEvaluation]) -> Vec<Pillar> {
    let mut totals: HashMap<PillarName, f64> = HashMap::new();
    for rule in rules {
        let max = rule.pillar.max_score();
        let entry = totals.entry(rule.pillar).or_insert(0.0);
        *entry = clamp_score(*entry + rule.score, max);
    }

    PillarName::ALL
        .iter()
        .map(|&name| Pillar {
            name,
            score: round2(totals.get(&name).copied().unwrap_or(0.0)),
            max: name.max_score(),
        })
        .collect()
}

/// Score a context. Pure: the same context yields the same result.
#[must_use]
pub fn score_context(ctx: &AuditContext) -> ScoredAudit {
    let signals = compute_signals(ctx);
    score_signals(ctx, &signals)
}

/// Score precomputed signals against their context.
#[must_use]
pub fn score_signals(ctx: &AuditContext, signals: &AuditSignals) -> ScoredAudit {
    let pillar_rules = rules::evaluate_pillars(signals);
    let penalties = rules::evaluate_penalties(signals);

    let mut kinds: Vec<(FindingKind, Option<String>)> = Vec::new();
    for rule in pillar_rules.iter().chain(&penalties.rules) {
        let Some(kind) = rule.finding_id else {
            continue;
        };
        if !kinds.iter().any(|(seen, _)| *seen == kind) {
            kinds.push((kind, rule.evidence.clone()));
        }
    }

    let findings: Vec<Finding> = kinds
        .iter()
        .map(|(kind, evidence)| suggestions::build_finding(*kind, ctx, evidence.clone()))
        .collect();
    let top_fixes = findings.iter().take(MAX_TOP_FIXES).map(TopFix::from).collect();

    let pillars = aggregate_pillars(&pillar_rules);
    let pillar_sum: f64 = pillars.iter().map(|p| p.score).sum();
    let geo_score = round2(normalized_score(pillar_sum, penalties.total));

    let mut score_trace = pillar_rules;
    score_trace.extend(penalties.rules);

    ScoredAudit {
        geo_score,
        pillars,
        findings,
        top_fixes,
        evidence: build_evidence(ctx, signals),
        score_trace,
    }
}

fn build_evidence(ctx: &AuditContext, signals: &AuditSignals) -> Evidence {
    let dual = &ctx.dual;
    Evidence {
        text_ratio_no_js: signals.text_ratio_no_js,
        no_js_headings: dual.base.snapshot.headings.clone(),
        js_headings: dual.js.snapshot.headings.clone(),
        missing_headings: dual.missing_headings.clone(),
        json_ld_types: signals.json_ld_types.clone(),
        console_errors: dual.js.console_errors.clone(),
        screenshot_diffs: dual.screenshots.clone(),
        canonical: dual.js.snapshot.canonical_url.clone(),
        sitemap: signals.sitemap_url.clone(),
        robots: signals.robots_url.clone(),
        updated_on_text: dual.js.snapshot.updated_on_snippet.clone(),
        sitemap_lastmod: dual.sitemap.as_ref().and_then(|s| s.lastmod.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures;
    use chrono::{TimeZone, Utc};

    fn ctx() -> AuditContext {
        AuditContext {
            url: "https://example.com/guide".to_string(),
            dual: crate::result::DualRenderArtifacts::default(),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn healthy_signals_score_one_hundred() {
        let scored = score_signals(&ctx(), &fixtures::healthy());
        assert_eq!(scored.geo_score, 100.0);
        assert!(scored.findings.is_empty());
        assert!(scored.top_fixes.is_empty());
        assert_eq!(scored.score_trace.len(), 18);
        for pillar in &scored.pillars {
            assert_eq!(pillar.score, pillar.max);
        }
    }

    #[test]
    fn penalties_reduce_score_but_not_pillars() {
        let mut signals = fixtures::healthy();
        signals.meta_noindex = true;
        let scored = score_signals(&ctx(), &signals);

        let rendering = scored
            .pillars
            .iter()
            .find(|p| p.name == PillarName::RenderingIndexability)
            .unwrap();
        assert_eq!(rendering.score, 18.0);
        // (88 / 90) * 100 - 10
        assert_eq!(scored.geo_score, 87.78);
        assert_eq!(scored.score_trace.last().unwrap().id, "penalty_noindex");
        assert_eq!(scored.findings.len(), 1);
        assert_eq!(scored.findings[0].id, "robots_blocking");
        assert_eq!(scored.findings[0].evidence.as_deref(), Some("meta robots=noindex"));
    }

    #[test]
    fn findings_are_deduplicated_in_first_seen_order() {
        let mut signals = fixtures::healthy();
        signals.json_ld_count = 0;
        signals.supported_schema_count = 0;
        signals.faq_heading_count = 0;
        signals.text_ratio_no_js = 0.3;
        signals.base_heading_count = 0;
        let scored = score_signals(&ctx(), &signals);

        let ids: Vec<&str> = scored.findings.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["faq_missing", "jsonld_missing", "text_ratio_low"]);
        assert_eq!(
            scored.findings[1].evidence.as_deref(),
            Some("No JSON-LD detected."),
            "evidence comes from the first rule raising the finding"
        );
    }

    #[test]
    fn top_fixes_are_capped() {
        let mut signals = fixtures::healthy();
        signals.faq_heading_count = 0;
        signals.tl_dr_near_top = false;
        signals.claim_evidence_blocks = 0;
        signals.claim_citation_pairs = 0;
        signals.json_ld_count = 0;
        signals.schema_has_rich_properties = false;
        signals.inline_date_count = 0;
        let scored = score_signals(&ctx(), &signals);
        assert_eq!(scored.findings.len(), 7);
        assert_eq!(scored.top_fixes.len(), MAX_TOP_FIXES);
        assert_eq!(scored.top_fixes[0].id, "faq_missing");
    }

    #[test]
    fn pillar_fold_clamps() {
        let mut rules = rules::evaluate_pillars(&fixtures::healthy());
        rules[0].score = 100.0;
        let pillars = aggregate_pillars(&rules);
        assert_eq!(pillars[0].score, 25.0);
        assert_eq!(pillars.len(), 5);
    }

    #[test]
    fn score_is_a_pure_function_of_context() {
        let a = score_context(&ctx());
        let b = score_context(&ctx());
        assert_eq!(a, b);
    }
}

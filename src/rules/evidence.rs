//! Evidence Packaging: dates, outbound citations, alt text and data tables.

use super::{clamp_score, into_pillar, Check};
use crate::result::{FindingKind, PillarName, RuleEvaluation};
use crate::signals::AuditSignals;

/// Reference citations worth one outbound-link unit.
const REFERENCES_PER_UNIT: usize = 5;

/// Most link units reference citations can contribute.
const MAX_REFERENCE_UNITS: usize = 3;

/// Evaluate the Evidence Packaging rules.
#[must_use]
pub fn evaluate(signals: &AuditSignals) -> Vec<RuleEvaluation> {
    let has_dates = signals.inline_date_count > 0;

    let reference_units =
        (signals.reference_citation_count / REFERENCES_PER_UNIT).min(MAX_REFERENCE_UNITS);
    let link_units = signals.external_link_count + reference_units;
    let outbound_ok = signals.external_link_count >= 2 || reference_units >= 2;

    let alt_ok = !signals.has_images || signals.alt_coverage >= 0.8;
    let alt_score = if alt_ok {
        4.0
    } else if signals.alt_coverage >= 0.5 {
        3.0
    } else {
        2.0
    };
    let alt_evidence = if signals.has_images {
        format!("alt coverage {:.0}%", signals.alt_coverage * 100.0)
    } else {
        "No images".to_string()
    };

    let has_data = signals.table_count > 0 || signals.dataset_hint_count > 0;

    into_pillar(
        PillarName::EvidencePackaging,
        vec![
            Check {
                id: "evidence_inline_dates",
                title: "Inline “Updated on” or factual dates",
                max: 3.0,
                score: if has_dates { 3.0 } else { 0.0 },
                passed: has_dates,
                finding: FindingKind::InlineDatesMissing,
                evidence: None,
            },
            Check {
                id: "evidence_outbound",
                title: "Primary-source outbound links",
                max: 5.0,
                score: clamp_score(link_units as f64 * 2.0, 5.0),
                passed: outbound_ok,
                finding: FindingKind::OutboundLinksMissing,
                evidence: Some(format!(
                    "{} external link(s), {} citation reference(s).",
                    signals.external_link_count, signals.reference_citation_count
                )),
            },
            Check {
                id: "evidence_alt_text",
                title: "Descriptive alt text",
                max: 4.0,
                score: alt_score,
                passed: alt_ok,
                finding: FindingKind::AltTextMissing,
                evidence: Some(alt_evidence),
            },
            Check {
                id: "evidence_data_table",
                title: "Tables or downloadable datasets",
                max: 3.0,
                score: if has_data { 3.0 } else { 0.0 },
                passed: has_data,
                finding: FindingKind::TableMissing,
                evidence: None,
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
    fn reference_citations_boost_outbound_links() {
        let mut signals = fixtures::healthy();
        signals.external_link_count = 0;
        signals.reference_citation_count = 12;
        let rules = evaluate(&signals);
        let r = rule(&rules, "evidence_outbound");
        assert_eq!(r.score, 4.0);
        assert!(r.passed);
        assert_eq!(r.evidence.as_deref(), Some("0 external link(s), 12 citation reference(s)."));

        signals.reference_citation_count = 4;
        signals.external_link_count = 1;
        let rules = evaluate(&signals);
        let r = rule(&rules, "evidence_outbound");
        assert_eq!(r.score, 2.0);
        assert_eq!(r.finding_id, Some(FindingKind::OutboundLinksMissing));
    }

    #[test]
    fn alt_text_tiers() {
        let mut signals = fixtures::healthy();
        signals.alt_coverage = 0.6;
        let rules = evaluate(&signals);
        let r = rule(&rules, "evidence_alt_text");
        assert_eq!(r.score, 3.0);
        assert_eq!(r.evidence.as_deref(), Some("alt coverage 60%"));
        assert_eq!(r.finding_id, Some(FindingKind::AltTextMissing));

        signals.alt_coverage = 0.2;
        assert_eq!(rule(&evaluate(&signals), "evidence_alt_text").score, 2.0);

        signals.has_images = false;
        let rules = evaluate(&signals);
        let r = rule(&rules, "evidence_alt_text");
        assert!(r.passed);
        assert_eq!(r.evidence.as_deref(), Some("No images"));
    }

    #[test]
    fn dates_and_tables() {
        let mut signals = fixtures::healthy();
        signals.inline_date_count = 0;
        signals.table_count = 0;
        signals.dataset_hint_count = 0;
        let rules = evaluate(&signals);
        assert_eq!(rule(&rules, "evidence_inline_dates").finding_id, Some(FindingKind::InlineDatesMissing));
        assert_eq!(rule(&rules, "evidence_data_table").finding_id, Some(FindingKind::TableMissing));

        signals.dataset_hint_count = 1;
        assert!(rule(&evaluate(&signals), "evidence_data_table").passed);
    }
}

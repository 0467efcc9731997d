//! Answer Readiness: FAQ sections, TL;DR and claim/evidence structure.

use super::{clamp_score, into_pillar, Check};
use crate::result::{FindingKind, PillarName, RuleEvaluation};
use crate::signals::AuditSignals;

/// Evaluate the Answer Readiness rules.
#[must_use]
pub fn evaluate(signals: &AuditSignals) -> Vec<RuleEvaluation> {
    let faq_visible = signals.faq_heading_count > 0;
    let claim_blocks = signals.claim_evidence_blocks;
    let citation_pairs = signals.claim_citation_pairs;

    into_pillar(
        PillarName::AnswerReadiness,
        vec![
            Check {
                id: "answer_faq_visible",
                title: "FAQ/Q&A sections visible",
                max: 6.0,
                score: if faq_visible { 6.0 } else { 0.0 },
                passed: faq_visible,
                finding: FindingKind::FaqMissing,
                evidence: Some(if faq_visible {
                    format!("{} FAQ headings found.", signals.faq_heading_count)
                } else {
                    "No FAQ headings detected.".to_string()
                }),
            },
            Check {
                id: "answer_tldr",
                title: "TL;DR or key takeaway near top",
                max: 6.0,
                score: if signals.tl_dr_near_top { 6.0 } else { 0.0 },
                passed: signals.tl_dr_near_top,
                finding: FindingKind::TldrMissing,
                evidence: None,
            },
            Check {
                id: "answer_claim_evidence",
                title: "Claim → evidence blocks",
                max: 7.0,
                score: clamp_score(claim_blocks as f64 * 3.5, 7.0),
                passed: claim_blocks >= 2,
                finding: FindingKind::ClaimEvidenceGap,
                evidence: Some(format!("{claim_blocks} block(s) detected.")),
            },
            Check {
                id: "answer_claim_citation",
                title: "Claim + citation proximity",
                max: 6.0,
                score: clamp_score(citation_pairs as f64 * 2.0, 6.0),
                passed: citation_pairs >= 2,
                finding: FindingKind::ClaimNoCitation,
                evidence: Some(format!("{citation_pairs} paragraphs with citations.")),
            },
        ],
    )
}

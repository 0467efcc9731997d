//! Red-flag penalties.
//!
//! Client-only body text, a `noindex` meta tag, or (absent `noindex`) a
//! cross-host canonical each deduct the fixed red-flag penalty. The total is
//! capped at twice the penalty; whatever the cap trims is credited back to
//! the last penalty row so the trace sums to the applied total.

use super::Check;
use crate::constants::RED_FLAG_PENALTY;
use crate::result::{penalty_cap, FindingKind, PillarName, RuleEvaluation};
use crate::signals::AuditSignals;

/// Text ratio under which a page counts as client-rendered.
const CLIENT_RENDERED_RATIO: f64 = 0.5;

/// Applied penalty total and the rows that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct PenaltyOutcome {
    /// Points deducted from the normalized score.
    pub total: f64,
    /// Penalty rows, all attributed to Rendering & Indexability.
    pub rules: Vec<RuleEvaluation>,
}

fn red_flag(
    id: &'static str,
    title: &'static str,
    finding: FindingKind,
    evidence: Option<String>,
) -> RuleEvaluation {
    Check {
        id,
        title,
        max: 0.0,
        score: -RED_FLAG_PENALTY,
        passed: false,
        finding,
        evidence,
    }
    .into_evaluation(PillarName::RenderingIndexability)
}

/// Evaluate red flags and apply the cap.
#[must_use]
pub fn evaluate_penalties(signals: &AuditSignals) -> PenaltyOutcome {
    let mut rules = Vec::new();

    if signals.text_ratio_no_js < CLIENT_RENDERED_RATIO && signals.base_heading_count <= 1 {
        rules.push(red_flag(
            "penalty_text_ratio",
            "Red flag: body text only client-rendered",
            FindingKind::TextRatioLow,
            Some(format!("text_ratio_noJS={}", signals.text_ratio_no_js)),
        ));
    }

    if signals.meta_noindex {
        rules.push(red_flag(
            "penalty_noindex",
            "Red flag: Meta robots noindex on canonical content",
            FindingKind::RobotsBlocking,
            None,
        ));
    } else if signals.canonical_exists && !signals.canonical_matches_host {
        rules.push(red_flag(
            "penalty_canonical",
            "Red flag: Canonical conflicts with live URL",
            FindingKind::CanonicalConflict,
            signals.canonical.clone(),
        ));
    }

    apply_cap(rules)
}

/// Cap the summed penalty, crediting the excess to the last row.
#[must_use]
pub fn apply_cap(mut rules: Vec<RuleEvaluation>) -> PenaltyOutcome {
    let raw: f64 = rules.iter().map(|r| -r.score).sum();
    let cap = penalty_cap();
    if raw <= cap {
        return PenaltyOutcome { total: raw, rules };
    }
    if let Some(last) = rules.last_mut() {
        last.score += raw - cap;
    }
    PenaltyOutcome { total: cap, rules }
}

//! Rule engine.
//!
//! Five pillar evaluators and a penalty evaluator, each a pure function of
//! [`AuditSignals`]. Rules within a pillar are additive and independent. A
//! failing rule carries the finding that remediates it.

pub mod answer;
pub mod entity;
pub mod evidence;
pub mod penalties;
pub mod rendering;
pub mod schema;

use crate::result::{round2, FindingKind, PillarName, RuleEvaluation};
use crate::signals::AuditSignals;

pub use penalties::{evaluate_penalties, PenaltyOutcome};

/// Clamp `value` into `[0, max]`; NaN scores 0.
#[must_use]
pub fn clamp_score(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max)
}

/// One check before it is attributed to a pillar.
#[derive(Debug, Clone)]
pub struct Check {
    /// Rule identifier.
    pub id: &'static str,
    /// Human-readable title.
    pub title: &'static str,
    /// Maximum score.
    pub max: f64,
    /// Awarded score.
    pub score: f64,
    /// Whether the check passed.
    pub passed: bool,
    /// Finding raised when the check fails.
    pub finding: FindingKind,
    /// Facts behind the verdict.
    pub evidence: Option<String>,
}

impl Check {
    /// Attribute the check to `pillar`. Scores are kept to two decimals.
    #[must_use]
    pub fn into_evaluation(self, pillar: PillarName) -> RuleEvaluation {
        RuleEvaluation {
            id: self.id.to_string(),
            pillar,
            title: self.title.to_string(),
            score: round2(self.score),
            max: self.max,
            passed: self.passed,
            finding_id: (!self.passed).then_some(self.finding),
            evidence: self.evidence,
        }
    }
}

/// Attribute a pillar's checks.
pub(crate) fn into_pillar(pillar: PillarName, checks: Vec<Check>) -> Vec<RuleEvaluation> {
    checks
        .into_iter()
        .map(|check| check.into_evaluation(pillar))
        .collect()
}

/// Evaluate every pillar rule in reporting order.
#[must_use]
pub fn evaluate_pillars(signals: &AuditSignals) -> Vec<RuleEvaluation> {
    let mut rules = answer::evaluate(signals);
    rules.extend(schema::evaluate(signals));
    rules.extend(rendering::evaluate(signals));
    rules.extend(evidence::evaluate(signals));
    rules.extend(entity::evaluate(signals));
    rules
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_score_bounds() {
        assert_eq!(clamp_score(9.0, 7.0), 7.0);
        assert_eq!(clamp_score(-1.0, 7.0), 0.0);
        assert_eq!(clamp_score(f64::NAN, 7.0), 0.0);
        assert_eq!(clamp_score(3.5, 7.0), 3.5);
    }

    #[test]
    fn healthy_page_passes_every_pillar_rule() {
        let rules = evaluate_pillars(&fixtures::healthy());
        assert_eq!(rules.len(), 18);
        for rule in &rules {
            assert!(rule.passed, "{} failed", rule.id);
            assert_eq!(rule.score, rule.max, "{}", rule.id);
            assert!(rule.finding_id.is_none());
        }
    }

    #[test]
    fn rule_maxima_match_pillar_maxima() {
        let rules = evaluate_pillars(&fixtures::healthy());
        for pillar in PillarName::ALL {
            let sum: f64 = rules.iter().filter(|r| r.pillar == pillar).map(|r| r.max).sum();
            assert_eq!(sum, pillar.max_score(), "{pillar}");
        }
    }

    #[test]
    fn failing_check_carries_its_finding() {
        let check = Check {
            id: "x",
            title: "X",
            max: 4.0,
            score: 1.234,
            passed: false,
            finding: FindingKind::TableMissing,
            evidence: None,
        };
        let rule = check.into_evaluation(PillarName::EvidencePackaging);
        assert_eq!(rule.score, 1.23);
        assert_eq!(rule.finding_id, Some(FindingKind::TableMissing));
    }
}

//! Entity Clarity: organization/person entities, naming and `sameAs` links.

use super::{into_pillar, Check};
use crate::result::{FindingKind, PillarName, RuleEvaluation};
use crate::signals::AuditSignals;

/// Evaluate the Entity Clarity rules.
#[must_use]
pub fn evaluate(signals: &AuditSignals) -> Vec<RuleEvaluation> {
    let both_entities = signals.organization_schema && signals.person_or_product_schema;
    let entity_score = if both_entities {
        4.0
    } else if signals.organization_schema {
        2.0
    } else {
        1.0
    };

    let same_as_score = match signals.same_as_count {
        0 => 0.0,
        1 => 1.0,
        _ => 3.0,
    };

    into_pillar(
        PillarName::EntityClarity,
        vec![
            Check {
                id: "entity_schema_pairs",
                title: "Organization + Person/Product schema",
                max: 4.0,
                score: entity_score,
                passed: both_entities,
                finding: FindingKind::EntitySchemaMissing,
                evidence: None,
            },
            Check {
                id: "entity_name_consistency",
                title: "Consistent H1/title naming",
                max: 3.0,
                score: if signals.title_matches_heading { 3.0 } else { 1.0 },
                passed: signals.title_matches_heading,
                finding: FindingKind::NameInconsistent,
                evidence: None,
            },
            Check {
                id: "entity_sameas",
                title: "`sameAs` authority links",
                max: 3.0,
                score: same_as_score,
                passed: signals.same_as_count >= 2,
                finding: FindingKind::SameasMissing,
                evidence: Some(format!("{} sameAs link(s).", signals.same_as_count)),
            },
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures;

    #[test]
    fn entity_tiers() {
        let mut signals = fixtures::healthy();
        signals.person_or_product_schema = false;
        assert_eq!(evaluate(&signals)[0].score, 2.0);

        signals.organization_schema = false;
        let rules = evaluate(&signals);
        assert_eq!(rules[0].score, 1.0);
        assert_eq!(rules[0].finding_id, Some(FindingKind::EntitySchemaMissing));
    }

    #[test]
    fn inconsistent_name_keeps_partial_credit() {
        let mut signals = fixtures::healthy();
        signals.title_matches_heading = false;
        let rules = evaluate(&signals);
        assert_eq!(rules[1].score, 1.0);
        assert_eq!(rules[1].finding_id, Some(FindingKind::NameInconsistent));
    }

    #[test]
    fn same_as_tiers() {
        let mut signals = fixtures::healthy();
        signals.same_as_count = 1;
        let rules = evaluate(&signals);
        assert_eq!(rules[2].score, 1.0);
        assert_eq!(rules[2].evidence.as_deref(), Some("1 sameAs link(s)."));

        signals.same_as_count = 0;
        assert_eq!(evaluate(&signals)[2].finding_id, Some(FindingKind::SameasMissing));
    }
}

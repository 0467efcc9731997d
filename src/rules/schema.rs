//! Schema & Structured Data: JSON-LD presence, supported types, rich properties.

use super::{into_pillar, Check};
use crate::result::{FindingKind, PillarName, RuleEvaluation};
use crate::signals::AuditSignals;

/// Evaluate the Schema & Structured Data rules.
#[must_use]
pub fn evaluate(signals: &AuditSignals) -> Vec<RuleEvaluation> {
    let has_json_ld = signals.json_ld_count > 0;
    let has_supported = signals.supported_schema_count > 0;

    into_pillar(
        PillarName::SchemaStructuredData,
        vec![
            Check {
                id: "schema_jsonld",
                title: "JSON-LD present",
                max: 6.0,
                score: if has_json_ld { 6.0 } else { 0.0 },
                passed: has_json_ld,
                finding: FindingKind::JsonldMissing,
                evidence: Some(if has_json_ld {
                    format!("{} script(s)", signals.json_ld_count)
                } else {
                    "No JSON-LD detected.".to_string()
                }),
            },
            Check {
                id: "schema_supported_types",
                title: "Supported schema types (Article/FAQ/HowTo/Dataset)",
                max: 8.0,
                score: if has_supported { 8.0 } else { 0.0 },
                passed: has_supported,
                finding: FindingKind::JsonldMissing,
                evidence: Some(format!("{} supported block(s).", signals.supported_schema_count)),
            },
            Check {
                id: "schema_rich_properties",
                title: "Non-trivial properties (author/dates/publisher/mainEntity)",
                max: 6.0,
                score: if signals.schema_has_rich_properties { 6.0 } else { 0.0 },
                passed: signals.schema_has_rich_properties,
                finding: FindingKind::SchemaPropertiesSparse,
                evidence: None,
            },
        ],
    )
}

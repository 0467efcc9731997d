//! Result types for audit output.
//!
//! This module defines the snapshot produced per render, the dual-render
//! artifacts of one run, the scored rule trace and the final audit result.
//! Everything serializes to camelCase JSON for the run store.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants;
use crate::robots::RobotsInfo;
use crate::sitemap::SitemapMeta;

/// Image reference found in a render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// `src` attribute as written.
    pub src: String,
    /// Whitespace-folded `alt` text, empty when missing.
    pub alt: String,
}

/// Outbound anchor found in a render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundLink {
    /// Absolute target resolved against the page origin.
    pub href: String,
    /// Anchor text, clipped to 80 characters.
    pub text: String,
    /// Target host differs from the page host.
    pub is_external: bool,
}

/// Normalized structural view of one HTML render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSnapshot {
    /// `<title>` text, falling back to the first `<h1>`.
    pub title: String,
    /// Meta description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// h1–h3 text in document order.
    pub headings: Vec<String>,
    /// First 80 non-empty paragraphs, each truncated to 320 characters.
    pub paragraphs: Vec<String>,
    /// Word count per kept paragraph.
    pub paragraph_word_counts: Vec<usize>,
    /// Citation flag per kept paragraph.
    pub paragraph_has_citation: Vec<bool>,
    /// Summary vocabulary or a short first paragraph near the top.
    pub tl_dr_near_top: bool,
    /// Cited paragraphs that also use claim/evidence/attribution vocabulary.
    pub claim_evidence_blocks: usize,
    /// Cited paragraphs.
    pub claim_citation_pairs: usize,
    /// `itemtype` values of `itemscope` elements.
    pub microdata_types: Vec<String>,
    /// Word count of the first kept paragraph.
    pub first_paragraph_word_count: usize,
    /// Reference superscripts plus in-page citation anchors.
    pub reference_citation_count: usize,
    /// Characters of whitespace-folded body text.
    pub visible_text_length: usize,
    /// Words of body text.
    pub total_word_count: usize,
    /// Distinct month/year mentions, at most 10.
    pub inline_dates: Vec<String>,
    /// `<link rel="canonical">` href as written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    /// Images with a non-empty source, at most 30.
    pub images: Vec<ImageRef>,
    /// Raw `<table>` count.
    pub tables: usize,
    /// Table captions, at most 5.
    pub dataset_hints: Vec<String>,
    /// Outbound anchors, at most 40.
    pub outbound_links: Vec<OutboundLink>,
    /// First "Updated on ..." text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_on_snippet: Option<String>,
    /// Meta robots contains `noindex`.
    pub has_robots_noindex: bool,
}

/// No-JS render with transfer measurements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseRender {
    /// Snapshot of the raw HTML.
    #[serde(flatten)]
    pub snapshot: RenderSnapshot,
    /// Raw body size in bytes.
    pub bytes: usize,
    /// Time to first byte in milliseconds.
    pub ttfb_ms: f64,
}

/// JS-executed render with the console errors it produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsRenderView {
    /// Snapshot of the rendered DOM (the raw snapshot when rendering failed).
    #[serde(flatten)]
    pub snapshot: RenderSnapshot,
    /// Console error messages.
    pub console_errors: Vec<String>,
}

/// Screenshot references for both renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screenshots {
    /// JS-disabled screenshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// JS-enabled screenshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub js: Option<String>,
}

/// Everything gathered for one audit run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DualRenderArtifacts {
    /// No-JS render.
    pub base: BaseRender,
    /// JS render.
    pub js: JsRenderView,
    /// Screenshot references.
    pub screenshots: Screenshots,
    /// Inline JSON-LD objects (arrays flattened one level).
    pub json_ld: Vec<Map<String, Value>>,
    /// robots.txt verdict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub robots_txt: Option<RobotsInfo>,
    /// Sitemap freshness.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sitemap: Option<SitemapMeta>,
    /// No-JS visible text length over JS visible text length, two decimals.
    pub text_ratio_no_js: f64,
    /// JS-only headings with a fingerprint suffix.
    pub missing_headings: Vec<String>,
}

/// Input to scoring. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditContext {
    /// Audited URL.
    pub url: String,
    /// Dual-render artifacts.
    pub dual: DualRenderArtifacts,
    /// When the run started.
    pub timestamp: DateTime<Utc>,
}

/// The five fixed scoring pillars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PillarName {
    /// FAQ, TL;DR and claim/evidence structure.
    #[serde(rename = "Answer Readiness")]
    AnswerReadiness,
    /// JSON-LD presence and richness.
    #[serde(rename = "Schema & Structured Data")]
    SchemaStructuredData,
    /// No-JS text, canonical, sitemap and robots.
    #[serde(rename = "Rendering & Indexability")]
    RenderingIndexability,
    /// Dates, citations, alt text and data tables.
    #[serde(rename = "Evidence Packaging")]
    EvidencePackaging,
    /// Organization/person entities and naming.
    #[serde(rename = "Entity Clarity")]
    EntityClarity,
}

impl PillarName {
    /// All pillars in reporting order.
    pub const ALL: [Self; 5] = [
        Self::AnswerReadiness,
        Self::SchemaStructuredData,
        Self::RenderingIndexability,
        Self::EvidencePackaging,
        Self::EntityClarity,
    ];

    /// Display name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AnswerReadiness => "Answer Readiness",
            Self::SchemaStructuredData => "Schema & Structured Data",
            Self::RenderingIndexability => "Rendering & Indexability",
            Self::EvidencePackaging => "Evidence Packaging",
            Self::EntityClarity => "Entity Clarity",
        }
    }

    /// Fixed maximum score.
    #[must_use]
    pub fn max_score(self) -> f64 {
        match self {
            Self::AnswerReadiness => 25.0,
            Self::SchemaStructuredData | Self::RenderingIndexability => 20.0,
            Self::EvidencePackaging => 15.0,
            Self::EntityClarity => 10.0,
        }
    }

    /// Sum of all pillar maxima.
    #[must_use]
    pub fn total_possible() -> f64 {
        Self::ALL.iter().map(|p| p.max_score()).sum()
    }
}

impl fmt::Display for PillarName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identifiers for remediable findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// No FAQ-shaped headings.
    FaqMissing,
    /// No TL;DR near the top.
    TldrMissing,
    /// Too few claim-evidence blocks.
    ClaimEvidenceGap,
    /// Too few cited claims.
    ClaimNoCitation,
    /// No or unsupported JSON-LD.
    JsonldMissing,
    /// Schema lacks author/date/publisher/mainEntity.
    SchemaPropertiesSparse,
    /// Most text only appears after JS.
    TextRatioLow,
    /// Canonical missing or cross-host.
    CanonicalConflict,
    /// No sitemap discovered.
    SitemapMissing,
    /// Sitemap lastmod older than a year.
    SitemapStale,
    /// robots.txt or meta robots blocks indexing.
    RobotsBlocking,
    /// No inline dates.
    InlineDatesMissing,
    /// Too few outbound citations.
    OutboundLinksMissing,
    /// Images lack alt text.
    AltTextMissing,
    /// No tables or datasets.
    TableMissing,
    /// Organization/Person schema missing.
    EntitySchemaMissing,
    /// Title and H1 disagree.
    NameInconsistent,
    /// No sameAs links.
    SameasMissing,
}

impl FindingKind {
    /// Every finding kind.
    pub const ALL: [Self; 18] = [
        Self::FaqMissing,
        Self::TldrMissing,
        Self::ClaimEvidenceGap,
        Self::ClaimNoCitation,
        Self::JsonldMissing,
        Self::SchemaPropertiesSparse,
        Self::TextRatioLow,
        Self::CanonicalConflict,
        Self::SitemapMissing,
        Self::SitemapStale,
        Self::RobotsBlocking,
        Self::InlineDatesMissing,
        Self::OutboundLinksMissing,
        Self::AltTextMissing,
        Self::TableMissing,
        Self::EntitySchemaMissing,
        Self::NameInconsistent,
        Self::SameasMissing,
    ];

    /// Wire identifier (`faq_missing`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FaqMissing => "faq_missing",
            Self::TldrMissing => "tldr_missing",
            Self::ClaimEvidenceGap => "claim_evidence_gap",
            Self::ClaimNoCitation => "claim_no_citation",
            Self::JsonldMissing => "jsonld_missing",
            Self::SchemaPropertiesSparse => "schema_properties_sparse",
            Self::TextRatioLow => "text_ratio_low",
            Self::CanonicalConflict => "canonical_conflict",
            Self::SitemapMissing => "sitemap_missing",
            Self::SitemapStale => "sitemap_stale",
            Self::RobotsBlocking => "robots_blocking",
            Self::InlineDatesMissing => "inline_dates_missing",
            Self::OutboundLinksMissing => "outbound_links_missing",
            Self::AltTextMissing => "alt_text_missing",
            Self::TableMissing => "table_missing",
            Self::EntitySchemaMissing => "entity_schema_missing",
            Self::NameInconsistent => "name_inconsistent",
            Self::SameasMissing => "sameas_missing",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FindingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown finding id {s:?}"))
    }
}

/// One scored check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleEvaluation {
    /// Rule identifier (`schema_jsonld`, ...).
    pub id: String,
    /// Pillar the rule belongs to.
    pub pillar: PillarName,
    /// Human-readable title.
    pub title: String,
    /// Awarded score; negative only for penalty rows.
    pub score: f64,
    /// Maximum score; 0 for penalty rows.
    pub max: f64,
    /// Whether the check passed.
    pub passed: bool,
    /// Remediation raised by a failing rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finding_id: Option<FindingKind>,
    /// Facts behind the verdict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

/// Named score/max pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pillar {
    /// Pillar.
    pub name: PillarName,
    /// Clamped score, two decimals.
    pub score: f64,
    /// Fixed maximum.
    pub max: f64,
}

/// Low/medium/high classification for severity, impact and effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Low.
    Low,
    /// Medium.
    Medium,
    /// High.
    High,
}

/// Deduplicated, user-facing issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Finding identifier (matches a rule's `findingId`).
    pub id: String,
    /// Severity, equal to impact.
    pub severity: Level,
    /// Location hint.
    #[serde(rename = "where")]
    pub location: String,
    /// Rationale.
    pub why: String,
    /// Short fix title.
    pub fix_title: String,
    /// Markup snippet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet_html: Option<String>,
    /// Structured-data snippet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet_jsonld: Option<String>,
    /// Code snippet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet_js: Option<String>,
    /// Expected impact of the fix.
    pub impact: Level,
    /// Expected effort of the fix.
    pub effort: Level,
    /// Evidence of the first rule that raised the finding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

/// Finding promoted to the top of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopFix {
    /// Finding identifier.
    pub id: String,
    /// Expected impact.
    pub impact: Level,
    /// Expected effort.
    pub effort: Level,
    /// Rationale.
    pub why: String,
    /// Location hint.
    #[serde(rename = "where")]
    pub location: String,
    /// Markup snippet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet_html: Option<String>,
    /// Structured-data snippet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet_jsonld: Option<String>,
    /// Code snippet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet_js: Option<String>,
}

impl From<&Finding> for TopFix {
    fn from(finding: &Finding) -> Self {
        Self {
            id: finding.id.clone(),
            impact: finding.impact,
            effort: finding.effort,
            why: finding.why.clone(),
            location: finding.location.clone(),
            snippet_html: finding.snippet_html.clone(),
            snippet_jsonld: finding.snippet_jsonld.clone(),
            snippet_js: finding.snippet_js.clone(),
        }
    }
}

/// Verbatim facts shown next to the score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    /// Text ratio of the no-JS render.
    #[serde(rename = "textRatioNoJS")]
    pub text_ratio_no_js: f64,
    /// Headings of the no-JS render.
    #[serde(rename = "noJSHeadings")]
    pub no_js_headings: Vec<String>,
    /// Headings of the JS render.
    pub js_headings: Vec<String>,
    /// JS-only headings.
    pub missing_headings: Vec<String>,
    /// JSON-LD `@type` values.
    pub json_ld_types: Vec<String>,
    /// Console errors from the JS render.
    pub console_errors: Vec<String>,
    /// Screenshot references.
    pub screenshot_diffs: Screenshots,
    /// Canonical href as written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
    /// Sitemap URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sitemap: Option<String>,
    /// robots.txt URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub robots: Option<String>,
    /// "Updated on" text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_on_text: Option<String>,
    /// Sitemap lastmod.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sitemap_lastmod: Option<String>,
}

/// Publishable FAQ page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqArtifact {
    /// Suggested path, `/{slug}/faq`.
    pub recommended_path: String,
    /// Rendered markup.
    pub html: String,
    /// Equivalent FAQPage JSON-LD.
    pub jsonld: String,
    /// Source URL and generation date.
    pub provenance: String,
}

/// Optional generated artifacts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedArtifacts {
    /// FAQ page, produced when the FAQ finding fired and enough content exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faq_page: Option<FaqArtifact>,
}

/// Complete audit output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResult {
    /// Run identifier.
    pub id: String,
    /// Audited URL.
    pub url: String,
    /// Final score in `[0, 100]`.
    pub geo_score: f64,
    /// Five pillars in reporting order.
    pub pillars: Vec<Pillar>,
    /// Evidence summary.
    pub evidence: Evidence,
    /// Findings in first-seen order.
    pub findings: Vec<Finding>,
    /// Up to five fixes.
    pub top_fixes: Vec<TopFix>,
    /// Generated artifacts.
    pub generated_artifacts: GeneratedArtifacts,
    /// Every rule evaluation, penalties last.
    pub score_trace: Vec<RuleEvaluation>,
}

/// Round to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Maximum total penalty applied to a score.
#[must_use]
pub fn penalty_cap() -> f64 {
    constants::RED_FLAG_PENALTY * 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pillar_maxima_sum_to_ninety() {
        assert_eq!(PillarName::total_possible(), 90.0);
    }

    #[test]
    fn pillar_names_serialize_as_display_names() {
        let json = serde_json::to_string(&PillarName::SchemaStructuredData).unwrap();
        assert_eq!(json, "\"Schema & Structured Data\"");
    }

    #[test]
    fn finding_kind_round_trips_through_str() {
        for kind in FindingKind::ALL {
            assert_eq!(kind.as_str().parse::<FindingKind>(), Ok(kind));
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
        assert!("not_a_finding".parse::<FindingKind>().is_err());
    }

    #[test]
    fn finding_uses_where_key() {
        let finding = Finding {
            id: "x".into(),
            severity: Level::Low,
            location: "<head>".into(),
            why: "because".into(),
            fix_title: "Fix".into(),
            snippet_html: None,
            snippet_jsonld: None,
            snippet_js: None,
            impact: Level::Low,
            effort: Level::High,
            evidence: None,
        };
        let value = serde_json::to_value(&finding).unwrap();
        assert_eq!(value["where"], "<head>");
        assert_eq!(value["fixTitle"], "Fix");
        assert_eq!(value["effort"], "high");
        assert!(value.get("snippetHtml").is_none());
    }

    #[test]
    fn round2_keeps_two_decimals() {
        assert_eq!(round2(1.236), 1.24);
        assert_eq!(round2(1.0 / 3.0), 0.33);
        assert_eq!(round2(2.0), 2.0);
    }
}

//! Signal computation.
//!
//! Flattens an [`AuditContext`] into the counts, ratios and booleans the rule
//! engine reads. Pure: the same context always yields the same signals.

use url::Url;

use crate::metadata::json_ld::{self, JsonLdNode};
use crate::metadata::microdata::short_type_name;
use crate::patterns::{FAQ_HEADING, ORGANIZATION_ITEMTYPE, PERSON_ITEMTYPE};
use crate::result::AuditContext;

/// Content types that count as supported structured data.
pub const SUPPORTED_TYPES: [&str; 5] = ["Article", "BlogPosting", "FAQPage", "HowTo", "Dataset"];

const ORGANIZATION_TYPES: [&str; 2] = ["Organization", "WebSite"];
const PERSON_TYPES: [&str; 2] = ["Person", "Product"];
const RICH_PROPERTIES: [&str; 4] = ["author", "datePublished", "publisher", "mainEntityOfPage"];

/// Every fact the rule engine needs.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditSignals {
    /// Audited URL.
    pub url: String,
    /// FAQ-shaped JS headings.
    pub faq_heading_count: usize,
    /// TL;DR near the top of the JS render.
    pub tl_dr_near_top: bool,
    /// Cited paragraphs with claim vocabulary.
    pub claim_evidence_blocks: usize,
    /// Cited paragraphs.
    pub claim_citation_pairs: usize,
    /// No-JS text ratio.
    pub text_ratio_no_js: f64,
    /// Canonical resolved against the audited URL.
    pub canonical: Option<String>,
    /// A canonical link is present.
    pub canonical_exists: bool,
    /// Canonical host equals the audited host.
    pub canonical_matches_host: bool,
    /// Discovered sitemap.
    pub sitemap_url: Option<String>,
    /// Sitemap lastmod within a year.
    pub sitemap_fresh_within_365: bool,
    /// robots.txt allows the audit agent.
    pub robots_allow: bool,
    /// robots.txt location.
    pub robots_url: Option<String>,
    /// Meta robots `noindex`.
    pub meta_noindex: bool,
    /// Inline date mentions.
    pub inline_date_count: usize,
    /// Links to another host.
    pub external_link_count: usize,
    /// Reference superscripts and citation anchors.
    pub reference_citation_count: usize,
    /// Any images at all.
    pub has_images: bool,
    /// Share of images with alt text; 1.0 without images.
    pub alt_coverage: f64,
    /// `<table>` count.
    pub table_count: usize,
    /// Table captions.
    pub dataset_hint_count: usize,
    /// JSON-LD objects.
    pub json_ld_count: usize,
    /// Supported JSON-LD nodes plus supported microdata items.
    pub supported_schema_count: usize,
    /// A supported node carries author, dates, publisher and main entity.
    pub schema_has_rich_properties: bool,
    /// Organization or WebSite entity present.
    pub organization_schema: bool,
    /// Person or Product entity present.
    pub person_or_product_schema: bool,
    /// String `sameAs` entries on organization nodes.
    pub same_as_count: usize,
    /// "Updated on" text.
    pub updated_on_snippet: Option<String>,
    /// `<title>` equals the first heading, ignoring case.
    pub title_matches_heading: bool,
    /// Headings in the no-JS render.
    pub base_heading_count: usize,
    /// JSON-LD `@type` values.
    pub json_ld_types: Vec<String>,
}

/// Reduce a context into signals.
#[must_use]
pub fn compute_signals(ctx: &AuditContext) -> AuditSignals {
    let dual = &ctx.dual;
    let js = &dual.js.snapshot;
    let base = &dual.base.snapshot;
    let audited = Url::parse(&ctx.url).ok();
    let audited_host = audited.as_ref().and_then(Url::host_str).unwrap_or_default();

    let (canonical, canonical_matches_host) = match js.canonical_url.as_deref() {
        Some(raw) => match audited.as_ref().and_then(|u| u.join(raw).ok()) {
            Some(resolved) => {
                let matches = resolved.host_str().unwrap_or_default() == audited_host;
                (Some(resolved.to_string()), matches)
            }
            None => (Some(raw.to_string()), false),
        },
        None => (None, false),
    };

    let supported_nodes: Vec<&JsonLdNode> = dual
        .json_ld
        .iter()
        .filter(|node| json_ld::has_any_type(node, &SUPPORTED_TYPES))
        .collect();
    let microdata_supported = js
        .microdata_types
        .iter()
        .filter(|t| SUPPORTED_TYPES.contains(&short_type_name(t)))
        .count();

    let organization_nodes: Vec<&JsonLdNode> = dual
        .json_ld
        .iter()
        .filter(|node| json_ld::has_any_type(node, &ORGANIZATION_TYPES))
        .collect();
    let person_nodes = dual
        .json_ld
        .iter()
        .filter(|node| json_ld::has_any_type(node, &PERSON_TYPES))
        .count();

    let alt_coverage = if js.images.is_empty() {
        1.0
    } else {
        let with_alt = js.images.iter().filter(|img| !img.alt.trim().is_empty()).count();
        with_alt as f64 / js.images.len() as f64
    };

    let title_matches_heading = js.headings.first().is_some_and(|heading| {
        let title = js.title.trim().to_lowercase();
        !title.is_empty() && title == heading.trim().to_lowercase()
    });

    let robots = dual.robots_txt.as_ref();
    let sitemap = dual.sitemap.as_ref();

    AuditSignals {
        url: ctx.url.clone(),
        faq_heading_count: js.headings.iter().filter(|h| FAQ_HEADING.is_match(h)).count(),
        tl_dr_near_top: js.tl_dr_near_top,
        claim_evidence_blocks: js.claim_evidence_blocks,
        claim_citation_pairs: js.claim_citation_pairs,
        text_ratio_no_js: dual.text_ratio_no_js,
        canonical_exists: js.canonical_url.is_some(),
        canonical,
        canonical_matches_host,
        sitemap_url: sitemap.and_then(|s| s.url.clone()),
        sitemap_fresh_within_365: sitemap.is_some_and(|s| s.within_365_days),
        robots_allow: robots.is_none_or(|r| r.allow),
        robots_url: robots.map(|r| r.url.clone()).filter(|u| !u.is_empty()),
        meta_noindex: js.has_robots_noindex,
        inline_date_count: js.inline_dates.len(),
        external_link_count: js.outbound_links.iter().filter(|l| l.is_external).count(),
        reference_citation_count: js.reference_citation_count,
        has_images: !js.images.is_empty(),
        alt_coverage,
        table_count: js.tables,
        dataset_hint_count: js.dataset_hints.len(),
        json_ld_count: dual.json_ld.len(),
        supported_schema_count: supported_nodes.len() + microdata_supported,
        schema_has_rich_properties: microdata_supported > 0
            || supported_nodes
                .iter()
                .any(|node| json_ld::has_properties(node, &RICH_PROPERTIES)),
        organization_schema: !organization_nodes.is_empty()
            || js.microdata_types.iter().any(|t| ORGANIZATION_ITEMTYPE.is_match(t)),
        person_or_product_schema: person_nodes > 0
            || js.microdata_types.iter().any(|t| PERSON_ITEMTYPE.is_match(t)),
        same_as_count: organization_nodes.iter().map(|node| json_ld::same_as_count(node)).sum(),
        updated_on_snippet: js.updated_on_snippet.clone(),
        title_matches_heading,
        base_heading_count: base.headings.len(),
        json_ld_types: dual.json_ld.iter().flat_map(json_ld::declared_types).collect(),
    }
}

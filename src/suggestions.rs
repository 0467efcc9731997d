//! Suggestion synthesis.
//!
//! Maps each finding to a concrete fix: impact and effort, a rationale, a
//! location hint and ready-to-paste snippets parameterized by the audited
//! host, the page title and the run date. Dates come from the context
//! timestamp so the same context always yields the same snippets.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use url::Url;

use crate::dom::escape_html;
use crate::patterns::{SNIPPET_QUESTION, TRAILING_PUNCTUATION};
use crate::result::{AuditContext, Finding, FindingKind, Level};
use crate::url_utils;

/// Questions sampled into the inline FAQ snippet.
const SNIPPET_FAQ_QUESTIONS: usize = 3;

/// Remediation template for one finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionConfig {
    /// Expected impact.
    pub impact: Level,
    /// Expected effort.
    pub effort: Level,
    /// Short fix title.
    pub fix_title: &'static str,
    /// Rationale.
    pub why: &'static str,
    /// Location hint.
    pub location: String,
    /// Markup snippet.
    pub snippet_html: Option<String>,
    /// Structured-data snippet.
    pub snippet_jsonld: Option<String>,
    /// Code snippet.
    pub snippet_js: Option<String>,
}

impl SuggestionConfig {
    fn new(impact: Level, effort: Level, fix_title: &'static str, why: &'static str, location: impl Into<String>) -> Self {
        Self {
            impact,
            effort,
            fix_title,
            why,
            location: location.into(),
            snippet_html: None,
            snippet_jsonld: None,
            snippet_js: None,
        }
    }

    fn html(mut self, snippet: String) -> Self {
        self.snippet_html = Some(snippet);
        self
    }

    fn jsonld(mut self, value: &Value) -> Self {
        self.snippet_jsonld = Some(pretty(value));
        self
    }

    fn js(mut self, snippet: String) -> Self {
        self.snippet_js = Some(snippet);
        self
    }

    /// Generic placeholder for identifiers without a template.
    #[must_use]
    pub fn fallback() -> Self {
        Self::new(Level::Low, Level::Low, "Review recommendation", "See audit output.", "Page body")
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// Values substituted into templates.
struct TemplateVars<'a> {
    url: &'a str,
    domain: String,
    origin: String,
    path: String,
    title: String,
    iso_date: String,
    display_date: String,
    faq: Vec<(String, String)>,
}

impl<'a> TemplateVars<'a> {
    fn new(ctx: &'a AuditContext) -> Self {
        let parsed = Url::parse(&ctx.url).ok();
        let domain = parsed
            .as_ref()
            .map_or_else(|| ctx.url.clone(), url_utils::hostname);
        let origin = parsed
            .as_ref()
            .map_or_else(|| format!("https://{domain}"), url_utils::origin);
        let path = parsed
            .as_ref()
            .map_or_else(|| "/".to_string(), |u| u.path().to_string());

        let js = &ctx.dual.js.snapshot;
        let title = [js.title.as_str(), ctx.dual.base.snapshot.title.as_str()]
            .into_iter()
            .find(|t| !t.is_empty())
            .map_or_else(|| domain.clone(), ToString::to_string);

        let faq = js
            .headings
            .iter()
            .filter(|h| SNIPPET_QUESTION.is_match(h))
            .take(SNIPPET_FAQ_QUESTIONS)
            .enumerate()
            .map(|(idx, heading)| {
                let question = TRAILING_PUNCTUATION.replace(heading, "?").into_owned();
                let answer = js.paragraphs.get(idx).cloned().unwrap_or_else(|| {
                    "Add a concise, evidence-backed answer in 80–120 words.".to_string()
                });
                (question, answer)
            })
            .collect();

        Self {
            url: &ctx.url,
            domain,
            origin,
            path,
            title,
            iso_date: iso_date(ctx.timestamp),
            display_date: display_date(ctx.timestamp),
            faq,
        }
    }
}

/// `YYYY-MM-DD`.
#[must_use]
pub fn iso_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}

/// `Month D, YYYY`.
#[must_use]
pub fn display_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%B %-d, %Y").to_string()
}

/// Build the template for `kind`.
#[must_use]
pub fn suggestion_for(kind: FindingKind, ctx: &AuditContext) -> SuggestionConfig {
    let v = TemplateVars::new(ctx);
    let title_html = escape_html(&v.title);
    let domain_html = escape_html(&v.domain);

    match kind {
        FindingKind::FaqMissing => {
            let items: Vec<String> = v
                .faq
                .iter()
                .map(|(q, a)| {
                    format!(
                        "  <details class=\"faq-item\">\n    <summary>{}</summary>\n    <p>{}</p>\n  </details>",
                        escape_html(q),
                        escape_html(a)
                    )
                })
                .collect();
            let main_entity: Vec<Value> = v
                .faq
                .iter()
                .map(|(q, a)| {
                    json!({
                        "@type": "Question",
                        "name": q,
                        "acceptedAnswer": { "@type": "Answer", "text": a }
                    })
                })
                .collect();
            SuggestionConfig::new(
                Level::High,
                Level::Low,
                "Add visible FAQ with matching JSON-LD",
                "No FAQ/Q&A headings detected, so the page cannot answer common queries directly.",
                "After the section that introduces the main workflow.",
            )
            .html(format!(
                "<section aria-labelledby=\"faq-title\">\n  <h2 id=\"faq-title\">Frequently Asked Questions</h2>\n{}\n  <p class=\"provenance\">Generated from {} on {}.</p>\n</section>",
                items.join("\n"),
                escape_html(v.url),
                v.display_date
            ))
            .jsonld(&json!({
                "@context": "https://schema.org",
                "@type": "FAQPage",
                "mainEntity": main_entity,
                "mainEntityOfPage": v.url
            }))
        }
        FindingKind::TldrMissing => SuggestionConfig::new(
            Level::Medium,
            Level::Low,
            "Add TL;DR summary near the hero",
            "No TL;DR or key takeaway statements were found within the first screenful.",
            "Immediately after the hero paragraph.",
        )
        .html(
            "<section class=\"tldr\">\n  <p><strong>TL;DR</strong></p>\n  <p>{Two sentences: the main claim and the measurable outcome readers care about.}</p>\n</section>"
                .to_string(),
        ),
        FindingKind::ClaimEvidenceGap => SuggestionConfig::new(
            Level::High,
            Level::Medium,
            "Pair each claim with inline evidence",
            "Paragraphs mention benefits without citing primary sources or data.",
            "Within the first two body sections.",
        )
        .html(
            "<p>\n  <strong>Claim:</strong> {State the benefit as a measurable outcome.}\n  <strong>Evidence:</strong> According to <a href=\"https://example.org/primary-source\" rel=\"noopener\">{Source, Year}</a>, {the figure that backs the claim}.\n</p>"
                .to_string(),
        ),
        FindingKind::ClaimNoCitation => SuggestionConfig::new(
            Level::High,
            Level::Medium,
            "Add citations next to bold claims",
            "Claims are not followed by outbound, primary-source links.",
            "Wherever metrics or rankings are listed.",
        )
        .html(format!(
            "<p>\n  <strong>Claim:</strong> {title_html} {{states a measurable result}}.\n  <strong>Evidence:</strong> According to <a href=\"https://data.{domain_html}/study.csv\" rel=\"noopener\">{{Study, Year}}</a>.\n</p>"
        )),
        FindingKind::JsonldMissing => SuggestionConfig::new(
            Level::High,
            Level::Low,
            "Add Article schema describing the page",
            "No JSON-LD blocks were detected.",
            "<head>",
        )
        .jsonld(&json!({
            "@context": "https://schema.org",
            "@type": "Article",
            "headline": v.title,
            "author": { "@type": "Organization", "name": v.domain },
            "datePublished": v.iso_date,
            "dateModified": v.iso_date,
            "mainEntityOfPage": v.url,
            "publisher": { "@type": "Organization", "name": v.domain }
        })),
        FindingKind::SchemaPropertiesSparse => SuggestionConfig::new(
            Level::Medium,
            Level::Low,
            "Expand schema with author, dates, publisher, and mainEntity",
            "Schema is missing author/publisher/date properties required for rich results.",
            "<head>",
        )
        .jsonld(&json!({
            "@context": "https://schema.org",
            "@type": "Article",
            "headline": v.title,
            "author": { "@type": "Person", "name": "Please add editor name" },
            "datePublished": v.iso_date,
            "dateModified": v.iso_date,
            "publisher": {
                "@type": "Organization",
                "name": v.domain,
                "logo": { "@type": "ImageObject", "url": format!("{}/logo.png", v.origin) }
            },
            "mainEntityOfPage": v.url
        })),
        FindingKind::TextRatioLow => SuggestionConfig::new(
            Level::High,
            Level::Medium,
            "Server-render primary content to improve text_ratio_noJS",
            "Most of the copy renders only after hydration, so crawlers miss it.",
            "Page-level data fetching.",
        )
        .js(format!(
            "// Fetch page content at build/request time so it ships in the initial HTML.\nexport async function getStaticProps() {{\n  const res = await fetch(`${{process.env.CONTENT_API}}/pages{}`);\n  const page = await res.json();\n  return {{ props: {{ page }}, revalidate: 3600 }};\n}}",
            v.path
        )),
        FindingKind::CanonicalConflict => SuggestionConfig::new(
            Level::Medium,
            Level::Low,
            "Set a canonical that matches the live URL",
            "The canonical link points to a different host or is missing.",
            "<head>",
        )
        .html(format!("<link rel=\"canonical\" href=\"{}\" />", escape_html(v.url))),
        FindingKind::SitemapMissing => SuggestionConfig::new(
            Level::Medium,
            Level::Low,
            "Expose sitemap in robots.txt",
            "No sitemap file was discovered via robots.txt or default locations.",
            format!("{}/robots.txt", v.origin),
        )
        .html(format!("User-agent: *\nAllow: /\nSitemap: {}/sitemap.xml", v.origin)),
        FindingKind::SitemapStale => SuggestionConfig::new(
            Level::Medium,
            Level::Low,
            "Refresh sitemap <lastmod> within 365 days",
            "Sitemap lastmod is older than one year.",
            "Build step that writes sitemap.xml.",
        )
        .js(format!(
            "import {{ writeFileSync }} from 'node:fs';\n\nconst lastmod = new Date().toISOString().slice(0, 10);\nconst urls = [{{ loc: '{}', lastmod }}];\nconst body = urls.map(u => `<url><loc>${{u.loc}}</loc><lastmod>${{u.lastmod}}</lastmod></url>`).join('');\nconst xml = `<?xml version=\"1.0\" encoding=\"UTF-8\"?>\\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">${{body}}</urlset>`;\n\nwriteFileSync('public/sitemap.xml', xml);",
            v.url
        )),
        FindingKind::RobotsBlocking => SuggestionConfig::new(
            Level::High,
            Level::Low,
            "Allow GEO crawler access",
            "robots.txt or meta robots blocks indexing of this path.",
            format!("{}/robots.txt", v.origin),
        )
        .html(format!(
            "User-agent: *\nAllow: /\n\nUser-agent: GPTBot\nAllow: /\nSitemap: {}/sitemap.xml",
            v.origin
        )),
        FindingKind::InlineDatesMissing => SuggestionConfig::new(
            Level::Medium,
            Level::Low,
            "Add inline updated-on dates",
            "No inline dates were found near key claims.",
            "Under the heading or within stat blocks.",
        )
        .html(format!(
            "<p>\n  <time datetime=\"{}\">Updated on {}</time> – figures reviewed monthly.\n</p>",
            v.iso_date, v.display_date
        )),
        FindingKind::OutboundLinksMissing => SuggestionConfig::new(
            Level::Medium,
            Level::Medium,
            "Link to primary research for each stat",
            "Fewer than 2 outbound citations were detected.",
            "Where stats or methodologies are presented.",
        )
        .html(format!(
            "<p>\n  <strong>Evidence:</strong> Based on <a href=\"https://research.{domain_html}/report.pdf\" rel=\"noopener\">{{Report title, Year}}</a>.\n</p>"
        )),
        FindingKind::AltTextMissing => SuggestionConfig::new(
            Level::Medium,
            Level::Low,
            "Provide descriptive alt text on hero and chart images",
            "Most images lack alt text, so assistive tech and crawlers miss the context.",
            "Hero illustrations and data charts.",
        )
        .html(
            "<figure>\n  <img src=\"/images/chart.png\" alt=\"{What the chart shows, including the key number}\" />\n  <figcaption>{One-line takeaway of the figure.}</figcaption>\n</figure>"
                .to_string(),
        ),
        FindingKind::TableMissing => {
            let config = SuggestionConfig::new(
                Level::Medium,
                Level::Medium,
                "Publish structured table with downloadable CSV",
                "No tables or data downloads detected despite metrics being referenced.",
                "After the methodology section.",
            )
            .html(
                "<table>\n  <caption>{Dataset name}</caption>\n  <thead>\n    <tr><th>Period</th><th>Metric</th><th>Notes</th></tr>\n  </thead>\n  <tbody>\n    <tr><td>{…}</td><td>{…}</td><td>{…}</td></tr>\n  </tbody>\n</table>"
                    .to_string(),
            );
            config.jsonld(&json!({
                "@context": "https://schema.org",
                "@type": "Dataset",
                "name": format!("Key figures from {}", v.title),
                "description": format!("Key figures from {}.", v.title),
                "distribution": [{
                    "@type": "DataDownload",
                    "encodingFormat": "text/csv",
                    "contentUrl": format!("{}/downloads/data.csv", v.origin)
                }]
            }))
        }
        FindingKind::EntitySchemaMissing => SuggestionConfig::new(
            Level::Medium,
            Level::Low,
            "Declare Organization and Person entities",
            "Schema lacks Organization/WebSite + Person/Product definitions.",
            "<head>",
        )
        .jsonld(&json!({
            "@context": "https://schema.org",
            "@type": "Organization",
            "name": v.domain,
            "url": v.origin,
            "logo": format!("{}/logo.png", v.origin),
            "sameAs": [
                format!("https://www.linkedin.com/company/{}", v.domain),
                format!("https://twitter.com/{}", v.domain)
            ]
        })),
        FindingKind::NameInconsistent => SuggestionConfig::new(
            Level::Low,
            Level::Low,
            "Align H1, title, and schema names",
            "The H1 text does not match the <title> and schema headline.",
            "Hero heading and metadata.",
        )
        .html(format!(
            "<h1>{title_html}</h1>\n<meta property=\"og:title\" content=\"{title_html}\" />"
        )),
        FindingKind::SameasMissing => SuggestionConfig::new(
            Level::Low,
            Level::Low,
            "Add sameAs references",
            "Organization schema is missing sameAs links to public profiles.",
            "Organization JSON-LD block.",
        )
        .jsonld(&json!({
            "@context": "https://schema.org",
            "@type": "Organization",
            "name": v.domain,
            "url": v.origin,
            "sameAs": [
                format!("https://en.wikipedia.org/wiki/{}", v.domain),
                format!("https://www.crunchbase.com/organization/{}", v.domain)
            ]
        })),
    }
}

fn finding_from(id: String, config: SuggestionConfig, evidence: Option<String>) -> Finding {
    Finding {
        id,
        severity: config.impact,
        location: config.location,
        why: config.why.to_string(),
        fix_title: config.fix_title.to_string(),
        snippet_html: config.snippet_html,
        snippet_jsonld: config.snippet_jsonld,
        snippet_js: config.snippet_js,
        impact: config.impact,
        effort: config.effort,
        evidence,
    }
}

/// Build the finding for `kind`.
#[must_use]
pub fn build_finding(kind: FindingKind, ctx: &AuditContext, evidence: Option<String>) -> Finding {
    finding_from(kind.as_str().to_string(), suggestion_for(kind, ctx), evidence)
}

/// Build a finding from a raw identifier, falling back to a placeholder.
#[must_use]
pub fn build_finding_for_id(id: &str, ctx: &AuditContext, evidence: Option<String>) -> Finding {
    match id.parse::<FindingKind>() {
        Ok(kind) => build_finding(kind, ctx, evidence),
        Err(_) => finding_from(id.to_string(), SuggestionConfig::fallback(), evidence),
    }
}

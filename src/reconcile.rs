//! Dual-render reconciliation.
//!
//! Runs the extractor over the raw fetch and the JS render, substituting the
//! raw snapshot when the render is unavailable, and measures how far the two
//! diverge.

use std::collections::HashSet;
use std::fmt::Write as _;

use sha2::{Digest, Sha256};
use tracing::warn;
use url::Url;

use crate::error::Error;
use crate::extract;
use crate::metadata::collect_json_ld_from_html;
use crate::network::FetchedPage;
use crate::render::{RenderOutcome, ScreenshotOutcome};
use crate::result::{round2, BaseRender, DualRenderArtifacts, JsRenderView, Screenshots};
use crate::robots::RobotsInfo;
use crate::sitemap::SitemapMeta;

/// Hex characters kept from a heading fingerprint.
const FINGERPRINT_LEN: usize = 12;

/// Raw material gathered by the concurrent stage of a run.
#[derive(Debug)]
pub struct RenderInputs {
    /// Raw HTML fetch.
    pub page: FetchedPage,
    /// JS render, possibly unavailable.
    pub render: RenderOutcome,
    /// JS-disabled screenshot, possibly unavailable.
    pub base_screenshot: ScreenshotOutcome,
    /// robots.txt verdict.
    pub robots: RobotsInfo,
    /// Sitemap freshness.
    pub sitemap: SitemapMeta,
}

/// Merge both renders into the artifacts scored by the rule engine.
#[must_use]
pub fn reconcile(url: &Url, inputs: RenderInputs) -> DualRenderArtifacts {
    let RenderInputs {
        page,
        render,
        base_screenshot,
        robots,
        sitemap,
    } = inputs;

    let base_snapshot = extract::extract_snapshot(&page.html, url);

    let (js_snapshot, console_errors, js_screenshot, json_ld) = match render {
        RenderOutcome::Rendered(js) => (
            extract::extract_snapshot(&js.html, url),
            js.console_errors,
            js.screenshot,
            collect_json_ld_from_html(&js.html),
        ),
        RenderOutcome::Unavailable(reason) => {
            let err = Error::RenderingUnavailable(reason);
            warn!(url = %url, error = %err, "falling back to single-render mode");
            (
                base_snapshot.clone(),
                Vec::new(),
                None,
                collect_json_ld_from_html(&page.html),
            )
        }
    };

    let text_ratio_no_js = text_ratio(
        base_snapshot.visible_text_length,
        js_snapshot.visible_text_length,
    );
    let missing_headings = diff_headings(&base_snapshot.headings, &js_snapshot.headings);

    DualRenderArtifacts {
        base: BaseRender {
            snapshot: base_snapshot,
            bytes: page.bytes,
            ttfb_ms: page.ttfb_ms,
        },
        js: JsRenderView {
            snapshot: js_snapshot,
            console_errors,
        },
        screenshots: Screenshots {
            base: base_screenshot.reference(),
            js: js_screenshot,
        },
        json_ld,
        robots_txt: Some(robots),
        sitemap: Some(sitemap),
        text_ratio_no_js,
        missing_headings,
    }
}

/// No-JS length over JS length, two decimals.
///
/// The denominator is at least 1. Two empty renders are the one exception:
/// they have equal length, so they count as identical (1.0) rather than
/// 0 / 1.
#[must_use]
pub fn text_ratio(base_len: usize, js_len: usize) -> f64 {
    if base_len == 0 && js_len == 0 {
        return 1.0;
    }
    round2(base_len as f64 / js_len.max(1) as f64)
}

fn normalize_heading(heading: &str) -> String {
    heading.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// JS-only headings, case- and whitespace-folded, each suffixed with
/// `#` and a fingerprint of the heading and its position in the output.
#[must_use]
pub fn diff_headings(no_js: &[String], js: &[String]) -> Vec<String> {
    let base: HashSet<String> = no_js.iter().map(|h| normalize_heading(h)).collect();
    js.iter()
        .map(|h| normalize_heading(h))
        .filter(|h| !base.contains(h))
        .enumerate()
        .map(|(idx, text)| {
            let fingerprint = fingerprint(&format!("{text}-{idx}"));
            format!("{text}#{fingerprint}")
        })
        .collect()
}

fn fingerprint(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(FINGERPRINT_LEN);
    for byte in digest.iter().take(FINGERPRINT_LEN / 2) {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::JsRender;

    fn url() -> Url {
        Url::parse("https://example.com/post").unwrap()
    }

    fn page(html: &str) -> FetchedPage {
        FetchedPage {
            html: html.to_string(),
            bytes: html.len(),
            ttfb_ms: 42.0,
            content_type: "text/html".to_string(),
        }
    }

    fn inputs(html: &str, render: RenderOutcome) -> RenderInputs {
        RenderInputs {
            page: page(html),
            render,
            base_screenshot: ScreenshotOutcome::Unavailable("off".into()),
            robots: RobotsInfo::allow_all("https://example.com/robots.txt"),
            sitemap: SitemapMeta::default(),
        }
    }

    #[test]
    fn text_ratio_rounds_and_guards_zero() {
        assert_eq!(text_ratio(50, 200), 0.25);
        assert_eq!(text_ratio(1, 3), 0.33);
        assert_eq!(text_ratio(10, 0), 10.0);
        assert_eq!(text_ratio(0, 0), 1.0);
        assert_eq!(text_ratio(0, 10), 0.0);
    }

    #[test]
    fn diff_headings_folds_case_and_whitespace() {
        let base = vec!["Intro".to_string(), "Pricing  Plans".to_string()];
        let js = vec![
            "intro".to_string(),
            "pricing plans".to_string(),
            "FAQ".to_string(),
            "FAQ".to_string(),
        ];
        let missing = diff_headings(&base, &js);
        assert_eq!(missing.len(), 2);
        assert!(missing[0].starts_with("faq#"));
        assert!(missing[1].starts_with("faq#"));
        assert_ne!(missing[0], missing[1]);
        assert_eq!(missing[0].len(), "faq#".len() + FINGERPRINT_LEN);
        assert_eq!(missing, diff_headings(&base, &js));
    }

    #[test]
    fn unavailable_render_uses_raw_snapshot() {
        let html = r#"<html><head><title>T</title>
            <script type="application/ld+json">{"@type":"Article"}</script></head>
            <body><h1>Only</h1><p>Some body text.</p></body></html>"#;
        let dual = reconcile(&url(), inputs(html, RenderOutcome::Unavailable("timeout".into())));

        assert_eq!(dual.js.snapshot, dual.base.snapshot);
        assert_eq!(dual.text_ratio_no_js, 1.0);
        assert!(dual.missing_headings.is_empty());
        assert!(dual.js.console_errors.is_empty());
        assert_eq!(dual.json_ld.len(), 1);
        assert_eq!(dual.base.bytes, html.len());
        assert_eq!(dual.screenshots, Screenshots::default());
    }

    #[test]
    fn rendered_page_contributes_headings_and_json_ld() {
        let raw = "<html><body><div id=app></div><h1>Shell</h1></body></html>";
        let rendered = r#"<html><head><script type="application/ld+json">[{"@type":"Organization"},{"@type":"FAQPage"}]</script></head>
            <body><h1>Shell</h1><h2>What is GEO?</h2><p>Generative engine optimization explained in detail here.</p></body></html>"#;
        let render = RenderOutcome::Rendered(JsRender {
            html: rendered.to_string(),
            visible_text: String::new(),
            console_errors: vec!["boom".into()],
            screenshot: Some("js.png".into()),
        });
        let dual = reconcile(&url(), inputs(raw, render));

        assert_eq!(dual.missing_headings.len(), 1);
        assert!(dual.missing_headings[0].starts_with("what is geo?#"));
        assert!(dual.text_ratio_no_js < 0.5);
        assert_eq!(dual.json_ld.len(), 2);
        assert_eq!(dual.js.console_errors, vec!["boom"]);
        assert_eq!(dual.screenshots.js.as_deref(), Some("js.png"));
    }
}

//! Audit pipeline.
//!
//! One run validates and guards the target and reads robots.txt. A refusal
//! ends the run before the page is requested. Otherwise four independent
//! operations (raw fetch, JS render, JS-disabled screenshot, sitemap
//! discovery) are joined. A failed fetch aborts the run; rendering and
//! sitemap problems only degrade the signals. The joined
//! inputs are reconciled into an [`AuditContext`], scored and persisted.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Client;
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};
use crate::faq;
use crate::network::{self, fetch_html, guard_url};
use crate::options::AuditOptions;
use crate::reconcile::{reconcile, RenderInputs};
use crate::render::{DisabledRenderer, RenderService};
use crate::result::{AuditContext, AuditResult, FaqArtifact, FindingKind, GeneratedArtifacts};
use crate::robots::fetch_robots_info;
use crate::scoring;
use crate::sitemap::resolve_sitemap_meta;
use crate::store::{FileRunStore, RunStore};
use crate::url_utils;

/// Length of generated run identifiers.
pub const RUN_ID_LEN: usize = 21;

const RUN_ID_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Result of an FAQ-only run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaqOutcome {
    /// Enough question-shaped headings were found.
    Generated(FaqArtifact),
    /// The page has fewer than three usable questions.
    NotEnoughContent,
}

/// URL-safe run identifier derived from the URL and the run start instant.
#[must_use]
pub fn run_id(url: &str, started: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.update(started.timestamp_nanos_opt().unwrap_or_default().to_be_bytes());
    hasher
        .finalize()
        .iter()
        .take(RUN_ID_LEN)
        .map(|byte| char::from(RUN_ID_ALPHABET[usize::from(byte & 0x3f)]))
        .collect()
}

/// Runs audits against a shared HTTP client, renderer and run store.
///
/// # Example
///
/// ```no_run
/// use geo_audit::{AuditOptions, Auditor};
///
/// # async fn run() -> geo_audit::Result<()> {
/// let auditor = Auditor::new(AuditOptions::default())?;
/// let result = auditor.run_audit("https://example.com/pricing").await?;
/// println!("{} scored {}", result.url, result.geo_score);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Auditor {
    client: Client,
    options: AuditOptions,
    renderer: Arc<dyn RenderService>,
    store: Arc<dyn RunStore>,
}

impl std::fmt::Debug for Auditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auditor")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Auditor {
    /// Auditor in single-render mode, persisting to `options.store_dir`.
    pub fn new(options: AuditOptions) -> Result<Self> {
        let client = network::build_client(&options)?;
        let store = Arc::new(FileRunStore::new(options.store_dir.clone()));
        Ok(Self {
            client,
            options,
            renderer: Arc::new(DisabledRenderer),
            store,
        })
    }

    /// Use `renderer` for the JS render and screenshot.
    #[must_use]
    pub fn with_renderer(mut self, renderer: Arc<dyn RenderService>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Persist runs into `store`.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn RunStore>) -> Self {
        self.store = store;
        self
    }

    /// Options this auditor was built with.
    #[must_use]
    pub fn options(&self) -> &AuditOptions {
        &self.options
    }

    /// HTTP client shared by all runs.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Gather and reconcile everything a run scores.
    pub async fn build_context(&self, url: &str) -> Result<AuditContext> {
        let target = url_utils::parse_audit_url(url)?;
        if self.options.allow_private_networks {
            debug!(url = %target, "network guard disabled");
        } else {
            guard_url(&target).await?;
        }

        let started = Utc::now();
        let inputs = self.gather(&target, started).await?;
        let dual = reconcile(&target, inputs);

        Ok(AuditContext {
            url: target.to_string(),
            dual,
            timestamp: started,
        })
    }

    async fn gather(&self, target: &Url, started: DateTime<Utc>) -> Result<RenderInputs> {
        let robots = fetch_robots_info(&self.client, target, &self.options).await;
        if !robots.allow {
            debug!(url = %target, reason = ?robots.disallow_reason, "robots.txt refused audit");
            return Err(Error::RobotsDisallowed {
                url: target.to_string(),
            });
        }

        let fetch = async {
            fetch_html(&self.client, target, &self.options)
                .await
                .map_err(Error::from)
        };
        let render = async { Ok::<_, Error>(self.renderer.render_js(target).await) };
        let screenshot = async { Ok::<_, Error>(self.renderer.screenshot_without_js(target).await) };
        let sitemap = async {
            Ok::<_, Error>(
                resolve_sitemap_meta(
                    &self.client,
                    target,
                    &robots.sitemap_urls,
                    &self.options,
                    started,
                )
                .await,
            )
        };

        let (page, render, base_screenshot, sitemap) =
            tokio::try_join!(fetch, render, screenshot, sitemap)?;

        Ok(RenderInputs {
            page,
            render,
            base_screenshot,
            robots,
            sitemap,
        })
    }

    /// Audit `url`, persist the result and return it.
    pub async fn run_audit(&self, url: &str) -> Result<AuditResult> {
        let ctx = self.build_context(url).await?;
        let result = assemble_result(&ctx);

        info!(
            run_id = %result.id,
            url = %result.url,
            bytes = ctx.dual.base.bytes,
            ttfb_ms = ctx.dual.base.ttfb_ms,
            geo_score = result.geo_score,
            console_errors = ctx.dual.js.console_errors.len(),
            "audit complete"
        );

        self.store.put(&result).await?;
        Ok(result)
    }

    /// Run the dual-render stage only and synthesize an FAQ page.
    pub async fn generate_faq(&self, url: &str) -> Result<FaqOutcome> {
        let ctx = self.build_context(url).await?;
        Ok(match faq::maybe_generate_faq(&ctx) {
            Some(artifact) => FaqOutcome::Generated(artifact),
            None => {
                debug!(url = %ctx.url, "not enough question headings for an FAQ");
                FaqOutcome::NotEnoughContent
            }
        })
    }

    /// Load a stored run.
    pub async fn load_run(&self, id: &str) -> Result<Option<AuditResult>> {
        self.store.get(id).await
    }
}

/// Score a context into a complete result. The FAQ artifact is attached only
/// when the FAQ finding fired.
#[must_use]
pub fn assemble_result(ctx: &AuditContext) -> AuditResult {
    let scored = scoring::score_context(ctx);
    let faq_page = if scored.has_finding(FindingKind::FaqMissing) {
        faq::maybe_generate_faq(ctx)
    } else {
        None
    };

    AuditResult {
        id: run_id(&ctx.url, ctx.timestamp),
        url: ctx.url.clone(),
        geo_score: scored.geo_score,
        pillars: scored.pillars,
        evidence: scored.evidence,
        findings: scored.findings,
        top_fixes: scored.top_fixes,
        generated_artifacts: GeneratedArtifacts { faq_page },
        score_trace: scored.score_trace,
    }
}

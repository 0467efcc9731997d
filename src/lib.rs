//! # geo-audit
//!
//! Dual-render generative engine optimization (GEO) audits for single pages.
//!
//! A run fetches a page's raw HTML, asks a rendering service for the
//! JavaScript-executed DOM, reads robots.txt and the sitemap, and compares the
//! two renders. The reconciled artifacts are reduced to signals and scored by
//! five pillars of pure rules plus capped red-flag penalties. Every failed
//! rule yields a finding with copy-ready fix snippets.
//!
//! ## Quick Start
//!
//! ```no_run
//! use geo_audit::{AuditOptions, Auditor};
//!
//! # async fn run() -> geo_audit::Result<()> {
//! let auditor = Auditor::new(AuditOptions::default())?;
//! let result = auditor.run_audit("https://example.com/docs").await?;
//!
//! println!("GEO score: {}", result.geo_score);
//! for fix in &result.top_fixes {
//!     println!("- {} ({})", fix.id, fix.why);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Scoring is a pure function of an [`AuditContext`], so contexts built
//! elsewhere can be scored offline:
//!
//! ```rust
//! use chrono::Utc;
//! use geo_audit::{scoring, AuditContext, DualRenderArtifacts};
//!
//! let ctx = AuditContext {
//!     url: "https://example.com/".to_string(),
//!     dual: DualRenderArtifacts::default(),
//!     timestamp: Utc::now(),
//! };
//! let scored = scoring::score_context(&ctx);
//! assert!((0.0..=100.0).contains(&scored.geo_score));
//! ```

mod error;
mod options;
mod patterns;
mod result;

/// Tunable limits and fixed scoring constants.
pub mod constants;

/// DOM helpers over `dom_query`.
pub mod dom;

/// Character encoding detection and transcoding.
pub mod encoding;

/// Content extraction from one HTML render.
pub mod extract;

/// FAQ page synthesis.
pub mod faq;

/// Structured data (JSON-LD and microdata).
pub mod metadata;

/// HTTP client, network guard and raw fetcher.
pub mod network;

/// Audit orchestration.
pub mod pipeline;

/// Dual-render reconciliation.
pub mod reconcile;

/// Rendering service boundary.
pub mod render;

/// robots.txt resolution.
pub mod robots;

/// Pillar rules and penalties.
pub mod rules;

/// Score aggregation.
pub mod scoring;

/// Signal computation.
pub mod signals;

/// Sitemap discovery and freshness.
pub mod sitemap;

/// Run persistence.
pub mod store;

/// Fix suggestion templates.
pub mod suggestions;

/// URL validation and resolution.
pub mod url_utils;

// Public API - re-exports
pub use error::{Error, FetchError, Result};
pub use options::AuditOptions;
pub use pipeline::{Auditor, FaqOutcome};
pub use render::{DisabledRenderer, HttpRenderService, JsRender, RenderOutcome, RenderService, ScreenshotOutcome};
pub use result::{
    AuditContext, AuditResult, BaseRender, DualRenderArtifacts, Evidence, FaqArtifact, Finding,
    FindingKind, GeneratedArtifacts, ImageRef, JsRenderView, Level, OutboundLink, Pillar,
    PillarName, RenderSnapshot, RuleEvaluation, Screenshots, TopFix,
};
pub use robots::RobotsInfo;
pub use sitemap::SitemapMeta;
pub use store::{FileRunStore, MemoryRunStore, RunStore};

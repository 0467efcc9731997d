//! Command-line front end: run an audit, generate an FAQ page, or print a
//! stored run as JSON.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use geo_audit::{AuditOptions, Auditor, FaqOutcome, HttpRenderService};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Exit status for robots.txt refusals, distinct from generic failures.
const EXIT_NOT_PERMITTED: u8 = 3;

#[derive(Parser, Debug)]
#[command(
    name = "geo-audit",
    version,
    about = "Audit a single page for generative engine optimization"
)]
struct Cli {
    /// Per-request timeout for page, robots.txt and sitemap fetches, in milliseconds.
    #[arg(long, env = "GEO_AUDIT_REQUEST_TIMEOUT_MS", default_value_t = 12_000)]
    request_timeout_ms: u64,

    /// Timeout handed to the rendering service, in milliseconds.
    #[arg(long, env = "GEO_AUDIT_RENDER_TIMEOUT_MS", default_value_t = 15_000)]
    render_timeout_ms: u64,

    /// Extra attempts after a retryable fetch failure.
    #[arg(long, env = "GEO_AUDIT_RETRIES", default_value_t = 2)]
    retries: u32,

    /// Directory where audit runs are stored.
    #[arg(long, env = "GEO_AUDIT_STORE_DIR", default_value = ".geo-artifacts/runs")]
    store_dir: PathBuf,

    /// Rendering service base URL; without it audits run in single-render mode.
    #[arg(long, env = "GEO_AUDIT_RENDER_ENDPOINT")]
    render_endpoint: Option<Url>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a full audit and print the result as JSON.
    Audit {
        /// Absolute http(s) URL to audit.
        url: String,
    },
    /// Generate an FAQ page from the rendered headings.
    Faq {
        /// Absolute http(s) URL.
        url: String,
    },
    /// Print a stored run.
    Show {
        /// Run identifier.
        id: String,
    },
}

impl Cli {
    fn options(&self) -> AuditOptions {
        AuditOptions {
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            render_timeout: Duration::from_millis(self.render_timeout_ms),
            retries: self.retries,
            store_dir: self.store_dir.clone(),
            ..AuditOptions::default()
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: failed to serialize output: {err}");
            ExitCode::FAILURE
        }
    }
}

fn report(err: &geo_audit::Error) -> ExitCode {
    eprintln!("error: {err}");
    if err.is_permission_denied() {
        ExitCode::from(EXIT_NOT_PERMITTED)
    } else {
        ExitCode::FAILURE
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = cli.options();

    let mut auditor = match Auditor::new(options) {
        Ok(auditor) => auditor,
        Err(err) => return report(&err),
    };
    if let Some(endpoint) = cli.render_endpoint.clone() {
        let renderer = HttpRenderService::new(
            auditor.client().clone(),
            endpoint,
            auditor.options().render_timeout,
        );
        auditor = auditor.with_renderer(Arc::new(renderer));
    }

    match cli.command {
        Command::Audit { url } => match auditor.run_audit(&url).await {
            Ok(result) => print_json(&result),
            Err(err) => report(&err),
        },
        Command::Faq { url } => match auditor.generate_faq(&url).await {
            Ok(FaqOutcome::Generated(artifact)) => print_json(&artifact),
            Ok(FaqOutcome::NotEnoughContent) => {
                eprintln!("not enough question-shaped headings to build an FAQ");
                ExitCode::from(2)
            }
            Err(err) => report(&err),
        },
        Command::Show { id } => match auditor.load_run(&id).await {
            Ok(Some(result)) => print_json(&result),
            Ok(None) => {
                eprintln!("run {id} not found");
                ExitCode::FAILURE
            }
            Err(err) => report(&err),
        },
    }
}

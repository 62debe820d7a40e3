use anyhow::{bail, Result};
use chscraper::layout::RecordLayout;
use chscraper::resolve::{self, CompanyRegistry};
use chscraper::{batch, output};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Companies House bulk officer appointments: decode, assemble, resolve namesakes"
)]
struct Args {
    /// Archive files or glob patterns (snapshot/update fixed-width files)
    #[arg(required = true)]
    inputs: Vec<String>,

    /// CompanyName,CompanyNumber registry CSV for corporate-name linking
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Record layout file (.yaml/.yml/.json); built-in Prod195 layout if omitted
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Output CSV for the resolved table
    #[arg(long, default_value = "resolved_officers.csv")]
    output: PathBuf,

    /// Skip the de-duplication pre-pass
    #[arg(long)]
    keep_duplicates: bool,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    let args = Args::parse();

    // ─── 2) layout + inputs ──────────────────────────────────────────
    let layout = match &args.layout {
        Some(path) => RecordLayout::load(path)?,
        None => RecordLayout::prod195().clone(),
    };
    let paths = batch::expand_patterns(&args.inputs)?;
    if paths.is_empty() {
        bail!("no input files matched");
    }

    // ─── 3) decode + assemble, one worker per file ───────────────────
    let report = batch::process_files(&layout, &paths);
    if !report.failures.is_empty() {
        warn!(
            failed = report.failures.len(),
            ok = report.summaries.len(),
            "some files failed to decode; their rows are excluded"
        );
    }

    // ─── 4) de-duplicate ─────────────────────────────────────────────
    let rows = if args.keep_duplicates {
        report.rows
    } else {
        resolve::dedup_rows(report.rows)
    };

    // ─── 5) disambiguate + cluster ───────────────────────────────────
    let registry = match &args.registry {
        Some(path) => CompanyRegistry::from_csv(path)?,
        None => {
            warn!("no registry supplied; corporate links rely on name patterns only");
            CompanyRegistry::empty()
        }
    };
    let resolved = resolve::resolve_rows(&registry, rows);

    // ─── 6) write the final table ────────────────────────────────────
    output::write_resolved(&args.output, &resolved)?;
    info!(rows = resolved.len(), output = %args.output.display(), "all done");
    Ok(())
}

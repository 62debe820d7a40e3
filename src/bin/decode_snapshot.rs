//! Decode archive files to the flat appointment table, skipping identity
//! resolution. Useful for eyeballing one snapshot's rows before a full run.

use anyhow::{bail, Result};
use chscraper::layout::RecordLayout;
use chscraper::{batch, output};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(author, version, about = "Decode bulk archive files to an appointment CSV")]
struct Args {
    /// Archive files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Record layout file (.yaml/.yml/.json); built-in Prod195 layout if omitted
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Output CSV path
    #[arg(long, default_value = "officer_appointments.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();
    let layout = match &args.layout {
        Some(path) => RecordLayout::load(path)?,
        None => RecordLayout::prod195().clone(),
    };
    let paths = batch::expand_patterns(&args.inputs)?;
    if paths.is_empty() {
        bail!("no input files matched");
    }

    let report = batch::process_files(&layout, &paths);
    for summary in &report.summaries {
        info!(
            path = %summary.path.display(),
            kind = summary.kind.as_str(),
            run = %summary.run_number,
            rows = summary.row_count,
            warnings = summary.warnings.len(),
            "file decoded"
        );
    }
    output::write_appointments(&args.output, &report.rows)?;
    info!(
        rows = report.rows.len(),
        failed = report.failures.len(),
        output = %args.output.display(),
        "done"
    );
    Ok(())
}

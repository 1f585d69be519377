//! Forms Analyzer
//!
//! Batch driver for the NIGO engine. Reads a list of local PDF forms,
//! analyzes them on a bounded pool of blocking workers and writes one
//! JSON document with every result, plus an optional CSV of findings.
//!
//! ## Inputs
//!
//! Either `--file <pdf> [--source <url>]` for a single document, or
//! `--inputs <list>` with one `path [source-url]` per line. The source URL
//! is where the form was published; issuer and hosting-domain checks use
//! it instead of the local path.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use nigo_engine::{BrandRegistry, NigoEngine, ScoringWeights};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod batch;
mod inputs;
mod output;

use inputs::InputItem;

/// Command-line arguments for the forms analyzer
#[derive(Parser, Debug)]
#[command(name = "forms-analyzer")]
#[command(about = "NIGO risk and complexity analysis for PDF forms")]
struct Args {
    /// Text file with one `path [source-url]` per line
    #[arg(long, conflicts_with = "file")]
    inputs: Option<PathBuf>,

    /// Analyze a single PDF file
    #[arg(long)]
    file: Option<PathBuf>,

    /// Published URL of `--file`
    #[arg(long, requires = "file")]
    source: Option<String>,

    /// JSON output path
    #[arg(long, default_value = "data/analyses.json")]
    out: PathBuf,

    /// Optional CSV path for NIGO findings
    #[arg(long)]
    csv: Option<PathBuf>,

    /// TOML brand registry; the built-in table is used when absent
    #[arg(long)]
    brands: Option<PathBuf>,

    /// TOML scoring weight overrides
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Documents analyzed in parallel
    #[arg(short, long, default_value = "4")]
    jobs: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn items(&self) -> Result<Vec<InputItem>> {
        if let Some(file) = &self.file {
            return Ok(vec![InputItem::new(file, self.source.clone())]);
        }
        match &self.inputs {
            Some(list) => inputs::load_inputs(list),
            None => bail!("Provide --file or --inputs"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let items = args.items()?;
    if items.is_empty() {
        bail!("No documents to analyze");
    }
    info!("Loaded {} items", items.len());

    let registry = Arc::new(BrandRegistry::load_or_default(args.brands.as_deref()));
    let weights = ScoringWeights::load_or_default(args.weights.as_deref());
    info!(
        brands = registry.brands.len(),
        weights = %weights.version,
        "Configuration loaded"
    );
    let engine = Arc::new(NigoEngine::with_weights(weights));

    let results = batch::run_batch(items, engine, registry, args.jobs).await;

    output::write_json(&args.out, &results)?;
    info!("Wrote {}", args.out.display());

    if let Some(csv) = &args.csv {
        output::write_csv(csv, &results)?;
        info!("Wrote {}", csv.display());
    }

    Ok(())
}

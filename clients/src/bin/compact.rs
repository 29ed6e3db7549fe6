//! `tss-compact` — Compacts a SOSA observation graph into one TSS snippet per
//! sensor per calendar day.
//!
//! **Usage:**
//! ```
//! tss-compact -i observations.ttl [-o snippets.ttl] [--format turtle|ntriples]
//!             [--base <iri>] [--jobs <n>] [--points-datatype string|json]
//!             [--context <path>] [--verbose]
//! ```
//!
//! Without `--output` the snippet document goes to stdout. Nothing is
//! written unless compaction succeeds.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tss_clients::{init_logging, load, write, Format};
use tss_engine::model::iris::DEFAULT_BASE;
use tss_engine::serializer::{jsonld, to_syntax};
use tss_engine::{compact, CompactOptions, PointsDatatype, Syntax, TracingProgress};

/// Compact SOSA observations into TSS snippets.
#[derive(Parser)]
#[command(
    name = "tss-compact",
    version,
    about = "Compact SOSA observations into per-sensor, per-day TSS snippets"
)]
struct Args {
    /// Observation graph to read (Turtle, or N-Triples for `.nt`).
    #[arg(short, long)]
    input: PathBuf,

    /// Snippet document to write; stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output syntax; inferred from the output extension when omitted.
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Base IRI for relative references in the input.
    #[arg(long, default_value = DEFAULT_BASE)]
    base: String,

    /// Worker threads for the per-sensor fan-out.
    #[arg(long, env = "TSS_JOBS", default_value_t = 1)]
    jobs: usize,

    /// Datatype of the `tss:points` literal.
    #[arg(long, value_enum, default_value_t = PointsArg::String)]
    points_datatype: PointsArg,

    /// Also write the JSON-LD context for the points payload here.
    #[arg(long)]
    context: Option<PathBuf>,

    /// Debug-level logging for the engine.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PointsArg {
    /// `xsd:string`
    String,
    /// `rdf:JSON`
    Json,
}

impl From<PointsArg> for PointsDatatype {
    fn from(arg: PointsArg) -> Self {
        match arg {
            PointsArg::String => PointsDatatype::String,
            PointsArg::Json => PointsDatatype::Json,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let store = load(&args.input, &args.base)?;
    let options = CompactOptions {
        jobs: args.jobs.max(1),
        points_datatype: args.points_datatype.into(),
    };
    let result = compact(&store, &options, &TracingProgress)
        .with_context(|| format!("Failed to compact {}", args.input.display()))?;
    let triples = result.triples();

    match &args.output {
        Some(path) => write(path, &triples, Format::resolve(args.format, path))?,
        None => {
            let syntax = match args.format {
                Some(Format::Ntriples) => Syntax::NTriples,
                _ => Syntax::Turtle,
            };
            std::io::stdout()
                .lock()
                .write_all(to_syntax(&triples, syntax).as_bytes())
                .context("Failed to write to stdout")?;
        }
    }

    if let Some(path) = &args.context {
        let context = serde_json::to_string_pretty(&jsonld::points_context())
            .context("Failed to serialize the points context")?;
        tss_engine::write_document(path, &context)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "points context written");
    }

    let summary = &result.summary;
    tracing::info!(
        sensors = summary.sensors,
        skipped = summary.skipped,
        snippets = summary.snippets,
        observations = summary.observations,
        anomalies = summary.anomalies.len(),
        "compaction complete"
    );
    Ok(())
}

//! `tss-conformance` — Validates a snippet document, and optionally its
//! partition of the source observations.
//!
//! **Usage:**
//! ```
//! tss-conformance --output snippets.ttl [--input observations.ttl] [--base <iri>]
//! ```
//!
//! Exits non-zero if any check fails.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use tss_clients::init_logging;
use tss_conformance::{run_all, DocumentPaths};
use tss_engine::model::iris::DEFAULT_BASE;

/// Validate a TSS snippet document.
#[derive(Parser)]
#[command(
    name = "tss-conformance",
    version,
    about = "Validate a TSS snippet document against the compaction guarantees"
)]
struct Args {
    /// Snippet document to check.
    #[arg(short, long)]
    output: PathBuf,

    /// Observation graph the snippets were compacted from.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Base IRI for relative references.
    #[arg(long, default_value = DEFAULT_BASE)]
    base: String,

    /// Debug-level logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let report = run_all(&DocumentPaths {
        output: args.output,
        source: args.input,
        base: args.base,
    })?;

    println!("TSS Conformance Report");
    println!("======================");
    println!();
    for result in &report.results {
        println!("{result}");
    }

    let failed = report.failure_count();
    println!();
    println!(
        "Summary: {} passed, {} warnings, {} failed",
        report.results.len() - failed - report.warning_count(),
        report.warning_count(),
        failed
    );

    if failed > 0 {
        eprintln!("Conformance FAILED: {failed} check(s) did not pass.");
        process::exit(1);
    }

    println!("Conformance PASSED.");
    Ok(())
}

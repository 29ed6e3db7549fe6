//! `tss-prettify` — Reads a graph and writes it back through the TSS
//! serializers, without changing a single triple.
//!
//! **Usage:**
//! ```
//! tss-prettify -i in.ttl -o out.ttl [--format turtle|ntriples] [--base <iri>]
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tss_clients::{init_logging, load, write, Format};
use tss_engine::model::iris::DEFAULT_BASE;

/// Re-serialize an RDF document.
#[derive(Parser)]
#[command(name = "tss-prettify", version, about = "Re-serialize a Turtle or N-Triples document")]
struct Args {
    /// Document to read.
    #[arg(short, long)]
    input: PathBuf,

    /// Document to write.
    #[arg(short, long)]
    output: PathBuf,

    /// Output syntax; inferred from the output extension when omitted.
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Base IRI for relative references in the input.
    #[arg(long, default_value = DEFAULT_BASE)]
    base: String,

    /// Debug-level logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let store = load(&args.input, &args.base)?;
    write(
        &args.output,
        store.triples(),
        Format::resolve(args.format, &args.output),
    )
}

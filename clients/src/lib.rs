//! Plumbing shared by the `tss-*` binaries: logging setup, output format
//! selection and document I/O.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing_subscriber::{fmt, EnvFilter};
use tss_engine::{Store, Syntax, Triple};

/// Environment variable consulted for the log filter before `RUST_LOG`.
pub const LOG_ENV: &str = "TSS_LOG";

/// Installs the stderr log subscriber.
///
/// The filter comes from `TSS_LOG`, then `RUST_LOG`, then the default
/// level picked by `verbose`.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "tss_engine=debug,tss_conformance=debug,info"
    } else {
        "info"
    }
}

/// Output document syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Turtle 1.1 with `rdf`, `xsd`, `sosa` and `tss` prefixes.
    Turtle,
    /// One triple per line.
    Ntriples,
}

impl Format {
    /// The explicit choice, or the syntax implied by the output extension.
    #[must_use]
    pub fn resolve(explicit: Option<Format>, output: &Path) -> Syntax {
        match explicit {
            Some(Format::Turtle) => Syntax::Turtle,
            Some(Format::Ntriples) => Syntax::NTriples,
            None => Syntax::from_path(output),
        }
    }
}

/// Loads a Turtle or N-Triples document, logging its size.
///
/// # Errors
///
/// Returns an error if the document cannot be read or parsed.
pub fn load(path: &Path, base: &str) -> Result<Store> {
    let store =
        Store::load(path, base).with_context(|| format!("Failed to load {}", path.display()))?;
    tracing::info!(path = %path.display(), triples = store.len(), "loaded graph");
    Ok(store)
}

/// Serializes `triples` in `syntax` and writes them to `path` in one step.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write(path: &Path, triples: &[Triple], syntax: Syntax) -> Result<()> {
    let text = tss_engine::serializer::to_syntax(triples, syntax);
    tss_engine::write_document(path, &text)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), triples = triples.len(), "written");
    Ok(())
}

//! Structural conformance checks for TSS snippet documents.
//!
//! A snippet document produced by `tss-engine` is checked against the
//! properties compaction guarantees. Given the source observation graph as
//! well, the partition of observations into snippets is checked too.
//!
//! # Conformance Scope
//!
//! | Validator | Property |
//! |-----------|----------|
//! | `document/parse` | Turtle 1.1 / N-Triples syntax |
//! | `snippets/*` | payload shape, order, bounds, single day, template link |
//! | `partition/*` | every compactable observation in exactly one snippet |
//!
//! # Entry Point
//!
//! ```no_run
//! use tss_conformance::{run_all, DocumentPaths};
//! use std::path::PathBuf;
//!
//! let paths = DocumentPaths {
//!     output: PathBuf::from("snippets.ttl"),
//!     source: Some(PathBuf::from("observations.ttl")),
//!     base: tss_engine::model::iris::DEFAULT_BASE.to_owned(),
//! };
//! let report = run_all(&paths)?;
//! assert!(report.all_passed());
//! # Ok::<(), anyhow::Error>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod report;
pub mod validators;

use std::path::{Path, PathBuf};

use anyhow::Context;
use tss_engine::{LoadError, Store};

pub use report::{ConformanceReport, Severity, TestResult};

const PARSE: &str = "document/parse";

/// Documents the conformance runner reads.
#[derive(Debug, Clone)]
pub struct DocumentPaths {
    /// The snippet document under test.
    pub output: PathBuf,
    /// The observation graph it was compacted from, if available.
    pub source: Option<PathBuf>,
    /// Base IRI for relative references in either document.
    pub base: String,
}

/// Loads the documents and runs every applicable validator.
///
/// A document that does not parse is a failed check, not an error.
///
/// # Errors
///
/// Returns an error if a document cannot be read or the base IRI is
/// invalid.
pub fn run_all(paths: &DocumentPaths) -> anyhow::Result<ConformanceReport> {
    let mut report = ConformanceReport::new();
    let Some(output) = load(&paths.output, &paths.base, &mut report)? else {
        return Ok(report);
    };
    let source = match &paths.source {
        Some(path) => match load(path, &paths.base, &mut report)? {
            Some(store) => Some(store),
            None => return Ok(report),
        },
        None => None,
    };
    report.extend(validate(&output, source.as_ref()));
    Ok(report)
}

/// Runs the snippet validators over `output`, and the partition validators
/// when `source` is given.
#[must_use]
pub fn validate(output: &Store, source: Option<&Store>) -> ConformanceReport {
    let mut report = validators::snippets::validate(output);
    if let Some(source) = source {
        report.extend(validators::partition::validate(output, source));
    }
    report
}

fn load(path: &Path, base: &str, report: &mut ConformanceReport) -> anyhow::Result<Option<Store>> {
    match Store::load(path, base) {
        Ok(store) => {
            tracing::debug!(path = %path.display(), triples = store.len(), "document loaded");
            report.push(TestResult::pass(
                PARSE,
                format!("{} parses ({} triples)", path.display(), store.len()),
            ));
            Ok(Some(store))
        }
        Err(LoadError::Parse { message, .. }) => {
            report.push(TestResult::fail_with_details(
                PARSE,
                format!("{} does not parse", path.display()),
                vec![message],
            ));
            Ok(None)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to load {}", path.display())),
    }
}

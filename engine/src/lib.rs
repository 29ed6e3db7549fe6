//! Time-series snippet compaction for SOSA observation graphs.
//!
//! The `tss-engine` crate turns a graph holding one `sosa:Observation` per
//! reading into a compact graph holding one `tss:Snippet` per sensor per
//! calendar day. Each snippet carries its readings as a single JSON points
//! payload plus `tss:from` / `tss:to` bounds, and points via `tss:about` to
//! a `tss:PointTemplate` naming the sensor and the observed property.
//!
//! # Entry Point
//!
//! ```no_run
//! use std::path::Path;
//! use tss_engine::{compact, CompactOptions, Store, TracingProgress};
//! use tss_engine::model::iris::DEFAULT_BASE;
//!
//! let store = Store::load(Path::new("observations.ttl"), DEFAULT_BASE)?;
//! let result = compact(&store, &CompactOptions::default(), &TracingProgress)?;
//! let turtle = tss_engine::serializer::turtle::to_turtle(&result.triples());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Pipeline
//!
//! | Stage | Module |
//! |-------|--------|
//! | Sensor discovery | [`discovery`] |
//! | Per-sensor fetch | [`fetch`] over a [`QueryEngine`] |
//! | Day grouping | [`grouping`] |
//! | Identity minting | [`mint`] |
//! | Snippet assembly | [`assembly`] |
//! | Accumulation | [`output`] |

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod assembly;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod grouping;
pub mod mint;
pub mod model;
pub mod output;
pub mod progress;
pub mod query;
pub mod serializer;
pub mod store;

pub use engine::{compact, CompactOptions, Compaction, Summary};
pub use error::{CompactError, LoadError, QueryError, WriteError};
pub use model::{Bucket, Observation, Sensor, SensorKind, Snippet, Template, TemplateId, Term};
pub use output::{OutputGraph, PointsDatatype};
pub use progress::{Anomaly, Event, NoProgress, Progress, TracingProgress};
pub use query::{QueryEngine, Row, SelectQuery, Serialized};
pub use store::{Store, Syntax, Triple};

/// Writes a serialized document to `path` in one step.
///
/// # Errors
///
/// Returns [`WriteError::Io`] if the file cannot be written.
pub fn write_document(path: &std::path::Path, contents: &str) -> Result<(), WriteError> {
    std::fs::write(path, contents).map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })
}

//! Error types for loading, querying, compacting and writing.

use std::path::PathBuf;

/// Failure to read or parse a source document.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The document could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path of the document.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The document is not valid Turtle / N-Triples.
    #[error("failed to parse {}: {message}", path.display())]
    Parse {
        /// Path of the document (`<inline>` for in-memory text).
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
    /// The configured base IRI is not an absolute IRI.
    #[error("invalid base IRI {0:?}")]
    InvalidBase(String),
    /// The in-memory graph refused a triple.
    #[error("failed to index triple: {0}")]
    Graph(String),
}

/// Failure inside a query engine.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The engine rejected or failed to execute the query.
    #[error("query execution failed: {0}")]
    Execution(String),
}

/// Fatal data-shape errors raised while compacting.
#[derive(Debug, thiserror::Error)]
pub enum CompactError {
    /// An observation's time has no parseable calendar date.
    #[error("observation {observation} has malformed result time {time:?}")]
    MalformedTimestamp {
        /// String form of the offending observation.
        observation: String,
        /// The time value as found in the graph.
        time: String,
    },
    /// A result row lacks a variable the engine requires.
    #[error("result row for sensor {sensor} has no binding for ?{variable}")]
    MissingBinding {
        /// N3 form of the sensor being fetched.
        sensor: String,
        /// The unbound variable name.
        variable: &'static str,
    },
    /// The query engine failed.
    #[error(transparent)]
    Query(#[from] QueryError),
    /// A points payload could not be encoded.
    #[error("failed to encode points: {0}")]
    Encoding(#[from] serde_json::Error),
    /// A worker thread panicked.
    #[error("compaction worker panicked")]
    WorkerPanicked,
}

/// Failure to write an output document.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// The destination could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

//! Progress and anomaly reporting.
//!
//! The engine never writes to the console. It describes what it is doing
//! through [`Event`]s handed to an injected [`Progress`] reporter.

use chrono::NaiveDate;

use crate::model::Term;

/// A warning-level condition that does not stop the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// Distinct sensors sanitized to the same token; their minted
    /// identifiers carry a digest suffix.
    TokenCollision {
        /// The shared sanitized token.
        token: String,
        /// The sensors involved, in N3 form.
        sensors: Vec<String>,
    },
    /// A blank-node sensor has no stable identity and was skipped.
    AnonymousSensor {
        /// The blank node.
        sensor: Term,
    },
    /// A bucket mixed observed properties; its template records only the
    /// first one.
    MixedObservedProperties {
        /// The sensor, in N3 form.
        sensor: String,
        /// The bucket's day.
        day: NaiveDate,
        /// Every distinct property seen that day, in N3 form.
        properties: Vec<String>,
    },
}

/// Something the engine reports while compacting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'a> {
    /// Discovery finished.
    SensorsDiscovered {
        /// Number of sensors that will be compacted.
        count: usize,
    },
    /// A sensor returned no observations.
    SensorSkipped {
        /// The sensor.
        sensor: &'a Term,
    },
    /// A sensor's snippets were assembled.
    SensorCompacted {
        /// The sensor.
        sensor: &'a Term,
        /// Number of day buckets (and snippets).
        snippets: usize,
        /// Number of observations packed.
        observations: usize,
    },
    /// A warning-level anomaly.
    Anomaly(&'a Anomaly),
    /// The run completed.
    Finished {
        /// Total snippets produced.
        snippets: usize,
        /// Total observations packed.
        observations: usize,
    },
}

/// Receives engine events. Shared across worker threads.
pub trait Progress: Sync {
    /// Handles one event.
    fn event(&self, event: &Event<'_>);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn event(&self, _event: &Event<'_>) {}
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl Progress for TracingProgress {
    fn event(&self, event: &Event<'_>) {
        match event {
            Event::SensorsDiscovered { count } => {
                tracing::info!(sensors = count, "sensors identified");
            }
            Event::SensorSkipped { sensor } => {
                tracing::debug!(sensor = %sensor, "no observations, skipping");
            }
            Event::SensorCompacted {
                sensor,
                snippets,
                observations,
            } => {
                tracing::debug!(sensor = %sensor, snippets, observations, "sensor compacted");
            }
            Event::Anomaly(anomaly) => report_anomaly(anomaly),
            Event::Finished {
                snippets,
                observations,
            } => {
                tracing::info!(snippets, observations, "snippet graph created");
            }
        }
    }
}

fn report_anomaly(anomaly: &Anomaly) {
    match anomaly {
        Anomaly::TokenCollision { token, sensors } => {
            tracing::warn!(token = %token, sensors = ?sensors, "sensor tokens collide, hardening with digests");
        }
        Anomaly::AnonymousSensor { sensor } => {
            tracing::warn!(sensor = %sensor, "blank-node sensor has no stable identity, skipping");
        }
        Anomaly::MixedObservedProperties {
            sensor,
            day,
            properties,
        } => {
            tracing::warn!(
                sensor = %sensor,
                day = %day,
                properties = ?properties,
                "bucket mixes observed properties, template keeps the first"
            );
        }
    }
}

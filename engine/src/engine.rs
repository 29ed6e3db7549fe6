//! The compaction pipeline: discovery, then per sensor fetch, grouping and
//! assembly, accumulated into one [`OutputGraph`].
//!
//! Sensors are independent of one another. With `jobs > 1` they are spread
//! over scoped worker threads; each worker builds a private graph per
//! sensor and appends it to the shared accumulator under a mutex.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;

use crate::assembly::assemble;
use crate::discovery::discover_sensors;
use crate::error::CompactError;
use crate::fetch::fetch_observations;
use crate::grouping::group_by_day;
use crate::model::Sensor;
use crate::output::{OutputGraph, PointsDatatype};
use crate::progress::{Anomaly, Event, Progress};
use crate::query::QueryEngine;
use crate::store::Triple;

/// Configuration consumed by [`compact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactOptions {
    /// Worker threads for the per-sensor fan-out; `1` runs sequentially.
    pub jobs: usize,
    /// Datatype of the points payload literal.
    pub points_datatype: PointsDatatype,
}

impl Default for CompactOptions {
    fn default() -> Self {
        Self {
            jobs: 1,
            points_datatype: PointsDatatype::default(),
        }
    }
}

/// Counters and anomalies gathered over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Sensors discovered (blank-node sensors excluded).
    pub sensors: usize,
    /// Sensors that returned no observations.
    pub skipped: usize,
    /// Snippets produced.
    pub snippets: usize,
    /// Observations packed into snippets.
    pub observations: usize,
    /// Warning-level anomalies, in the order they were raised.
    pub anomalies: Vec<Anomaly>,
}

/// The result of a complete run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compaction {
    /// The accumulated snippets and templates.
    pub graph: OutputGraph,
    /// Run statistics.
    pub summary: Summary,
    points_datatype: PointsDatatype,
}

impl Compaction {
    /// Flattens the output graph into triples ready for serialization.
    #[must_use]
    pub fn triples(&self) -> Vec<Triple> {
        self.graph.triples(self.points_datatype)
    }
}

/// Compacts every sensor's observations into per-day snippets.
///
/// The run is all or nothing: the first data-shape or query error aborts
/// it and no partial graph is returned.
///
/// # Errors
///
/// Returns [`CompactError`] on a query failure, a result row missing a
/// binding, a malformed timestamp, or a panicked worker.
pub fn compact<E: QueryEngine>(
    engine: &E,
    options: &CompactOptions,
    progress: &dyn Progress,
) -> Result<Compaction, CompactError> {
    let discovery = discover_sensors(engine)?;
    let mut summary = Summary {
        sensors: discovery.sensors.len(),
        ..Summary::default()
    };
    for collision in discovery.collisions {
        summary.anomalies.push(Anomaly::TokenCollision {
            token: collision.token,
            sensors: collision.sensors,
        });
    }
    for sensor in discovery.anonymous {
        summary.anomalies.push(Anomaly::AnonymousSensor { sensor });
    }
    for anomaly in &summary.anomalies {
        progress.event(&Event::Anomaly(anomaly));
    }
    progress.event(&Event::SensorsDiscovered {
        count: summary.sensors,
    });

    let sensors = discovery.sensors;
    let jobs = options.jobs.clamp(1, sensors.len().max(1));
    let outputs = if jobs == 1 {
        sensors
            .iter()
            .map(|sensor| compact_sensor(engine, sensor, progress))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        fan_out(engine, &sensors, jobs, progress)?
    };

    let mut graph = OutputGraph::new();
    for output in outputs {
        if output.observations == 0 {
            summary.skipped += 1;
        }
        summary.observations += output.observations;
        summary.anomalies.extend(output.anomalies);
        graph.append(output.graph);
    }
    summary.snippets = graph.len();
    progress.event(&Event::Finished {
        snippets: summary.snippets,
        observations: summary.observations,
    });

    Ok(Compaction {
        graph,
        summary,
        points_datatype: options.points_datatype,
    })
}

struct SensorOutput {
    graph: OutputGraph,
    observations: usize,
    anomalies: Vec<Anomaly>,
}

fn compact_sensor<E: QueryEngine>(
    engine: &E,
    sensor: &Sensor,
    progress: &dyn Progress,
) -> Result<SensorOutput, CompactError> {
    let observations = fetch_observations(engine, &sensor.term)?;
    let mut output = SensorOutput {
        graph: OutputGraph::new(),
        observations: observations.len(),
        anomalies: Vec::new(),
    };
    if observations.is_empty() {
        progress.event(&Event::SensorSkipped {
            sensor: &sensor.term,
        });
        return Ok(output);
    }

    for bucket in group_by_day(observations)? {
        if let Some(anomaly) = assemble(sensor, &bucket, &mut output.graph)? {
            progress.event(&Event::Anomaly(&anomaly));
            output.anomalies.push(anomaly);
        }
    }
    progress.event(&Event::SensorCompacted {
        sensor: &sensor.term,
        snippets: output.graph.len(),
        observations: output.observations,
    });
    Ok(output)
}

/// Runs [`compact_sensor`] over `sensors` on `jobs` scoped threads. Results
/// are gathered into a shared accumulator; the first error stops the
/// remaining workers from picking up new sensors.
fn fan_out<E: QueryEngine>(
    engine: &E,
    sensors: &[Sensor],
    jobs: usize,
    progress: &dyn Progress,
) -> Result<Vec<SensorOutput>, CompactError> {
    let next = AtomicUsize::new(0);
    let failed = AtomicBool::new(false);
    let results: Mutex<Vec<SensorOutput>> = Mutex::new(Vec::with_capacity(sensors.len()));

    let worker = || -> Result<(), CompactError> {
        while !failed.load(Ordering::Relaxed) {
            let Some(sensor) = sensors.get(next.fetch_add(1, Ordering::Relaxed)) else {
                break;
            };
            match compact_sensor(engine, sensor, progress) {
                Ok(output) => results
                    .lock()
                    .map_err(|_| CompactError::WorkerPanicked)?
                    .push(output),
                Err(e) => {
                    failed.store(true, Ordering::Relaxed);
                    return Err(e);
                }
            }
        }
        Ok(())
    };

    // Every handle is joined before the first error is returned, so a
    // panicked worker never escapes the scope.
    let joined: Vec<Result<(), CompactError>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..jobs).map(|_| scope.spawn(&worker)).collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(CompactError::WorkerPanicked))
            })
            .collect()
    });
    joined.into_iter().collect::<Result<(), _>>()?;

    results.into_inner().map_err(|_| CompactError::WorkerPanicked)
}

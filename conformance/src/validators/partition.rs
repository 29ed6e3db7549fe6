//! Partition completeness against the source graph.
//!
//! Every source observation that compaction can see (typed
//! `sosa:Observation` with a sensor, a result time, a simple result and an
//! observed property) must appear in exactly one snippet. Observations of
//! blank-node sensors are skipped by compaction and only reported.

use std::collections::{BTreeMap, BTreeSet};

use tss_engine::assembly::decode_points;
use tss_engine::model::iris::{
    RDF_TYPE, SOSA_HAS_SIMPLE_RESULT, SOSA_MADE_BY_SENSOR, SOSA_OBSERVATION, SOSA_OBSERVED_PROPERTY,
    SOSA_RESULT_TIME, TSS_POINTS, TSS_SNIPPET,
};
use tss_engine::{Store, Term};

use super::instances_of;
use crate::report::{ConformanceReport, TestResult};

const COVERAGE: &str = "partition/coverage";
const UNIQUENESS: &str = "partition/uniqueness";
const UNEXPECTED: &str = "partition/unexpected";
const SKIPPED: &str = "partition/skipped";

/// Observations in `source` split by whether compaction must carry them.
#[derive(Debug, Default)]
struct Expected {
    compactable: BTreeSet<String>,
    anonymous_sensor: BTreeSet<String>,
    incomplete: BTreeSet<String>,
}

/// Checks that `output` partitions the observations of `source`.
#[must_use]
pub fn validate(output: &Store, source: &Store) -> ConformanceReport {
    let mut report = ConformanceReport::new();
    let expected = expected_observations(source);
    let seen = carried_observations(output);

    let missing: Vec<String> = expected
        .compactable
        .iter()
        .filter(|id| !seen.contains_key(*id))
        .cloned()
        .collect();
    if missing.is_empty() {
        report.push(TestResult::pass(
            COVERAGE,
            format!("all {} observations appear in a snippet", expected.compactable.len()),
        ));
    } else {
        report.push(TestResult::fail_with_details(
            COVERAGE,
            format!("{} observations appear in no snippet", missing.len()),
            missing,
        ));
    }

    let repeated: Vec<String> = seen
        .iter()
        .filter(|(_, snippets)| snippets.len() > 1)
        .map(|(id, snippets)| format!("{id}: {}", snippets.join(", ")))
        .collect();
    if repeated.is_empty() {
        report.push(TestResult::pass(
            UNIQUENESS,
            "no observation appears in more than one snippet",
        ));
    } else {
        report.push(TestResult::fail_with_details(
            UNIQUENESS,
            format!("{} observations appear in several snippets", repeated.len()),
            repeated,
        ));
    }

    let unexpected: Vec<String> = seen
        .keys()
        .filter(|id| !expected.compactable.contains(*id))
        .cloned()
        .collect();
    if !unexpected.is_empty() {
        report.push(TestResult::warn_with_details(
            UNEXPECTED,
            format!("{} snippet points have no source observation", unexpected.len()),
            unexpected,
        ));
    }

    for (set, why) in [
        (&expected.anonymous_sensor, "made by a blank-node sensor"),
        (&expected.incomplete, "missing time, result, property or type"),
    ] {
        if !set.is_empty() {
            report.push(TestResult::warn_with_details(
                SKIPPED,
                format!("{} source observations {why} are not compacted", set.len()),
                set.iter().cloned().collect(),
            ));
        }
    }
    report
}

fn expected_observations(source: &Store) -> Expected {
    let observation = Term::iri(SOSA_OBSERVATION);
    let mut expected = Expected::default();
    for triple in source.with_predicate(SOSA_MADE_BY_SENSOR) {
        let (subject, sensor) = (&triple[0], &triple[2]);
        let id = subject.value().to_owned();
        let complete = has_type(source, subject, &observation)
            && [SOSA_RESULT_TIME, SOSA_HAS_SIMPLE_RESULT, SOSA_OBSERVED_PROPERTY]
                .iter()
                .all(|p| source.objects(subject, p).next().is_some());
        if !complete {
            expected.incomplete.insert(id);
        } else if matches!(sensor, Term::BlankNode(_)) {
            expected.anonymous_sensor.insert(id);
        } else {
            expected.compactable.insert(id);
        }
    }
    // An observation with one resource and one blank-node sensor is still
    // compacted through the resource.
    for id in &expected.compactable {
        expected.anonymous_sensor.remove(id);
    }
    expected
}

fn has_type(store: &Store, subject: &Term, class: &Term) -> bool {
    store
        .objects(subject, RDF_TYPE)
        .any(|c| c == *class)
}

/// Observation id -> IRIs of the snippets carrying it.
fn carried_observations(output: &Store) -> BTreeMap<String, Vec<String>> {
    let mut seen: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for snippet in instances_of(output, TSS_SNIPPET) {
        for payload in output.objects(&snippet, TSS_POINTS) {
            let Ok(points) = decode_points(payload.value()) else {
                continue;
            };
            for point in points {
                seen.entry(point.id)
                    .or_default()
                    .push(snippet.value().to_owned());
            }
        }
    }
    seen
}

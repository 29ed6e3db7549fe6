//! End-to-end compaction: Turtle in, snippet graph out, read back.

use std::collections::BTreeMap;

use tss_engine::assembly::decode_points;
use tss_engine::grouping::calendar_day;
use tss_engine::model::iris;
use tss_engine::serializer::{ntriples, turtle};
use tss_engine::{compact, CompactOptions, NoProgress, PointsDatatype, Store, Syntax, Term};

const SOURCE: &str = r#"
@prefix sosa: <http://www.w3.org/ns/sosa/> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
@prefix ex: <http://ex.org/> .

ex:o1 a sosa:Observation ;
    sosa:madeBySensor ex:S1 ;
    sosa:observedProperty ex:P1 ;
    sosa:resultTime "2024-01-01T08:00:00"^^xsd:dateTime ;
    sosa:hasSimpleResult "10" .

ex:o3 a sosa:Observation ;
    sosa:madeBySensor ex:S1 ;
    sosa:observedProperty ex:P1 ;
    sosa:resultTime "2024-01-02T08:00:00"^^xsd:dateTime ;
    sosa:hasSimpleResult "9" .

ex:o2 a sosa:Observation ;
    sosa:madeBySensor ex:S1 ;
    sosa:observedProperty ex:P1 ;
    sosa:resultTime "2024-01-01T09:00:00"^^xsd:dateTime ;
    sosa:hasSimpleResult "12" .

ex:l1 a sosa:Observation ;
    sosa:madeBySensor "24002042" ;
    sosa:observedProperty ex:P2 ;
    sosa:resultTime "2024-03-05T06:15:00"^^xsd:dateTime ;
    sosa:hasSimpleResult "3.5" .

ex:l2 a sosa:Observation ;
    sosa:madeBySensor "24002043" ;
    sosa:observedProperty ex:P2 ;
    sosa:resultTime "2024-03-05T06:15:00"^^xsd:dateTime ;
    sosa:hasSimpleResult "4.5" .
"#;

fn load(text: &str) -> Store {
    match Store::parse_str(text, Syntax::Turtle, iris::DEFAULT_BASE) {
        Ok(store) => store,
        Err(e) => panic!("document must parse: {e}"),
    }
}

fn compact_to_turtle(text: &str, jobs: usize) -> String {
    let options = CompactOptions {
        jobs,
        points_datatype: PointsDatatype::String,
    };
    match compact(&load(text), &options, &NoProgress) {
        Ok(result) => turtle::to_turtle(&result.triples()),
        Err(e) => panic!("compaction must succeed: {e}"),
    }
}

/// Snippet IRI -> (points payload, from, to, madeBySensor, observedProperty).
fn read_snippets(output: &Store) -> BTreeMap<String, (String, String, String, Term, Term)> {
    let mut snippets = BTreeMap::new();
    for triple in output.with_predicate(iris::TSS_POINTS) {
        let subject = &triple[0];
        let one = |p: &'static str| output.objects(subject, p).next();
        let about = one(iris::TSS_ABOUT);
        let template = |p: &'static str| {
            about
                .as_ref()
                .and_then(|node| output.objects(node, p).next())
        };
        let (Some(from), Some(to), Some(sensor), Some(property)) = (
            one(iris::TSS_FROM),
            one(iris::TSS_TO),
            template(iris::SOSA_MADE_BY_SENSOR),
            template(iris::SOSA_OBSERVED_PROPERTY),
        ) else {
            panic!("snippet {subject} is incomplete");
        };
        snippets.insert(
            subject.value().to_owned(),
            (
                triple[2].value().to_owned(),
                from.value().to_owned(),
                to.value().to_owned(),
                sensor,
                property,
            ),
        );
    }
    snippets
}

#[test]
fn resource_sensor_splits_into_two_days() {
    let output = load(&compact_to_turtle(SOURCE, 1));
    let snippets = read_snippets(&output);

    let day1 = "https://example.org/tss/snippet/http%3A%2F%2Fex.org%2FS1_20240101080000";
    let day2 = "https://example.org/tss/snippet/http%3A%2F%2Fex.org%2FS1_20240102080000";

    let (points, from, to, sensor, property) = &snippets[day1];
    let values: Vec<_> = decode_points(points)
        .unwrap_or_default()
        .into_iter()
        .map(|p| p.value)
        .collect();
    assert_eq!(values, ["10", "12"]);
    assert_eq!(from, "2024-01-01T08:00:00");
    assert_eq!(to, "2024-01-01T09:00:00");
    assert_eq!(*sensor, Term::iri("http://ex.org/S1"));
    assert_eq!(*property, Term::iri("http://ex.org/P1"));

    let (points, from, to, _, _) = &snippets[day2];
    assert_eq!(decode_points(points).map(|p| p.len()).ok(), Some(1));
    assert_eq!(from, "2024-01-02T08:00:00");
    assert_eq!(from, to);
}

#[test]
fn literal_sensors_get_distinct_minted_iris() {
    let output = load(&compact_to_turtle(SOURCE, 1));
    let snippets = read_snippets(&output);

    let a = &snippets["https://example.org/tss/snippet/24002042_20240305061500"];
    let b = &snippets["https://example.org/tss/snippet/24002043_20240305061500"];
    assert_eq!(a.3, Term::iri("http://example.org/sensor/24002042"));
    assert_eq!(b.3, Term::iri("http://example.org/sensor/24002043"));
    assert_ne!(a.3, b.3);
}

#[test]
fn every_observation_lands_in_exactly_one_snippet() {
    let output = load(&compact_to_turtle(SOURCE, 2));
    let mut seen = BTreeMap::new();
    for (points, from, to, _, _) in read_snippets(&output).values() {
        let points = decode_points(points).unwrap_or_default();
        assert!(!points.is_empty());

        // Bounds, order and single-day properties.
        assert_eq!(points.first().map(|p| &p.time), Some(from));
        assert_eq!(points.last().map(|p| &p.time), Some(to));
        assert!(points.windows(2).all(|w| w[0].time <= w[1].time));
        let day = calendar_day(from);
        assert!(points.iter().all(|p| calendar_day(&p.time) == day));

        for point in points {
            *seen.entry(point.id).or_insert(0) += 1;
        }
    }
    let expected = [
        "http://ex.org/l1",
        "http://ex.org/l2",
        "http://ex.org/o1",
        "http://ex.org/o2",
        "http://ex.org/o3",
    ];
    assert_eq!(seen.keys().map(String::as_str).collect::<Vec<_>>(), expected);
    assert!(seen.values().all(|&n| n == 1));
}

#[test]
fn end_of_day_reading_closes_its_snippet() {
    let source = r#"
@prefix sosa: <http://www.w3.org/ns/sosa/> .
@prefix ex: <http://ex.org/> .
ex:late a sosa:Observation ; sosa:madeBySensor ex:S1 ; sosa:observedProperty ex:P1 ;
    sosa:resultTime "2024-01-01T24:00:00" ; sosa:hasSimpleResult "2" .
ex:early a sosa:Observation ; sosa:madeBySensor ex:S1 ; sosa:observedProperty ex:P1 ;
    sosa:resultTime "2024-01-01T08:00:00" ; sosa:hasSimpleResult "1" .
"#;
    let output = load(&compact_to_turtle(source, 1));
    let snippets = read_snippets(&output);
    assert_eq!(snippets.len(), 1);
    let Some((points, from, to, _, _)) = snippets.values().next() else {
        panic!("one snippet expected");
    };
    assert_eq!(from, "2024-01-01T08:00:00");
    assert_eq!(to, "2024-01-01T24:00:00");
    let values: Vec<_> = decode_points(points)
        .unwrap_or_default()
        .into_iter()
        .map(|p| p.value)
        .collect();
    assert_eq!(values, ["1", "2"]);
}

#[test]
fn unreadable_time_part_aborts_the_run() {
    let source = r#"
@prefix sosa: <http://www.w3.org/ns/sosa/> .
@prefix ex: <http://ex.org/> .
ex:o a sosa:Observation ; sosa:madeBySensor ex:S1 ; sosa:observedProperty ex:P1 ;
    sosa:resultTime "2024-01-01Tnoon" ; sosa:hasSimpleResult "1" .
"#;
    let result = compact(&load(source), &CompactOptions::default(), &NoProgress);
    assert!(matches!(
        result,
        Err(tss_engine::CompactError::MalformedTimestamp { ref time, .. }) if time == "2024-01-01Tnoon"
    ));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let first = compact_to_turtle(SOURCE, 1);
    assert_eq!(first, compact_to_turtle(SOURCE, 1));
    assert_eq!(first, compact_to_turtle(SOURCE, 3));
}

#[test]
fn ntriples_output_reads_back_to_the_same_graph() {
    let result = match compact(&load(SOURCE), &CompactOptions::default(), &NoProgress) {
        Ok(result) => result,
        Err(e) => panic!("compaction must succeed: {e}"),
    };
    let triples = result.triples();
    let nt = ntriples::to_ntriples(&triples);
    let reread = match Store::parse_str(&nt, Syntax::NTriples, iris::DEFAULT_BASE) {
        Ok(store) => store,
        Err(e) => panic!("N-Triples output must parse: {e}"),
    };
    assert_eq!(reread.len(), triples.len());
    assert_eq!(reread.len(), 4 * 9);
}

#[test]
fn rdf_json_payload_datatype_is_applied() {
    let options = CompactOptions {
        jobs: 1,
        points_datatype: PointsDatatype::Json,
    };
    let Ok(result) = compact(&load(SOURCE), &options, &NoProgress) else {
        panic!("compaction must succeed");
    };
    let payloads: Vec<_> = result
        .triples()
        .into_iter()
        .filter(|t| t[1] == Term::iri(iris::TSS_POINTS))
        .collect();
    assert_eq!(payloads.len(), 4);
    assert!(payloads
        .iter()
        .all(|t| matches!(&t[2], Term::Literal(l) if l.datatype == iris::RDF_JSON)));
}

#[test]
fn graph_without_observations_compacts_to_nothing() {
    let Ok(result) = compact(
        &load("<http://ex.org/a> <http://ex.org/b> <http://ex.org/c> ."),
        &CompactOptions::default(),
        &NoProgress,
    ) else {
        panic!("empty compaction must succeed");
    };
    assert!(result.graph.is_empty());
    assert_eq!(result.summary.sensors, 0);
}

#[test]
fn documents_round_trip_through_files() {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(e) => panic!("tempdir: {e}"),
    };
    let input = dir.path().join("observations.ttl");
    let output = dir.path().join("snippets.nt");
    assert!(tss_engine::write_document(&input, SOURCE).is_ok());

    let store = match Store::load(&input, iris::DEFAULT_BASE) {
        Ok(store) => store,
        Err(e) => panic!("load: {e}"),
    };
    let Ok(result) = compact(&store, &CompactOptions::default(), &NoProgress) else {
        panic!("compaction must succeed");
    };
    let text = tss_engine::serializer::to_syntax(&result.triples(), Syntax::from_path(&output));
    assert!(tss_engine::write_document(&output, &text).is_ok());

    let reread = match Store::load(&output, iris::DEFAULT_BASE) {
        Ok(store) => store,
        Err(e) => panic!("reload: {e}"),
    };
    assert_eq!(reread.len(), result.triples().len());
}

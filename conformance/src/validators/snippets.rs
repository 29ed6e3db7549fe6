//! Per-snippet structure checks.
//!
//! | Validator | Check |
//! |-----------|-------|
//! | `snippets/points` | exactly one payload, a non-empty JSON array of string-valued entries |
//! | `snippets/order` | entries in non-decreasing time order |
//! | `snippets/bounds` | `tss:from` / `tss:to` are `xsd:dateTime` and equal the first and last entry |
//! | `snippets/day` | every entry falls on the same calendar date |
//! | `snippets/template` | `tss:pointType sosa:Observation` and a `tss:about` template naming sensor and property |

use tss_engine::assembly::{decode_points, Point};
use tss_engine::grouping::{calendar_day, Timestamp};
use tss_engine::model::iris::{
    RDF_TYPE, SOSA_MADE_BY_SENSOR, SOSA_OBSERVATION, SOSA_OBSERVED_PROPERTY, TSS_ABOUT, TSS_FROM,
    TSS_POINTS, TSS_POINT_TEMPLATE, TSS_POINT_TYPE, TSS_SNIPPET, TSS_TO, XSD_DATETIME,
};
use tss_engine::{Store, Term};

use super::{exactly_one, instances_of};
use crate::report::{ConformanceReport, TestResult};

const POINTS: &str = "snippets/points";
const ORDER: &str = "snippets/order";
const BOUNDS: &str = "snippets/bounds";
const DAY: &str = "snippets/day";
const TEMPLATE: &str = "snippets/template";

#[derive(Default)]
struct Findings {
    points: Vec<String>,
    order: Vec<String>,
    bounds: Vec<String>,
    day: Vec<String>,
    template: Vec<String>,
}

/// Checks every `tss:Snippet` in `output`.
#[must_use]
pub fn validate(output: &Store) -> ConformanceReport {
    let mut report = ConformanceReport::new();
    let snippets = instances_of(output, TSS_SNIPPET);
    if snippets.is_empty() {
        report.push(TestResult::warn(POINTS, "document holds no tss:Snippet"));
        return report;
    }

    let mut findings = Findings::default();
    for snippet in &snippets {
        check_template(output, snippet, &mut findings.template);
        match read_points(output, snippet) {
            Ok(points) => {
                check_order(snippet, &points, &mut findings.order);
                check_bounds(output, snippet, &points, &mut findings.bounds);
                check_day(snippet, &points, &mut findings.day);
            }
            Err(detail) => findings.points.push(detail),
        }
    }

    let n = snippets.len();
    summarize(&mut report, POINTS, findings.points, || {
        format!("{n} snippets carry a well-formed points payload")
    });
    summarize(&mut report, ORDER, findings.order, || {
        format!("{n} snippets list points in time order")
    });
    summarize(&mut report, BOUNDS, findings.bounds, || {
        format!("{n} snippets have from/to matching their first and last point")
    });
    summarize(&mut report, DAY, findings.day, || {
        format!("{n} snippets stay within one calendar day")
    });
    summarize(&mut report, TEMPLATE, findings.template, || {
        format!("{n} snippets link to a complete point template")
    });
    report
}

fn summarize(
    report: &mut ConformanceReport,
    validator: &str,
    details: Vec<String>,
    passed: impl FnOnce() -> String,
) {
    if details.is_empty() {
        report.push(TestResult::pass(validator, passed()));
    } else {
        report.push(TestResult::fail_with_details(
            validator,
            format!("{} violation(s)", details.len()),
            details,
        ));
    }
}

fn read_points(output: &Store, snippet: &Term) -> Result<Vec<Point>, String> {
    let payload = match exactly_one(output, snippet, TSS_POINTS)? {
        Term::Literal(literal) => literal.lexical,
        other => return Err(format!("{snippet}: points is not a literal but {other}")),
    };
    let points =
        decode_points(&payload).map_err(|e| format!("{snippet}: points do not decode: {e}"))?;
    if points.is_empty() {
        return Err(format!("{snippet}: points array is empty"));
    }
    Ok(points)
}

fn check_order(snippet: &Term, points: &[Point], details: &mut Vec<String>) {
    let key = |p: &Point| {
        let timestamp = Timestamp::parse(&p.time);
        (timestamp.is_none(), timestamp, p.time.clone())
    };
    if let Some(pair) = points.windows(2).find(|w| key(&w[0]) > key(&w[1])) {
        details.push(format!(
            "{snippet}: {} ({}) precedes {} ({})",
            pair[0].id, pair[0].time, pair[1].id, pair[1].time
        ));
    }
}

fn check_bounds(output: &Store, snippet: &Term, points: &[Point], details: &mut Vec<String>) {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return;
    };
    for (predicate, expected) in [(TSS_FROM, &first.time), (TSS_TO, &last.time)] {
        match exactly_one(output, snippet, predicate) {
            Ok(Term::Literal(bound)) if bound.datatype != XSD_DATETIME => details.push(format!(
                "{snippet}: <{predicate}> is typed <{}>, not xsd:dateTime",
                bound.datatype
            )),
            Ok(Term::Literal(bound)) if bound.lexical != *expected => details.push(format!(
                "{snippet}: <{predicate}> is {} but the points say {expected}",
                bound.lexical
            )),
            Ok(Term::Literal(_)) => {}
            Ok(other) => details.push(format!("{snippet}: <{predicate}> is not a literal: {other}")),
            Err(detail) => details.push(detail),
        }
    }
}

fn check_day(snippet: &Term, points: &[Point], details: &mut Vec<String>) {
    let mut days = points.iter().map(|p| (p, calendar_day(&p.time)));
    let Some((_, day)) = days.next() else {
        return;
    };
    if day.is_none() {
        details.push(format!("{snippet}: first point has no calendar date"));
        return;
    }
    if let Some((point, other)) = days.find(|(_, d)| *d != day) {
        let other = other.map_or_else(|| "no date".to_owned(), |d| d.to_string());
        details.push(format!("{snippet}: {} falls on {other}", point.id));
    }
}

fn check_template(output: &Store, snippet: &Term, details: &mut Vec<String>) {
    match exactly_one(output, snippet, TSS_POINT_TYPE) {
        Ok(t) if t == Term::iri(SOSA_OBSERVATION) => {}
        Ok(t) => details.push(format!("{snippet}: pointType is {t}")),
        Err(detail) => details.push(detail),
    }
    let template = match exactly_one(output, snippet, TSS_ABOUT) {
        Ok(template) => template,
        Err(detail) => {
            details.push(detail);
            return;
        }
    };
    if !output
        .objects(&template, RDF_TYPE)
        .any(|c| c == Term::iri(TSS_POINT_TEMPLATE))
    {
        details.push(format!("{snippet}: template {template} is not a tss:PointTemplate"));
    }
    match exactly_one(output, &template, SOSA_MADE_BY_SENSOR) {
        Ok(sensor) if sensor.is_iri() => {}
        Ok(sensor) => details.push(format!("{snippet}: template sensor {sensor} is not an IRI")),
        Err(detail) => details.push(detail),
    }
    if let Err(detail) = exactly_one(output, &template, SOSA_OBSERVED_PROPERTY) {
        details.push(detail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tss_engine::model::iris::DEFAULT_BASE;
    use tss_engine::Syntax;

    const PREFIXES: &str = r#"
@prefix sosa: <http://www.w3.org/ns/sosa/> .
@prefix tss: <https://w3id.org/tss#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
@prefix ex: <http://ex.org/> .
"#;

    fn store(body: &str) -> Store {
        match Store::parse_str(&format!("{PREFIXES}{body}"), Syntax::Turtle, DEFAULT_BASE) {
            Ok(store) => store,
            Err(e) => panic!("fixture must parse: {e}"),
        }
    }

    fn failing(report: &ConformanceReport) -> Vec<&str> {
        report
            .results
            .iter()
            .filter(|r| r.is_failure())
            .map(|r| r.validator.as_str())
            .collect()
    }

    const TEMPLATE_NODE: &str = r#"
_:t a tss:PointTemplate ; sosa:madeBySensor ex:S1 ; sosa:observedProperty ex:P1 .
"#;

    #[test]
    fn well_formed_snippet_passes_every_check() {
        let report = validate(&store(&format!(
            r#"{TEMPLATE_NODE}
ex:s a tss:Snippet ;
    tss:points "[{{\"time\":\"2024-01-01T08:00:00\",\"value\":\"10\",\"id\":\"http://ex.org/o1\",\"observedProperty\":\"http://ex.org/P1\"}},{{\"time\":\"2024-01-01T09:00:00\",\"value\":\"12\",\"id\":\"http://ex.org/o2\",\"observedProperty\":\"http://ex.org/P1\"}}]" ;
    tss:from "2024-01-01T08:00:00"^^xsd:dateTime ;
    tss:to "2024-01-01T09:00:00"^^xsd:dateTime ;
    tss:pointType sosa:Observation ;
    tss:about _:t .
"#
        )));
        assert!(report.all_passed(), "{:#?}", report.results);
        assert_eq!(report.results.len(), 5);
    }

    #[test]
    fn unordered_points_and_wrong_bounds_fail() {
        let report = validate(&store(&format!(
            r#"{TEMPLATE_NODE}
ex:s a tss:Snippet ;
    tss:points "[{{\"time\":\"2024-01-01T09:00:00\",\"value\":\"12\",\"id\":\"o2\",\"observedProperty\":\"p\"}},{{\"time\":\"2024-01-01T08:00:00\",\"value\":\"10\",\"id\":\"o1\",\"observedProperty\":\"p\"}}]" ;
    tss:from "2024-01-01T08:00:00"^^xsd:dateTime ;
    tss:to "2024-01-01T09:00:00" ;
    tss:pointType sosa:Observation ;
    tss:about _:t .
"#
        )));
        assert_eq!(failing(&report), [ORDER, BOUNDS]);
    }

    #[test]
    fn points_spanning_two_days_fail() {
        let report = validate(&store(&format!(
            r#"{TEMPLATE_NODE}
ex:s a tss:Snippet ;
    tss:points "[{{\"time\":\"2024-01-01T23:00:00\",\"value\":\"1\",\"id\":\"a\",\"observedProperty\":\"p\"}},{{\"time\":\"2024-01-02T01:00:00\",\"value\":\"2\",\"id\":\"b\",\"observedProperty\":\"p\"}}]" ;
    tss:from "2024-01-01T23:00:00"^^xsd:dateTime ;
    tss:to "2024-01-02T01:00:00"^^xsd:dateTime ;
    tss:pointType sosa:Observation ;
    tss:about _:t .
"#
        )));
        assert_eq!(failing(&report), [DAY]);
    }

    #[test]
    fn numeric_values_do_not_decode() {
        let report = validate(&store(&format!(
            r#"{TEMPLATE_NODE}
ex:s a tss:Snippet ;
    tss:points "[{{\"time\":\"2024-01-01T08:00:00\",\"value\":10,\"id\":\"a\",\"observedProperty\":\"p\"}}]" ;
    tss:from "2024-01-01T08:00:00"^^xsd:dateTime ;
    tss:to "2024-01-01T08:00:00"^^xsd:dateTime ;
    tss:pointType sosa:Observation ;
    tss:about _:t .
"#
        )));
        assert_eq!(failing(&report), [POINTS]);
    }

    #[test]
    fn incomplete_template_fails() {
        let report = validate(&store(
            r#"
_:t a tss:PointTemplate ; sosa:madeBySensor "24002042" .
ex:s a tss:Snippet ;
    tss:points "[{\"time\":\"2024-01-01T08:00:00\",\"value\":\"1\",\"id\":\"a\",\"observedProperty\":\"p\"}]" ;
    tss:from "2024-01-01T08:00:00"^^xsd:dateTime ;
    tss:to "2024-01-01T08:00:00"^^xsd:dateTime ;
    tss:pointType sosa:Observation ;
    tss:about _:t .
"#,
        ));
        let template = report.by_validator(TEMPLATE).next();
        assert!(template.is_some_and(|r| r.is_failure() && r.details.len() == 2));
    }

    #[test]
    fn empty_document_only_warns() {
        let report = validate(&store("ex:a ex:b ex:c ."));
        assert!(report.all_passed());
        assert_eq!(report.warning_count(), 1);
    }
}

//! Snippet assembly: turns one bucket into a snippet and its template.

use serde::{Deserialize, Serialize};

use crate::error::CompactError;
use crate::mint::snippet_iri;
use crate::model::{Bucket, Sensor, Snippet, Template, Term};
use crate::output::OutputGraph;
use crate::progress::Anomaly;

/// One entry of a snippet's `tss:points` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    /// Result time, as written in the source.
    pub time: String,
    /// Simple result, as a string.
    pub value: String,
    /// The observation's identifier.
    pub id: String,
    /// The observed property's identifier.
    #[serde(rename = "observedProperty")]
    pub observed_property: String,
}

/// Encodes a bucket's observations as a JSON array, in bucket order.
///
/// # Errors
///
/// Returns [`serde_json::Error`] if serialization fails.
pub fn encode_points(bucket: &Bucket) -> Result<String, serde_json::Error> {
    let points: Vec<Point> = bucket
        .observations()
        .iter()
        .map(|o| Point {
            time: o.time.clone(),
            value: o.value.clone(),
            id: o.id.clone(),
            observed_property: o.observed_property.value().to_owned(),
        })
        .collect();
    serde_json::to_string(&points)
}

/// Decodes a `tss:points` payload.
///
/// # Errors
///
/// Returns [`serde_json::Error`] if the payload is not an array of points.
pub fn decode_points(payload: &str) -> Result<Vec<Point>, serde_json::Error> {
    serde_json::from_str(payload)
}

/// Adds the snippet and template for `bucket` to `graph`.
///
/// The template takes the observed property of the bucket's first
/// observation. If the bucket mixes properties an
/// [`Anomaly::MixedObservedProperties`] is returned so the caller can
/// report it.
///
/// # Errors
///
/// Returns [`CompactError::Encoding`] if the points cannot be encoded.
pub fn assemble(
    sensor: &Sensor,
    bucket: &Bucket,
    graph: &mut OutputGraph,
) -> Result<Option<Anomaly>, CompactError> {
    let first = bucket.first();
    let points = encode_points(bucket)?;

    let about = graph.add_template(Template {
        made_by_sensor: sensor.made_by(),
        observed_property: first.observed_property.clone(),
    });
    graph.add_snippet(Snippet {
        iri: snippet_iri(&sensor.token, &first.time),
        points,
        from: first.time.clone(),
        to: bucket.last().time.clone(),
        about,
    });

    let mut properties: Vec<&Term> = Vec::new();
    for observation in bucket.observations() {
        if !properties.contains(&&observation.observed_property) {
            properties.push(&observation.observed_property);
        }
    }
    Ok((properties.len() > 1).then(|| Anomaly::MixedObservedProperties {
        sensor: sensor.term.to_n3(),
        day: bucket.day(),
        properties: properties.iter().map(|p| p.to_n3()).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::{Observation, TemplateId};

    fn obs(id: &str, time: &str, value: &str, property: &str) -> Observation {
        Observation {
            id: id.into(),
            time: time.into(),
            value: value.into(),
            observed_property: Term::iri(property),
        }
    }

    fn bucket(observations: Vec<Observation>) -> Bucket {
        let mut iter = observations.into_iter();
        let Some(first) = iter.next() else {
            panic!("buckets are never empty");
        };
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
        let mut bucket = Bucket::new(day, first);
        iter.for_each(|o| bucket.push(o));
        bucket
    }

    fn s1() -> Sensor {
        Sensor {
            term: Term::iri("http://ex.org/S1"),
            token: crate::mint::sensor_token(&Term::iri("http://ex.org/S1")),
        }
    }

    #[test]
    fn points_keep_field_order_and_bucket_order() {
        let b = bucket(vec![
            obs("http://ex.org/o1", "2024-01-01T08:00:00", "10", "http://ex.org/P1"),
            obs("http://ex.org/o2", "2024-01-01T09:00:00", "12", "http://ex.org/P1"),
        ]);
        let json = encode_points(&b).unwrap_or_default();
        assert_eq!(
            json,
            r#"[{"time":"2024-01-01T08:00:00","value":"10","id":"http://ex.org/o1","observedProperty":"http://ex.org/P1"},{"time":"2024-01-01T09:00:00","value":"12","id":"http://ex.org/o2","observedProperty":"http://ex.org/P1"}]"#
        );
        let decoded = decode_points(&json).unwrap_or_default();
        let values: Vec<_> = decoded.iter().map(|p| p.value.as_str()).collect();
        assert_eq!(values, ["10", "12"]);
    }

    #[test]
    fn snippet_bounds_and_template_link() {
        let b = bucket(vec![
            obs("o1", "2024-01-01T08:00:00", "10", "http://ex.org/P1"),
            obs("o2", "2024-01-01T09:00:00", "12", "http://ex.org/P1"),
        ]);
        let mut graph = OutputGraph::new();
        let anomaly = assemble(&s1(), &b, &mut graph);
        assert!(matches!(anomaly, Ok(None)));

        let snippet = &graph.snippets()[0];
        assert_eq!(
            snippet.iri,
            "https://example.org/tss/snippet/http%3A%2F%2Fex.org%2FS1_20240101080000"
        );
        assert_eq!(snippet.from, "2024-01-01T08:00:00");
        assert_eq!(snippet.to, "2024-01-01T09:00:00");
        assert_eq!(snippet.about, TemplateId(0));
        assert_eq!(
            graph.template(snippet.about),
            Some(&Template {
                made_by_sensor: Term::iri("http://ex.org/S1"),
                observed_property: Term::iri("http://ex.org/P1"),
            })
        );
    }

    #[test]
    fn literal_sensor_template_uses_minted_iri() {
        let sensor = Sensor {
            term: Term::plain("24002042"),
            token: "24002042".into(),
        };
        let b = bucket(vec![obs("o1", "2024-03-05T10:00:00", "7", "http://ex.org/P2")]);
        let mut graph = OutputGraph::new();
        assert!(assemble(&sensor, &b, &mut graph).is_ok());
        let snippet = &graph.snippets()[0];
        assert_eq!(snippet.from, snippet.to);
        assert_eq!(
            graph.template(snippet.about).map(|t| &t.made_by_sensor),
            Some(&Term::iri("http://example.org/sensor/24002042"))
        );
    }

    #[test]
    fn mixed_properties_are_flagged_and_first_wins() {
        let b = bucket(vec![
            obs("o1", "2024-01-01T08:00:00", "10", "http://ex.org/P1"),
            obs("o2", "2024-01-01T09:00:00", "55", "http://ex.org/P2"),
        ]);
        let mut graph = OutputGraph::new();
        let anomaly = assemble(&s1(), &b, &mut graph);
        match anomaly {
            Ok(Some(Anomaly::MixedObservedProperties { properties, .. })) => {
                assert_eq!(properties, ["<http://ex.org/P1>", "<http://ex.org/P2>"]);
            }
            other => panic!("expected mixed-property anomaly, got {other:?}"),
        }
        let template = graph.template(TemplateId(0));
        assert_eq!(
            template.map(|t| &t.observed_property),
            Some(&Term::iri("http://ex.org/P1"))
        );
    }
}

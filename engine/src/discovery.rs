//! Sensor discovery.

use crate::error::CompactError;
use crate::mint::{resolve_tokens, TokenCollision};
use crate::model::{Sensor, Term};
use crate::query::{QueryEngine, SelectQuery, VAR_SENSOR};

/// The outcome of sensor discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Sensors to compact, sorted by term, each with a run-unique token.
    pub sensors: Vec<Sensor>,
    /// Groups of sensors whose sanitized tokens had to be hardened.
    pub collisions: Vec<TokenCollision>,
    /// Blank-node sensors, which have no stable identity to project.
    pub anonymous: Vec<Term>,
}

/// Finds every distinct object of `sosa:madeBySensor`, keeping term kinds.
///
/// # Errors
///
/// Returns [`CompactError::MissingBinding`] if a row lacks `?sensor`, or
/// [`CompactError::Query`] if the engine fails.
pub fn discover_sensors(engine: &impl QueryEngine) -> Result<Discovery, CompactError> {
    let rows = engine.select(&SelectQuery::Sensors)?;
    let mut terms = Vec::with_capacity(rows.len());
    let mut anonymous = Vec::new();
    for row in rows {
        let term = row
            .get(VAR_SENSOR)
            .cloned()
            .ok_or(CompactError::MissingBinding {
                sensor: "?".into(),
                variable: VAR_SENSOR,
            })?;
        match term {
            Term::BlankNode(_) => anonymous.push(term),
            term => terms.push(term),
        }
    }
    let (sensors, collisions) = resolve_tokens(terms);
    anonymous.sort();
    anonymous.dedup();
    Ok(Discovery {
        sensors,
        collisions,
        anonymous,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;
    use crate::query::Row;

    struct Rows(Vec<Row>);

    impl QueryEngine for Rows {
        fn select(&self, query: &SelectQuery) -> Result<Vec<Row>, QueryError> {
            assert_eq!(*query, SelectQuery::Sensors);
            Ok(self.0.clone())
        }
    }

    #[test]
    fn separates_anonymous_sensors() {
        let engine = Rows(vec![
            Row::new().with(VAR_SENSOR, Term::iri("http://ex.org/S1")),
            Row::new().with(VAR_SENSOR, Term::blank("b0")),
            Row::new().with(VAR_SENSOR, Term::plain("24002042")),
        ]);
        let Ok(found) = discover_sensors(&engine) else {
            panic!("discovery must succeed");
        };
        assert_eq!(found.sensors.len(), 2);
        assert_eq!(found.anonymous, vec![Term::blank("b0")]);
        assert!(found.collisions.is_empty());
    }

    #[test]
    fn missing_binding_is_fatal() {
        let engine = Rows(vec![Row::new().with("other", Term::plain("x"))]);
        assert!(matches!(
            discover_sensors(&engine),
            Err(CompactError::MissingBinding { variable: "sensor", .. })
        ));
    }
}

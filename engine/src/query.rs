//! Read-only queries issued against the source graph.
//!
//! The engine only ever asks two questions: which sensors exist, and what
//! did one sensor observe. Both are described by [`SelectQuery`], which can
//! be rendered as SPARQL for an external endpoint or evaluated directly by
//! an in-process [`QueryEngine`] such as [`Store`](crate::store::Store).

use std::sync::Mutex;

use crate::error::QueryError;
use crate::model::Term;

/// Variable bound to the sensor in the discovery query.
pub const VAR_SENSOR: &str = "sensor";
/// Variable bound to the observation node.
pub const VAR_OBSERVATION: &str = "OBSERVATION";
/// Variable bound to the result time.
pub const VAR_TIME: &str = "TIME";
/// Variable bound to the simple result.
pub const VAR_READING: &str = "READING";
/// Variable bound to the observed property.
pub const VAR_PROPERTY: &str = "observedProperty";

/// The queries the compaction engine issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectQuery {
    /// Distinct objects of `sosa:madeBySensor`.
    Sensors,
    /// All observations made by one sensor, ordered by result time.
    ObservationsBy(Term),
}

impl SelectQuery {
    /// Renders the query as SPARQL 1.1 text.
    ///
    /// The sensor is projected by kind: `<iri>` for resources and a quoted,
    /// typed or language-tagged literal otherwise. A wrong projection would
    /// silently match nothing.
    #[must_use]
    pub fn to_sparql(&self) -> String {
        match self {
            SelectQuery::Sensors => format!(
                "PREFIX sosa: <http://www.w3.org/ns/sosa/>\n\n\
                 SELECT DISTINCT ?{VAR_SENSOR}\n\
                 WHERE {{\n  ?s sosa:madeBySensor ?{VAR_SENSOR} .\n}}\n"
            ),
            SelectQuery::ObservationsBy(sensor) => format!(
                "PREFIX sosa: <http://www.w3.org/ns/sosa/>\n\n\
                 SELECT ?{VAR_OBSERVATION} ?{VAR_TIME} ?{VAR_READING} ?{VAR_PROPERTY}\n\
                 WHERE {{\n    \
                 ?{VAR_OBSERVATION} a sosa:Observation ;\n        \
                 sosa:resultTime ?{VAR_TIME} ;\n        \
                 sosa:hasSimpleResult ?{VAR_READING} ;\n        \
                 sosa:observedProperty ?{VAR_PROPERTY} ;\n        \
                 sosa:madeBySensor {} .\n}}\n\
                 ORDER BY ?{VAR_TIME}\n",
                sensor.to_n3()
            ),
        }
    }
}

/// One solution of a select query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    bindings: Vec<(String, Term)>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binding, builder style.
    #[must_use]
    pub fn with(mut self, variable: impl Into<String>, value: Term) -> Self {
        self.bind(variable, value);
        self
    }

    /// Binds `variable` to `value`, replacing any earlier binding.
    pub fn bind(&mut self, variable: impl Into<String>, value: Term) {
        let variable = variable.into();
        match self.bindings.iter_mut().find(|(v, _)| *v == variable) {
            Some(slot) => slot.1 = value,
            None => self.bindings.push((variable, value)),
        }
    }

    /// Looks up the value bound to `variable`.
    #[must_use]
    pub fn get(&self, variable: &str) -> Option<&Term> {
        self.bindings
            .iter()
            .find(|(v, _)| v == variable)
            .map(|(_, t)| t)
    }
}

/// Something that can answer [`SelectQuery`]s.
///
/// Implementations must be safe to share between worker threads; wrap an
/// engine that cannot serve concurrent queries in [`Serialized`].
pub trait QueryEngine: Sync {
    /// Executes `query` and returns its solutions in query order.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if the engine fails to execute the query.
    fn select(&self, query: &SelectQuery) -> Result<Vec<Row>, QueryError>;
}

impl<E: QueryEngine + ?Sized> QueryEngine for &E {
    fn select(&self, query: &SelectQuery) -> Result<Vec<Row>, QueryError> {
        (**self).select(query)
    }
}

/// Funnels every query through a single lock, for engines that are not
/// safe to call concurrently.
#[derive(Debug)]
pub struct Serialized<E> {
    inner: Mutex<E>,
}

impl<E> Serialized<E> {
    /// Wraps `engine`.
    pub fn new(engine: E) -> Self {
        Self {
            inner: Mutex::new(engine),
        }
    }
}

/// A query engine that only needs `&mut` access and `Send`.
pub trait ExclusiveQueryEngine: Send {
    /// Executes `query` with exclusive access to the engine.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if the engine fails to execute the query.
    fn select_mut(&mut self, query: &SelectQuery) -> Result<Vec<Row>, QueryError>;
}

impl<E: ExclusiveQueryEngine> QueryEngine for Serialized<E> {
    fn select(&self, query: &SelectQuery) -> Result<Vec<Row>, QueryError> {
        let mut engine = self
            .inner
            .lock()
            .map_err(|_| QueryError::Execution("query engine lock poisoned".into()))?;
        engine.select_mut(query)
    }
}

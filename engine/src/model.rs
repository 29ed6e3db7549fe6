//! Core data model types.
//!
//! Terms are owned copies of the RDF terms found in the source graph. The
//! compaction entities (observations, buckets, snippets, templates) are built
//! from them and never borrow from the parser.

use std::fmt;

use chrono::NaiveDate;

/// A literal term: lexical form plus datatype IRI and optional language tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    /// The lexical form, unescaped.
    pub lexical: String,
    /// Full datatype IRI (`xsd:string` for plain literals).
    pub datatype: String,
    /// Language tag, present only for `rdf:langString` literals.
    pub language: Option<String>,
}

/// An RDF term as held by the store and the output graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    /// A resource reference.
    Iri(String),
    /// A blank node, identified by its document-local label.
    BlankNode(String),
    /// A literal value.
    Literal(Literal),
}

impl Term {
    /// Creates an IRI term.
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    /// Creates a plain (`xsd:string`) literal.
    pub fn plain(lexical: impl Into<String>) -> Self {
        Term::typed(lexical, iris::XSD_STRING)
    }

    /// Creates a literal with an explicit datatype.
    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal(Literal {
            lexical: lexical.into(),
            datatype: datatype.into(),
            language: None,
        })
    }

    /// Creates a blank node term.
    pub fn blank(label: impl Into<String>) -> Self {
        Term::BlankNode(label.into())
    }

    /// Returns true for resource references.
    #[must_use]
    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }

    /// Returns the bare string value: the IRI, the blank node label, or the
    /// literal's lexical form.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Term::Iri(iri) => iri,
            Term::BlankNode(label) => label,
            Term::Literal(lit) => &lit.lexical,
        }
    }

    /// Renders the term in N3/SPARQL/N-Triples form: `<iri>`, `_:label`,
    /// `"lexical"`, `"lexical"@lang` or `"lexical"^^<datatype>`.
    #[must_use]
    pub fn to_n3(&self) -> String {
        match self {
            Term::Iri(iri) => format!("<{iri}>"),
            Term::BlankNode(label) => format!("_:{label}"),
            Term::Literal(lit) => {
                let quoted = quote_literal(&lit.lexical);
                match &lit.language {
                    Some(lang) => format!("{quoted}@{lang}"),
                    None if lit.datatype == iris::XSD_STRING => quoted,
                    None => format!("{quoted}^^<{}>", lit.datatype),
                }
            }
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_n3())
    }
}

/// Wraps a lexical form in double quotes, escaping it for Turtle,
/// N-Triples and SPARQL string syntax.
#[must_use]
pub fn quote_literal(lexical: &str) -> String {
    let mut out = String::with_capacity(lexical.len() + 2);
    out.push('"');
    for c in lexical.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// How a sensor's identity is projected into the output graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    /// The sensor is a dereferenceable resource; its IRI is used as-is.
    Resource,
    /// The sensor is an opaque literal token; a substitute IRI is minted.
    Literal,
}

/// A sensor discovered in the source graph, with its resolved identity token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sensor {
    /// The original term, kind preserved.
    pub term: Term,
    /// Sanitized, run-unique token embedded in minted identifiers.
    pub token: String,
}

impl Sensor {
    /// Returns whether the sensor is a resource or a literal.
    #[must_use]
    pub fn kind(&self) -> SensorKind {
        if self.term.is_iri() {
            SensorKind::Resource
        } else {
            SensorKind::Literal
        }
    }

    /// The term used as the template's `sosa:madeBySensor` object.
    #[must_use]
    pub fn made_by(&self) -> Term {
        match self.kind() {
            SensorKind::Resource => self.term.clone(),
            SensorKind::Literal => Term::Iri(crate::mint::sensor_iri(&self.token)),
        }
    }
}

/// One sensor reading, as returned by the per-sensor fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// String form of the observation node.
    pub id: String,
    /// Lexical form of the result time.
    pub time: String,
    /// Lexical form of the simple result.
    pub value: String,
    /// The observed property term.
    pub observed_property: Term,
}

/// The observations of one sensor on one calendar day, in time order.
///
/// A bucket always holds at least one observation: it can only be created
/// from its first observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    day: NaiveDate,
    observations: Vec<Observation>,
}

impl Bucket {
    /// Starts a bucket for `day` with its first observation.
    #[must_use]
    pub fn new(day: NaiveDate, first: Observation) -> Self {
        Self {
            day,
            observations: vec![first],
        }
    }

    /// Appends a later observation of the same day.
    pub fn push(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    /// The calendar day shared by every observation in the bucket.
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.day
    }

    /// All observations, ascending by time.
    #[must_use]
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// The earliest observation.
    #[must_use]
    pub fn first(&self) -> &Observation {
        // Non-empty by construction.
        &self.observations[0]
    }

    /// The latest observation.
    #[must_use]
    pub fn last(&self) -> &Observation {
        &self.observations[self.observations.len() - 1]
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Returns whether the bucket holds no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Index of a [`Template`] in the output graph's template table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(pub usize);

/// The description shared by the points of one snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// The sensor reference, or the minted substitute for literal sensors.
    pub made_by_sensor: Term,
    /// The observed property of the bucket's first observation.
    pub observed_property: Term,
}

/// A compacted record for one (sensor, day) bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    /// Minted snippet IRI.
    pub iri: String,
    /// JSON-encoded point array.
    pub points: String,
    /// Time of the first point.
    pub from: String,
    /// Time of the last point.
    pub to: String,
    /// The template this snippet is `tss:about`.
    pub about: TemplateId,
}

/// Vocabulary IRI constants.
pub mod iris {
    /// RDF namespace.
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    /// XSD namespace.
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
    /// SOSA namespace.
    pub const SOSA: &str = "http://www.w3.org/ns/sosa/";
    /// Time-series snippet namespace.
    pub const TSS: &str = "https://w3id.org/tss#";

    /// Default base for resolving relative IRIs in input documents.
    pub const DEFAULT_BASE: &str = "https://example.org/";
    /// Prefix for IRIs minted for literal sensors.
    pub const SENSOR_BASE: &str = "http://example.org/sensor/";
    /// Prefix for minted snippet IRIs.
    pub const SNIPPET_BASE: &str = "https://example.org/tss/snippet/";

    /// `rdf:type`.
    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    /// `rdf:JSON`.
    pub const RDF_JSON: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#JSON";
    /// `rdf:langString`.
    pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
    /// `xsd:string`.
    pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    /// `xsd:dateTime`.
    pub const XSD_DATETIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
    /// `xsd:integer`.
    pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

    /// `sosa:Observation`.
    pub const SOSA_OBSERVATION: &str = "http://www.w3.org/ns/sosa/Observation";
    /// `sosa:madeBySensor`.
    pub const SOSA_MADE_BY_SENSOR: &str = "http://www.w3.org/ns/sosa/madeBySensor";
    /// `sosa:resultTime`.
    pub const SOSA_RESULT_TIME: &str = "http://www.w3.org/ns/sosa/resultTime";
    /// `sosa:hasSimpleResult`.
    pub const SOSA_HAS_SIMPLE_RESULT: &str = "http://www.w3.org/ns/sosa/hasSimpleResult";
    /// `sosa:observedProperty`.
    pub const SOSA_OBSERVED_PROPERTY: &str = "http://www.w3.org/ns/sosa/observedProperty";

    /// `tss:Snippet`.
    pub const TSS_SNIPPET: &str = "https://w3id.org/tss#Snippet";
    /// `tss:PointTemplate`.
    pub const TSS_POINT_TEMPLATE: &str = "https://w3id.org/tss#PointTemplate";
    /// `tss:points`.
    pub const TSS_POINTS: &str = "https://w3id.org/tss#points";
    /// `tss:from`.
    pub const TSS_FROM: &str = "https://w3id.org/tss#from";
    /// `tss:to`.
    pub const TSS_TO: &str = "https://w3id.org/tss#to";
    /// `tss:pointType`.
    pub const TSS_POINT_TYPE: &str = "https://w3id.org/tss#pointType";
    /// `tss:about`.
    pub const TSS_ABOUT: &str = "https://w3id.org/tss#about";
}

//! In-memory triple store loaded from Turtle or N-Triples.
//!
//! Documents are parsed with sophia into a [`FastGraph`], which holds the
//! deduplicated graph and its subject/predicate/object indexes. Lookups go
//! through [`Graph::triples_matching`] and every term handed out is copied
//! into the crate's owned [`Term`]. The store implements [`QueryEngine`]
//! for the two queries compaction needs.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use sophia::api::graph::{Graph, MutableGraph};
use sophia::api::parser::TripleParser;
use sophia::api::source::TripleSource;
use sophia::api::term::matcher::Any;
use sophia::api::term::{BnodeId, IriRef, LanguageTag, SimpleTerm, Term as RdfTerm, TermKind};
use sophia::api::triple::Triple as RdfTriple;
use sophia::inmem::graph::FastGraph;
use sophia::iri::Iri;
use sophia::turtle::parser::nt::NTriplesParser;
use sophia::turtle::parser::turtle::TurtleParser;

use crate::error::{LoadError, QueryError};
use crate::grouping::Timestamp;
use crate::model::iris::{
    RDF_LANG_STRING, RDF_TYPE, SOSA_HAS_SIMPLE_RESULT, SOSA_MADE_BY_SENSOR, SOSA_OBSERVATION,
    SOSA_OBSERVED_PROPERTY, SOSA_RESULT_TIME, XSD_STRING,
};
use crate::model::{Literal, Term};
use crate::query::{
    QueryEngine, Row, SelectQuery, VAR_OBSERVATION, VAR_PROPERTY, VAR_READING, VAR_SENSOR,
    VAR_TIME,
};

/// A subject-predicate-object statement.
pub type Triple = [Term; 3];

/// Textual graph syntaxes the store can read and the serializers can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// Turtle 1.1.
    Turtle,
    /// N-Triples.
    NTriples,
}

impl Syntax {
    /// Picks the syntax from a file extension: `.nt` is N-Triples, anything
    /// else Turtle.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("nt") => Syntax::NTriples,
            _ => Syntax::Turtle,
        }
    }
}

/// An immutable, indexed set of triples.
///
/// Besides the sophia graph the store keeps an owned copy of each distinct
/// triple in first-seen order, so re-serializing a document is stable.
#[derive(Default)]
pub struct Store {
    graph: FastGraph,
    triples: Vec<Triple>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("triples", &self.triples.len())
            .finish()
    }
}

impl Store {
    /// Builds a store from triples, dropping duplicates but keeping the
    /// first-seen order.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Graph`] if the graph's term index is exhausted.
    pub fn from_triples(triples: impl IntoIterator<Item = Triple>) -> Result<Self, LoadError> {
        let mut store = Store::default();
        for triple in triples {
            let inserted = store
                .graph
                .insert(
                    simple(&triple[0]),
                    simple(&triple[1]),
                    simple(&triple[2]),
                )
                .map_err(|e| LoadError::Graph(e.to_string()))?;
            if inserted {
                store.triples.push(triple);
            }
        }
        Ok(store)
    }

    /// Reads and parses the document at `path`, resolving relative IRIs
    /// against `base`. The syntax follows the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the file cannot be read or parsed.
    pub fn load(path: &Path, base: &str) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse(&text, Syntax::from_path(path), base, path)
    }

    /// Parses an in-memory document.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Parse`] on syntax errors and
    /// [`LoadError::InvalidBase`] if `base` is not an absolute IRI.
    pub fn parse_str(text: &str, syntax: Syntax, base: &str) -> Result<Self, LoadError> {
        parse(text, syntax, base, Path::new("<inline>"))
    }

    /// All distinct triples in first-seen order.
    #[must_use]
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// Number of distinct triples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Returns true if the store holds no triples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Objects of every `(subject, predicate, ?o)` triple.
    pub fn objects<'a>(
        &'a self,
        subject: &Term,
        predicate: &str,
    ) -> impl Iterator<Item = Term> + 'a {
        let matched: Vec<_> = self
            .graph
            .triples_matching([simple(subject)], [predicate_term(predicate)], Any)
            .filter_map(Result::ok)
            .filter_map(|t| convert(t.o()))
            .collect();
        matched.into_iter()
    }

    /// Every triple whose predicate is `predicate`.
    pub fn with_predicate<'a>(&'a self, predicate: &str) -> impl Iterator<Item = Triple> + 'a {
        let matched: Vec<_> = self
            .graph
            .triples_matching(Any, [predicate_term(predicate)], Any)
            .filter_map(Result::ok)
            .filter_map(|t| Some([convert(t.s())?, convert(t.p())?, convert(t.o())?]))
            .collect();
        matched.into_iter()
    }

    fn sensors(&self) -> Vec<Row> {
        let sensors: BTreeSet<Term> = self
            .with_predicate(SOSA_MADE_BY_SENSOR)
            .map(|[_, _, sensor]| sensor)
            .collect();
        sensors
            .into_iter()
            .map(|sensor| Row::new().with(VAR_SENSOR, sensor))
            .collect()
    }

    fn observations_by(&self, sensor: &Term) -> Vec<Row> {
        let observation_class = Term::iri(SOSA_OBSERVATION);
        let subjects: BTreeSet<Term> = self
            .with_predicate(SOSA_MADE_BY_SENSOR)
            .filter(|t| t[2] == *sensor)
            .map(|[subject, _, _]| subject)
            .collect();
        let mut rows = Vec::new();
        for subject in subjects {
            if !self
                .objects(&subject, RDF_TYPE)
                .any(|c| c == observation_class)
            {
                continue;
            }
            for time in self.objects(&subject, SOSA_RESULT_TIME) {
                for reading in self.objects(&subject, SOSA_HAS_SIMPLE_RESULT) {
                    for property in self.objects(&subject, SOSA_OBSERVED_PROPERTY) {
                        rows.push(
                            Row::new()
                                .with(VAR_OBSERVATION, subject.clone())
                                .with(VAR_TIME, time.clone())
                                .with(VAR_READING, reading.clone())
                                .with(VAR_PROPERTY, property),
                        );
                    }
                }
            }
        }
        // Unreadable times sort last; compaction rejects them anyway.
        rows.sort_by_cached_key(|row| {
            let time = row.get(VAR_TIME).map(Term::value).unwrap_or_default();
            let id = row.get(VAR_OBSERVATION).map(Term::value).unwrap_or_default();
            let timestamp = Timestamp::parse(time);
            (timestamp.is_none(), timestamp, time.to_owned(), id.to_owned())
        });
        rows
    }
}

impl QueryEngine for Store {
    fn select(&self, query: &SelectQuery) -> Result<Vec<Row>, QueryError> {
        Ok(match query {
            SelectQuery::Sensors => self.sensors(),
            SelectQuery::ObservationsBy(sensor) => self.observations_by(sensor),
        })
    }
}

fn parse(text: &str, syntax: Syntax, base: &str, path: &Path) -> Result<Store, LoadError> {
    let triples = match syntax {
        Syntax::Turtle => {
            let base =
                Iri::new(base.to_owned()).map_err(|_| LoadError::InvalidBase(base.to_owned()))?;
            collect(TurtleParser { base: Some(base) }.parse_str(text), path)?
        }
        Syntax::NTriples => collect(NTriplesParser {}.parse_str(text), path)?,
    };
    tracing::debug!(path = %path.display(), triples = triples.len(), "parsed graph");
    Store::from_triples(triples)
}

/// Borrows an owned term as a sophia term for insertion and matching.
fn simple(term: &Term) -> SimpleTerm<'_> {
    match term {
        Term::Iri(iri) => SimpleTerm::Iri(IriRef::new_unchecked(iri.as_str().into())),
        Term::BlankNode(label) => {
            SimpleTerm::BlankNode(BnodeId::new_unchecked(label.as_str().into()))
        }
        Term::Literal(literal) => match &literal.language {
            Some(tag) => SimpleTerm::LiteralLanguage(
                literal.lexical.as_str().into(),
                LanguageTag::new_unchecked(tag.as_str().into()),
            ),
            None => SimpleTerm::LiteralDatatype(
                literal.lexical.as_str().into(),
                IriRef::new_unchecked(literal.datatype.as_str().into()),
            ),
        },
    }
}

fn predicate_term(iri: &str) -> SimpleTerm<'_> {
    SimpleTerm::Iri(IriRef::new_unchecked(iri.into()))
}

fn collect<S: TripleSource>(mut source: S, path: &Path) -> Result<Vec<Triple>, LoadError> {
    let mut triples = Vec::new();
    source
        .for_each_triple(|t| {
            if let (Some(s), Some(p), Some(o)) = (convert(t.s()), convert(t.p()), convert(t.o())) {
                triples.push([s, p, o]);
            }
        })
        .map_err(|e| LoadError::Parse {
            path: PathBuf::from(path),
            message: e.to_string(),
        })?;
    Ok(triples)
}

fn convert<T: RdfTerm>(term: T) -> Option<Term> {
    match term.kind() {
        TermKind::Iri => term.iri().map(|iri| Term::Iri(iri.as_str().to_owned())),
        TermKind::BlankNode => term
            .bnode_id()
            .map(|id| Term::BlankNode(id.as_str().to_owned())),
        TermKind::Literal => {
            let lexical = term.lexical_form()?.to_string();
            let language = term.language_tag().map(|tag| tag.as_str().to_owned());
            let datatype = match (&language, term.datatype()) {
                (Some(_), _) => RDF_LANG_STRING.to_owned(),
                (None, Some(dt)) => dt.as_str().to_owned(),
                (None, None) => XSD_STRING.to_owned(),
            };
            Some(Term::Literal(Literal {
                lexical,
                datatype,
                language,
            }))
        }
        // Quoted triples and variables never appear in plain Turtle data.
        _ => None,
    }
}

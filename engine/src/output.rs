//! The output accumulator.
//!
//! Snippets and templates are kept as typed records; templates live in an
//! arena addressed by [`TemplateId`]. [`OutputGraph::triples`] flattens the
//! records into RDF statements in a deterministic order.

use crate::model::iris::{
    RDF_JSON, RDF_TYPE, SOSA_MADE_BY_SENSOR, SOSA_OBSERVATION, SOSA_OBSERVED_PROPERTY, TSS_ABOUT,
    TSS_FROM, TSS_POINTS, TSS_POINT_TEMPLATE, TSS_POINT_TYPE, TSS_SNIPPET, TSS_TO, XSD_DATETIME,
    XSD_STRING,
};
use crate::model::{Snippet, Template, TemplateId, Term};
use crate::store::Triple;

/// Datatype given to the JSON points payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PointsDatatype {
    /// A plain `xsd:string` literal.
    #[default]
    String,
    /// An `rdf:JSON` literal.
    Json,
}

impl PointsDatatype {
    /// The datatype IRI.
    #[must_use]
    pub fn iri(self) -> &'static str {
        match self {
            PointsDatatype::String => XSD_STRING,
            PointsDatatype::Json => RDF_JSON,
        }
    }
}

/// Accumulates snippets and their templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputGraph {
    snippets: Vec<Snippet>,
    templates: Vec<Template>,
}

impl OutputGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a template and returns its arena key.
    pub fn add_template(&mut self, template: Template) -> TemplateId {
        self.templates.push(template);
        TemplateId(self.templates.len() - 1)
    }

    /// Stores a snippet. Its `about` must come from this graph.
    pub fn add_snippet(&mut self, snippet: Snippet) {
        debug_assert!(snippet.about.0 < self.templates.len());
        self.snippets.push(snippet);
    }

    /// Moves every record of `other` into this graph, re-keying templates.
    pub fn append(&mut self, other: OutputGraph) {
        let offset = self.templates.len();
        self.templates.extend(other.templates);
        self.snippets
            .extend(other.snippets.into_iter().map(|mut snippet| {
                snippet.about = TemplateId(snippet.about.0 + offset);
                snippet
            }));
    }

    /// All snippets in insertion order.
    #[must_use]
    pub fn snippets(&self) -> &[Snippet] {
        &self.snippets
    }

    /// Looks up a template.
    #[must_use]
    pub fn template(&self, id: TemplateId) -> Option<&Template> {
        self.templates.get(id.0)
    }

    /// Number of snippets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    /// Returns true if no snippet was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    /// Flattens the graph into triples, snippets ordered by IRI.
    ///
    /// Each snippet is followed by its template, a blank node labelled by
    /// the snippet's position, so identical graphs flatten identically
    /// whatever order they were accumulated in.
    #[must_use]
    pub fn triples(&self, points: PointsDatatype) -> Vec<Triple> {
        let mut order: Vec<&Snippet> = self.snippets.iter().collect();
        order.sort_by(|a, b| a.iri.cmp(&b.iri));

        let mut out = Vec::with_capacity(order.len() * 9);
        for (n, snippet) in order.into_iter().enumerate() {
            let Some(template) = self.template(snippet.about) else {
                continue;
            };
            let subject = Term::iri(&snippet.iri);
            let node = Term::blank(format!("template{n}"));
            let mut push = |s: &Term, p: &str, o: Term| out.push([s.clone(), Term::iri(p), o]);

            push(&subject, RDF_TYPE, Term::iri(TSS_SNIPPET));
            push(&subject, TSS_POINTS, Term::typed(&snippet.points, points.iri()));
            push(&subject, TSS_FROM, Term::typed(&snippet.from, XSD_DATETIME));
            push(&subject, TSS_TO, Term::typed(&snippet.to, XSD_DATETIME));
            push(&subject, TSS_POINT_TYPE, Term::iri(SOSA_OBSERVATION));
            push(&subject, TSS_ABOUT, node.clone());

            push(&node, RDF_TYPE, Term::iri(TSS_POINT_TEMPLATE));
            push(&node, SOSA_MADE_BY_SENSOR, template.made_by_sensor.clone());
            push(
                &node,
                SOSA_OBSERVED_PROPERTY,
                template.observed_property.clone(),
            );
        }
        out
    }
}

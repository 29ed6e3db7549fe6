//! Validators over snippet documents.
//!
//! Each validator takes parsed stores and returns a [`ConformanceReport`]
//! holding one result per check family.
//!
//! [`ConformanceReport`]: crate::report::ConformanceReport

pub mod partition;
pub mod snippets;

use tss_engine::model::iris::RDF_TYPE;
use tss_engine::{Store, Term};

/// Subjects typed `class`, in term order.
pub(crate) fn instances_of(store: &Store, class: &str) -> Vec<Term> {
    let class = Term::iri(class);
    let mut subjects: Vec<Term> = store
        .with_predicate(RDF_TYPE)
        .filter(|t| t[2] == class)
        .map(|[subject, _, _]| subject)
        .collect();
    subjects.sort();
    subjects.dedup();
    subjects
}

/// Returns the single object of `(subject, predicate)`, or a detail line
/// describing why there is not exactly one.
pub(crate) fn exactly_one(
    store: &Store,
    subject: &Term,
    predicate: &'static str,
) -> Result<Term, String> {
    let mut objects = store.objects(subject, predicate);
    match (objects.next(), objects.next()) {
        (Some(object), None) => Ok(object),
        (None, _) => Err(format!("{subject}: no <{predicate}>")),
        (Some(_), Some(_)) => Err(format!("{subject}: more than one <{predicate}>")),
    }
}

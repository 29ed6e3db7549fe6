//! Serializers for snippet graphs and pass-through documents.
//!
//! - **Turtle** ([`turtle`]) — prefixed, one block per subject
//! - **N-Triples** ([`ntriples`]) — one absolute triple per line
//! - **JSON-LD context** ([`jsonld`]) — the context describing a points payload

pub mod jsonld;
pub mod ntriples;
pub mod turtle;

use crate::store::{Syntax, Triple};

/// Serializes `triples` in the requested syntax.
#[must_use]
pub fn to_syntax(triples: &[Triple], syntax: Syntax) -> String {
    match syntax {
        Syntax::Turtle => turtle::to_turtle(triples),
        Syntax::NTriples => ntriples::to_ntriples(triples),
    }
}

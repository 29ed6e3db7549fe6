//! Turtle 1.1 serializer.
//!
//! Consecutive triples sharing a subject are written as one block; IRIs in
//! the well-known namespaces are abbreviated with prefixes.

use crate::model::iris::{RDF, RDF_TYPE, SOSA, TSS, XSD, XSD_STRING};
use crate::model::{quote_literal, Term};
use crate::store::Triple;

/// Prefixes declared at the top of every document.
pub const PREFIXES: &[(&str, &str)] = &[("rdf", RDF), ("sosa", SOSA), ("tss", TSS), ("xsd", XSD)];

/// Serializes triples to a Turtle string.
///
/// # Errors
///
/// This function is infallible; it always returns a valid Turtle string.
#[must_use]
pub fn to_turtle(triples: &[Triple]) -> String {
    let mut out = String::with_capacity(256 + triples.len() * 96);

    for (prefix, iri) in PREFIXES {
        out.push_str(&format!("@prefix {prefix}: <{iri}> .\n"));
    }

    for block in triples.chunk_by(|a, b| a[0] == b[0]) {
        out.push('\n');
        out.push_str(&term(&block[0][0]));
        for (i, triple) in block.iter().enumerate() {
            out.push_str(if i == 0 { "\n  " } else { " ;\n  " });
            out.push_str(&predicate(&triple[1]));
            out.push(' ');
            out.push_str(&term(&triple[2]));
        }
        out.push_str(" .\n");
    }

    out
}

fn predicate(p: &Term) -> String {
    match p {
        Term::Iri(iri) if iri == RDF_TYPE => "a".to_owned(),
        p => term(p),
    }
}

fn term(t: &Term) -> String {
    match t {
        Term::Iri(iri) => iri_ref(iri),
        Term::BlankNode(label) => format!("_:{label}"),
        Term::Literal(lit) => {
            let quoted = quote_literal(&lit.lexical);
            match &lit.language {
                Some(lang) => format!("{quoted}@{lang}"),
                None if lit.datatype == XSD_STRING => quoted,
                None => format!("{quoted}^^{}", iri_ref(&lit.datatype)),
            }
        }
    }
}

/// Abbreviates `iri` as `prefix:local` when the local part is a plain name.
fn iri_ref(iri: &str) -> String {
    for (prefix, ns) in PREFIXES {
        if let Some(local) = iri.strip_prefix(ns) {
            if is_plain_local(local) {
                return format!("{prefix}:{local}");
            }
        }
    }
    format!("<{iri}>")
}

fn is_plain_local(local: &str) -> bool {
    let mut chars = local.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphanumeric() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

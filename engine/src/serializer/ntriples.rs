//! N-Triples serializer.
//!
//! One triple per line with absolute IRIs; suitable for streaming and
//! diff-friendly storage.

use crate::store::Triple;

/// Serializes triples to an N-Triples string.
///
/// # Errors
///
/// This function is infallible; it always returns a valid N-Triples string.
#[must_use]
pub fn to_ntriples(triples: &[Triple]) -> String {
    let mut out = String::with_capacity(triples.len() * 128);
    for [s, p, o] in triples {
        out.push_str(&s.to_n3());
        out.push(' ');
        out.push_str(&p.to_n3());
        out.push(' ');
        out.push_str(&o.to_n3());
        out.push_str(" .\n");
    }
    out
}

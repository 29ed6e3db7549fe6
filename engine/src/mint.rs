//! Deterministic identifier minting.
//!
//! Snippet and substitute sensor IRIs are pure functions of the sensor
//! token and the first observation's timestamp, so repeated runs over the
//! same graph mint byte-identical identifiers.

use std::collections::{BTreeMap, BTreeSet};

use sha2::{Digest, Sha256};

use crate::model::iris::{SENSOR_BASE, SNIPPET_BASE};
use crate::model::{Sensor, Term};

/// Length of the hex digest suffix appended to colliding sensor tokens.
pub const DIGEST_SUFFIX_LEN: usize = 8;

/// Hex length of a whole SHA-256 digest.
const FULL_DIGEST_LEN: usize = 64;

/// Sanitizes a sensor's identity for embedding in an IRI path segment.
///
/// Spaces become `_`; every byte outside `[A-Za-z0-9._~-]` is
/// percent-escaped, so `:` and `/` of a resource IRI become `%3A` / `%2F`.
#[must_use]
pub fn sensor_token(sensor: &Term) -> String {
    let spaced = sensor.value().replace(' ', "_");
    percent_escape(&spaced)
}

/// Sanitizes a timestamp: date-time separators are deleted and anything
/// else unsafe is percent-escaped.
///
/// `2025-08-18T00:00:00` becomes `20250818000000`.
#[must_use]
pub fn time_token(time: &str) -> String {
    let stripped: String = time
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | 'T' | 'Z'))
        .collect();
    percent_escape(&stripped)
}

/// The IRI of the snippet whose bucket starts at `first_time`.
#[must_use]
pub fn snippet_iri(sensor_token: &str, first_time: &str) -> String {
    format!("{SNIPPET_BASE}{sensor_token}_{}", time_token(first_time))
}

/// The substitute IRI projected for a literal sensor.
#[must_use]
pub fn sensor_iri(sensor_token: &str) -> String {
    format!("{SENSOR_BASE}{sensor_token}")
}

/// Two or more sensors whose sanitized tokens coincided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCollision {
    /// The shared sanitized token.
    pub token: String,
    /// The colliding sensors, in N3 form.
    pub sensors: Vec<String>,
}

/// Resolves every sensor term to a [`Sensor`] with a run-unique token.
///
/// Sensors whose sanitized tokens collide get a digest suffix derived from
/// their N3 form. Hardened tokens are checked against every other token
/// again; a sensor whose plain token clashes with a hardened one is
/// hardened too, and digests clashing with each other are lengthened. The
/// outcome depends only on the set of terms, not on their order. Sensors
/// come back sorted by term.
#[must_use]
pub fn resolve_tokens(terms: Vec<Term>) -> (Vec<Sensor>, Vec<TokenCollision>) {
    let terms: BTreeSet<Term> = terms.into_iter().collect();
    let plain: Vec<(&Term, String)> = terms.iter().map(|t| (t, sensor_token(t))).collect();
    let mut hardened: BTreeSet<&Term> = BTreeSet::new();
    let mut digest_len = DIGEST_SUFFIX_LEN;
    let mut collisions = Vec::new();

    loop {
        let mut by_token: BTreeMap<String, Vec<&Term>> = BTreeMap::new();
        for (term, token) in &plain {
            let token = if hardened.contains(term) {
                format!("{token}-{}", digest(term, digest_len))
            } else {
                token.clone()
            };
            by_token.entry(token).or_default().push(*term);
        }

        let clashes: Vec<_> = by_token.iter().filter(|(_, group)| group.len() > 1).collect();
        if clashes.is_empty() || digest_len >= FULL_DIGEST_LEN {
            let mut sensors: Vec<Sensor> = by_token
                .into_iter()
                .flat_map(|(token, group)| {
                    group.into_iter().map(move |term| Sensor {
                        term: term.clone(),
                        token: token.clone(),
                    })
                })
                .collect();
            sensors.sort_by(|a, b| a.term.cmp(&b.term));
            return (sensors, collisions);
        }

        let mut lengthen = false;
        for (token, group) in clashes {
            collisions.push(TokenCollision {
                token: token.clone(),
                sensors: group.iter().map(|t| t.to_n3()).collect(),
            });
            if group.iter().all(|t| hardened.contains(t)) {
                lengthen = true;
            } else {
                hardened.extend(group.iter().copied());
            }
        }
        if lengthen {
            digest_len = (digest_len * 2).min(FULL_DIGEST_LEN);
        }
    }
}

fn digest(term: &Term, len: usize) -> String {
    let hash = Sha256::digest(term.to_n3().as_bytes());
    let mut hex = hex::encode(hash);
    hex.truncate(len);
    hex
}

fn percent_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

//! JSON-LD context for the `tss:points` payload.
//!
//! The context is published once alongside a snippet document rather than
//! repeated inside every snippet.

use serde_json::{json, Value};

use crate::model::iris::{
    SOSA_HAS_SIMPLE_RESULT, SOSA_OBSERVED_PROPERTY, SOSA_RESULT_TIME, XSD_DATETIME, XSD_INTEGER,
};

/// Returns the JSON-LD context mapping the keys of a points entry.
#[must_use]
pub fn points_context() -> Value {
    json!({
        "@context": {
            "id": "@id",
            "time": {
                "@id": SOSA_RESULT_TIME,
                "@type": XSD_DATETIME
            },
            "value": {
                "@id": SOSA_HAS_SIMPLE_RESULT,
                "@type": XSD_INTEGER
            },
            "observedProperty": {
                "@id": SOSA_OBSERVED_PROPERTY,
                "@type": "@id"
            }
        }
    })
}

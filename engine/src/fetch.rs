//! Per-sensor observation fetch.

use crate::error::CompactError;
use crate::model::{Observation, Term};
use crate::query::{
    QueryEngine, Row, SelectQuery, VAR_OBSERVATION, VAR_PROPERTY, VAR_READING, VAR_TIME,
};

/// Retrieves every observation made by `sensor`, ascending by time.
///
/// An empty result means the sensor has no data and is not an error.
///
/// # Errors
///
/// Returns [`CompactError::MissingBinding`] if a row lacks one of the four
/// projected variables, or [`CompactError::Query`] if the engine fails.
pub fn fetch_observations(
    engine: &impl QueryEngine,
    sensor: &Term,
) -> Result<Vec<Observation>, CompactError> {
    let rows = engine.select(&SelectQuery::ObservationsBy(sensor.clone()))?;
    rows.iter().map(|row| observation(row, sensor)).collect()
}

fn observation(row: &Row, sensor: &Term) -> Result<Observation, CompactError> {
    let binding = |variable: &'static str| {
        row.get(variable).ok_or_else(|| CompactError::MissingBinding {
            sensor: sensor.to_n3(),
            variable,
        })
    };
    Ok(Observation {
        id: binding(VAR_OBSERVATION)?.value().to_owned(),
        time: binding(VAR_TIME)?.value().to_owned(),
        value: binding(VAR_READING)?.value().to_owned(),
        observed_property: binding(VAR_PROPERTY)?.clone(),
    })
}

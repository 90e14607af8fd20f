use std::fmt;
use std::io;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::limits::*;
use crate::model::*;
use crate::overlay::RuleOverlay;
use crate::store::StoreError;

/// Failure reading an external data file (overlays, exported tables).
/// These mean the source itself is broken, so callers abort instead of
/// reporting a status.
#[derive(Debug)]
pub enum SourceError {
    Io(io::Error),
    Json(serde_json::Error),
    Csv(csv::Error),
    InvalidData(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Io(e) => write!(f, "io error: {e}"),
            SourceError::Json(e) => write!(f, "malformed JSON: {e}"),
            SourceError::Csv(e) => write!(f, "malformed CSV: {e}"),
            SourceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for SourceError {}

impl From<io::Error> for SourceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<csv::Error> for SourceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

/// One row of the exported reservation table, fields still raw strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImportRow {
    #[serde(alias = "identity")]
    pub id: String,
    pub room: String,
    pub arrival: String,
    pub departure: String,
}

impl ImportRow {
    pub fn new(id: &str, room: &str, arrival: &str, departure: &str) -> Self {
        Self {
            id: id.to_string(),
            room: room.to_string(),
            arrival: arrival.to_string(),
            departure: departure.to_string(),
        }
    }
}

/// Read rows from a CSV export with an `id,room,arrival,departure` header.
/// Other columns are ignored.
pub fn read_rows_csv(path: &Path) -> Result<Vec<ImportRow>, SourceError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize::<ImportRow>() {
        rows.push(record?);
    }
    debug!("read {} import rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// First merge pass: turn rows into reservations, letting the rule overlay
/// replace a row's own dates with its explicit stay list.
///
/// Any row whose dates do not parse, or describe an empty or inverted stay,
/// fails the whole expansion.
pub fn expand_rows<I>(rows: I, rules: &RuleOverlay) -> Result<Vec<Reservation>, StoreError>
where
    I: IntoIterator<Item = ImportRow>,
{
    let mut reservations = Vec::new();
    for row in rows {
        let identity = row.id.trim();
        if identity.len() > MAX_IDENTITY_LEN {
            return Err(StoreError::LimitExceeded("identity too long"));
        }
        match rules.get(identity) {
            Some(stays) => {
                for stay in stays {
                    reservations.push(Reservation::new(identity, &row.room, *stay));
                }
            }
            None => {
                let arrival = parse_date(&row.arrival)
                    .ok_or_else(|| StoreError::InvalidDate(row.arrival.clone()))?;
                let departure = parse_date(&row.departure)
                    .ok_or_else(|| StoreError::InvalidDate(row.departure.clone()))?;
                let stay = Stay::try_new(arrival, departure)
                    .ok_or(StoreError::InvalidRange { arrival, departure })?;
                reservations.push(Reservation::new(identity, &row.room, stay));
            }
        }
        if reservations.len() > MAX_RESERVATIONS {
            return Err(StoreError::LimitExceeded("too many reservations"));
        }
    }
    Ok(reservations)
}

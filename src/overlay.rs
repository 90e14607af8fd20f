use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::import::SourceError;
use crate::model::*;

/// Read a JSON file, treating a missing file as "no overlay".
fn read_optional(path: &Path) -> Result<Option<String>, SourceError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("no overlay file at {}, using empty overlay", path.display());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Keys are trimmed, so `"7"` and `" 7"` name the same reservation.
fn duplicate_key(identity: &str) -> SourceError {
    SourceError::InvalidData(format!("identity '{identity}' appears more than once"))
}

/// Identity → explicit stays. Replaces the dates an import row carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleOverlay {
    stays: HashMap<String, Vec<Stay>>,
}

impl RuleOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identity: impl Into<String>, stays: Vec<Stay>) {
        self.stays.insert(identity.into(), stays);
    }

    pub fn get(&self, identity: &str) -> Option<&[Stay]> {
        self.stays.get(identity).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.stays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stays.is_empty()
    }

    /// `{"<identity>": [["DD/MM/YYYY", "DD/MM/YYYY"], ...]}`
    pub fn from_json_str(text: &str) -> Result<Self, SourceError> {
        let raw: HashMap<String, Vec<(String, String)>> = serde_json::from_str(text)?;
        let mut overlay = Self::new();
        for (identity, pairs) in raw {
            let mut stays = Vec::with_capacity(pairs.len());
            for (arrival, departure) in pairs {
                let a = parse_date(&arrival).ok_or_else(|| {
                    SourceError::InvalidData(format!("rule for {identity}: bad date '{arrival}'"))
                })?;
                let d = parse_date(&departure).ok_or_else(|| {
                    SourceError::InvalidData(format!("rule for {identity}: bad date '{departure}'"))
                })?;
                let stay = Stay::try_new(a, d).ok_or_else(|| {
                    SourceError::InvalidData(format!(
                        "rule for {identity}: departure {departure} not after arrival {arrival}"
                    ))
                })?;
                stays.push(stay);
            }
            let key = identity.trim();
            if overlay.stays.contains_key(key) {
                return Err(duplicate_key(key));
            }
            overlay.insert(key, stays);
        }
        Ok(overlay)
    }

    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let Some(text) = read_optional(path)? else {
            return Ok(Self::new());
        };
        let overlay = Self::from_json_str(&text)?;
        info!("loaded {} stay rules from {}", overlay.len(), path.display());
        Ok(overlay)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCycle {
    Days(i64),
    Text(String),
}

/// Identity → service cycle, applied after the rows have been expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceOverlay {
    cycles: HashMap<String, ServiceCycle>,
}

impl ServiceOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identity: impl Into<String>, cycle: ServiceCycle) {
        self.cycles.insert(identity.into(), cycle);
    }

    pub fn get(&self, identity: &str) -> Option<ServiceCycle> {
        self.cycles.get(identity).copied()
    }

    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }

    /// Second merge pass. Every reservation whose identity is a key takes
    /// the overlay's cycle, including each stay a rule expanded.
    /// Returns how many reservations were updated.
    pub fn apply(&self, reservations: &mut [Reservation]) -> usize {
        let mut applied = 0;
        for reservation in reservations.iter_mut() {
            if let Some(cycle) = self.get(&reservation.identity) {
                reservation.service_cycle = cycle;
                applied += 1;
            }
        }
        applied
    }

    /// `{"<identity>": 2, "<identity>": "n"}`
    pub fn from_json_str(text: &str) -> Result<Self, SourceError> {
        let raw: HashMap<String, RawCycle> = serde_json::from_str(text)?;
        let mut overlay = Self::new();
        for (identity, value) in raw {
            let cycle = match value {
                RawCycle::Days(n) => u32::try_from(n)
                    .ok()
                    .and_then(ServiceCycle::every)
                    .ok_or_else(|| {
                        SourceError::InvalidData(format!(
                            "service for {identity}: cycle must be positive, got {n}"
                        ))
                    })?,
                RawCycle::Text(s) => ServiceCycle::normalize(&s),
            };
            let key = identity.trim();
            if overlay.cycles.contains_key(key) {
                return Err(duplicate_key(key));
            }
            overlay.insert(key, cycle);
        }
        Ok(overlay)
    }

    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let Some(text) = read_optional(path)? else {
            return Ok(Self::new());
        };
        let overlay = Self::from_json_str(&text)?;
        info!("loaded {} service overrides from {}", overlay.len(), path.display());
        Ok(overlay)
    }
}

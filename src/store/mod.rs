mod conflict;
mod error;
mod mutations;
mod queries;
#[cfg(test)]
mod tests;

pub use error::StoreError;

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info};

use crate::model::*;
use crate::observability;
use crate::snapshot::Snapshot;

/// Owns every reservation of one hotel and the image they persist to.
///
/// Single-owner and synchronous: callers hold it by value and pass `&mut`
/// to mutations. Every successful mutation rewrites the whole image before
/// returning, and a failed write rolls the in-memory change back.
pub struct BookingStore {
    rooms: BTreeSet<String>,
    reservations: Vec<Reservation>,
    snapshot: Snapshot,
}

impl BookingStore {
    /// Open the store at `path`, loading its image if one exists.
    /// A missing image starts empty; an unreadable one is an error.
    pub fn open<I, S>(rooms: I, path: impl Into<PathBuf>) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = Self {
            rooms: rooms.into_iter().map(|r| normalize_room(r.as_ref())).collect(),
            reservations: Vec::new(),
            snapshot: Snapshot::new(path),
        };
        store.reload()?;
        info!(
            "opened booking store at {} ({} rooms, {} reservations)",
            store.snapshot.path().display(),
            store.rooms.len(),
            store.reservations.len()
        );
        Ok(store)
    }

    /// Replace the in-memory collection with whatever the image holds.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        let loaded = self.snapshot.load().map_err(|e| {
            StoreError::Storage(format!("{}: {e}", self.snapshot.path().display()))
        })?;
        self.reservations = loaded.unwrap_or_default();
        metrics::gauge!(observability::RESERVATIONS).set(self.reservations.len() as f64);
        Ok(())
    }

    /// Write the full collection, replacing any previous image.
    pub fn persist(&self) -> Result<(), StoreError> {
        let start = Instant::now();
        self.snapshot.write(&self.reservations).map_err(|e| {
            StoreError::Storage(format!("{}: {e}", self.snapshot.path().display()))
        })?;
        metrics::histogram!(observability::SNAPSHOT_WRITE_DURATION_SECONDS)
            .record(start.elapsed().as_secs_f64());
        metrics::gauge!(observability::RESERVATIONS).set(self.reservations.len() as f64);
        debug!(
            "persisted {} reservations to {}",
            self.reservations.len(),
            self.snapshot.path().display()
        );
        Ok(())
    }

    /// Persist after a mutation; on failure run `undo` so memory matches disk.
    pub(super) fn persist_or_undo(
        &mut self,
        undo: impl FnOnce(&mut Vec<Reservation>),
    ) -> Result<(), StoreError> {
        if let Err(e) = self.persist() {
            undo(&mut self.reservations);
            return Err(e);
        }
        Ok(())
    }
}

use std::mem;

use tracing::{info, warn};
use ulid::Ulid;

use crate::import::{ImportRow, expand_rows};
use crate::limits::*;
use crate::model::*;
use crate::observability;
use crate::overlay::{RuleOverlay, ServiceOverlay};

use super::conflict::check_no_conflict;
use super::{BookingStore, StoreError};

impl BookingStore {
    /// Replace the whole collection with a fresh import.
    ///
    /// Rows are expanded through `rules` first, then `services` overrides
    /// cycles on the result. Room exclusivity is not re-checked: the export
    /// is the hotel's record of truth. Nothing is replaced or written unless
    /// every row expands cleanly.
    pub fn bulk_import<I>(
        &mut self,
        rows: I,
        rules: &RuleOverlay,
        services: &ServiceOverlay,
    ) -> Result<String, StoreError>
    where
        I: IntoIterator<Item = ImportRow>,
    {
        let mut reservations = expand_rows(rows, rules)?;
        let overridden = services.apply(&mut reservations);

        let unknown: Vec<&str> = reservations
            .iter()
            .filter(|r| !self.rooms.contains(&r.room))
            .map(|r| r.room.as_str())
            .collect();
        if !unknown.is_empty() {
            warn!("import references rooms outside the configured set: {unknown:?}");
        }

        let count = reservations.len();
        let previous = mem::replace(&mut self.reservations, reservations);
        self.persist_or_undo(|current| *current = previous)?;

        metrics::counter!(observability::IMPORTS_TOTAL).increment(1);
        info!("imported {count} reservations, {overridden} with service overrides");
        Ok(format!(
            "Imported {count} reservations ({overridden} with custom service cycles)."
        ))
    }

    /// Add one stay by hand and return its freshly generated identity.
    ///
    /// Checks run in order: room, dates, range, overlap. `service_cycle` is
    /// operator text and goes through [`ServiceCycle::normalize`].
    pub fn add(
        &mut self,
        room: &str,
        arrival: &str,
        departure: &str,
        service_cycle: &str,
    ) -> Result<String, StoreError> {
        let result = self.try_add(room, arrival, departure, service_cycle);
        match &result {
            Ok(id) => {
                metrics::counter!(observability::RESERVATIONS_ADDED_TOTAL).increment(1);
                info!("added reservation {id} for room {}", normalize_room(room));
            }
            Err(e) => {
                metrics::counter!(
                    observability::RESERVATIONS_REJECTED_TOTAL,
                    "reason" => observability::rejection_label(e)
                )
                .increment(1);
                info!("rejected reservation for room {room}: {e}");
            }
        }
        result
    }

    fn try_add(
        &mut self,
        room: &str,
        arrival: &str,
        departure: &str,
        service_cycle: &str,
    ) -> Result<String, StoreError> {
        let room = normalize_room(room);
        if !self.rooms.contains(&room) {
            return Err(StoreError::InvalidRoom(room));
        }

        let arrival_date =
            parse_date(arrival).ok_or_else(|| StoreError::InvalidDate(arrival.to_string()))?;
        let departure_date =
            parse_date(departure).ok_or_else(|| StoreError::InvalidDate(departure.to_string()))?;
        let stay = Stay::try_new(arrival_date, departure_date).ok_or(StoreError::InvalidRange {
            arrival: arrival_date,
            departure: departure_date,
        })?;

        check_no_conflict(&self.reservations, &room, &stay)?;

        if self.reservations.len() >= MAX_RESERVATIONS {
            return Err(StoreError::LimitExceeded("too many reservations"));
        }

        let identity = Ulid::new().to_string();
        let reservation = Reservation::new(identity.clone(), &room, stay)
            .with_service_cycle(ServiceCycle::normalize(service_cycle));
        self.reservations.push(reservation);
        self.persist_or_undo(|current| {
            current.pop();
        })?;
        Ok(identity)
    }

    /// Set the cycle of the first reservation carrying `identity`.
    pub fn update_service(
        &mut self,
        identity: &str,
        service_cycle: ServiceCycle,
    ) -> Result<(), StoreError> {
        let pos = self
            .reservations
            .iter()
            .position(|r| r.identity == identity)
            .ok_or_else(|| StoreError::NotFound(identity.to_string()))?;

        let previous = mem::replace(&mut self.reservations[pos].service_cycle, service_cycle);
        self.persist_or_undo(|current| current[pos].service_cycle = previous)?;

        info!("service cycle for reservation {identity} set to {service_cycle}");
        Ok(())
    }
}

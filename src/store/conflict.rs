use crate::model::*;

use super::StoreError;

/// A room holds one stay at a time. Checkout day may equal the next arrival.
pub(crate) fn check_no_conflict(
    reservations: &[Reservation],
    room: &str,
    stay: &Stay,
) -> Result<(), StoreError> {
    match reservations
        .iter()
        .find(|r| r.room == room && r.stay.overlaps(stay))
    {
        Some(existing) => Err(StoreError::RoomOccupied {
            room: room.to_string(),
            conflicting: existing.identity.clone(),
        }),
        None => Ok(()),
    }
}

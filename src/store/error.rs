use chrono::NaiveDate;

use crate::model::format_date;

/// Everything a store operation can refuse. The first five are business
/// outcomes the front-end shows to the operator; `Storage` means the image
/// on disk could not be read or written.
#[derive(Debug)]
pub enum StoreError {
    InvalidRoom(String),
    InvalidDate(String),
    InvalidRange {
        arrival: NaiveDate,
        departure: NaiveDate,
    },
    RoomOccupied {
        room: String,
        conflicting: String,
    },
    NotFound(String),
    LimitExceeded(&'static str),
    Storage(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::InvalidRoom(room) => write!(f, "invalid room name: {room}"),
            StoreError::InvalidDate(s) => write!(f, "invalid date '{s}': expected DD/MM/YYYY"),
            StoreError::InvalidRange { arrival, departure } => write!(
                f,
                "departure date {} must be after arrival date {}",
                format_date(*departure),
                format_date(*arrival)
            ),
            StoreError::RoomOccupied { room, conflicting } => write!(
                f,
                "room {room} is already occupied during the given period (reservation {conflicting})"
            ),
            StoreError::NotFound(id) => write!(f, "no reservation found with ID {id}"),
            StoreError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            StoreError::Storage(e) => write!(f, "storage error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

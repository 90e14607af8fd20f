use std::fmt;
use std::num::NonZeroU32;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The only date format the hotel exchanges: `DD/MM/YYYY`.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Rooms are compared and stored in uppercase.
pub fn normalize_room(room: &str) -> String {
    room.trim().to_uppercase()
}

/// Half-open night range `[arrival, departure)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stay {
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
}

impl Stay {
    pub fn new(arrival: NaiveDate, departure: NaiveDate) -> Self {
        debug_assert!(arrival < departure, "Stay arrival must be before departure");
        Self { arrival, departure }
    }

    /// `None` unless departure is strictly after arrival.
    pub fn try_new(arrival: NaiveDate, departure: NaiveDate) -> Option<Self> {
        (arrival < departure).then_some(Self { arrival, departure })
    }

    pub fn nights(&self) -> i64 {
        (self.departure - self.arrival).num_days()
    }

    pub fn overlaps(&self, other: &Stay) -> bool {
        !(self.arrival >= other.departure || self.departure <= other.arrival)
    }

    /// Housekeeping visits a room on both the arrival and the departure day,
    /// so this check is inclusive at both ends.
    pub fn covers_day(&self, day: NaiveDate) -> bool {
        self.arrival <= day && day <= self.departure
    }
}

/// How often a stay gets a housekeeping service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceCycle {
    /// Guest opted out: no jobs at all, not even turnover or check-out.
    Never,
    /// Service every N days, counted from arrival.
    Every(NonZeroU32),
}

impl Default for ServiceCycle {
    fn default() -> Self {
        ServiceCycle::Every(NonZeroU32::MIN)
    }
}

impl ServiceCycle {
    pub fn every(days: u32) -> Option<Self> {
        NonZeroU32::new(days).map(ServiceCycle::Every)
    }

    /// Lenient parse used for operator input: `n`/`N` means never, a positive
    /// decimal number is the cycle length, and anything else falls back to daily.
    pub fn normalize(input: &str) -> Self {
        let s = input.trim();
        if s.eq_ignore_ascii_case("n") {
            return ServiceCycle::Never;
        }
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return ServiceCycle::default();
        }
        s.parse::<u32>()
            .ok()
            .and_then(ServiceCycle::every)
            .unwrap_or_default()
    }
}

impl fmt::Display for ServiceCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceCycle::Never => write!(f, "n"),
            ServiceCycle::Every(n) => write!(f, "{n}"),
        }
    }
}

/// One stay record. Identity is whatever the source system used and is not
/// unique: an imported guest may hold several disjoint stays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub identity: String,
    pub room: String,
    pub stay: Stay,
    pub service_cycle: ServiceCycle,
}

impl Reservation {
    pub fn new(identity: impl Into<String>, room: &str, stay: Stay) -> Self {
        Self {
            identity: identity.into(),
            room: normalize_room(room),
            stay,
            service_cycle: ServiceCycle::default(),
        }
    }

    pub fn with_service_cycle(mut self, service_cycle: ServiceCycle) -> Self {
        self.service_cycle = service_cycle;
        self
    }
}

impl fmt::Display for Reservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}, Room: {}, Arrival: {}, Departure: {}, Service cycle: {}",
            self.identity,
            self.room,
            format_date(self.stay.arrival),
            format_date(self.stay.departure),
            self.service_cycle,
        )
    }
}

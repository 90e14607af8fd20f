use chrono::NaiveDate;

use crate::jobs::{self, JobReport};
use crate::model::*;

use super::BookingStore;

impl BookingStore {
    pub fn len(&self) -> usize {
        self.reservations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }

    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    pub fn rooms(&self) -> impl Iterator<Item = &str> {
        self.rooms.iter().map(String::as_str)
    }

    pub fn has_room(&self, room: &str) -> bool {
        self.rooms.contains(&normalize_room(room))
    }

    /// First reservation carrying `identity`, the same one `update_service` edits.
    pub fn get(&self, identity: &str) -> Option<&Reservation> {
        self.reservations.iter().find(|r| r.identity == identity)
    }

    pub fn reservations_for_room<'a>(&'a self, room: &str) -> impl Iterator<Item = &'a Reservation> {
        let room = normalize_room(room);
        self.reservations.iter().filter(move |r| r.room == room)
    }

    /// One formatted line per reservation, in store order. The iterator is
    /// `Clone`, so a caller can walk the listing as many times as it likes.
    pub fn list_all(&self) -> impl Iterator<Item = String> + Clone {
        self.reservations.iter().map(ToString::to_string)
    }

    pub fn today_jobs(&self, date: NaiveDate) -> JobReport {
        JobReport::for_date(&self.reservations, date)
    }

    pub fn week_projection(&self, start: NaiveDate) -> String {
        jobs::week_projection(&self.reservations, start)
    }
}

//! Housekeeping jobs derived from the reservations on a given day.
//!
//! A reservation produces at most one job per day:
//!
//! - arrival day: general turnover of the room
//! - departure day: check-out
//! - in between, with a cycle of N days and `days` since arrival:
//!   `days % 2N == N` is a towel change, `days % 2N == 0` is towels and linens
//!
//! Stays with a `Never` cycle produce nothing, not even turnover.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use chrono::{Duration, NaiveDate};

use crate::model::*;

/// Width of every report line, markers included.
const REPORT_WIDTH: usize = 30;
const HEADER_MARKER_LEN: usize = 10;
const WEEK_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JobKind {
    CheckOut,
    GeneralTurnover,
    Towels,
    TowelsAndLinens,
}

impl JobKind {
    pub fn label(&self) -> &'static str {
        match self {
            JobKind::CheckOut => "Check-out",
            JobKind::GeneralTurnover => "General turnover",
            JobKind::Towels => "Towels",
            JobKind::TowelsAndLinens => "Towels/Linens",
        }
    }
}

/// Jobs are keyed by room and kind, so two rooms never collapse into one line.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Job {
    pub room: String,
    pub kind: JobKind,
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "* {}: {}", self.room, self.kind.label())
    }
}

pub fn job_for(reservation: &Reservation, today: NaiveDate) -> Option<JobKind> {
    let stay = &reservation.stay;
    if !stay.covers_day(today) {
        return None;
    }
    let ServiceCycle::Every(n) = reservation.service_cycle else {
        return None;
    };
    if today == stay.arrival {
        return Some(JobKind::GeneralTurnover);
    }
    if today == stay.departure {
        return Some(JobKind::CheckOut);
    }

    let days = (today - stay.arrival).num_days();
    let n = i64::from(n.get());
    match days % (2 * n) {
        r if r == n => Some(JobKind::Towels),
        0 if days != 0 => Some(JobKind::TowelsAndLinens),
        _ => None,
    }
}

pub fn jobs_on(reservations: &[Reservation], today: NaiveDate) -> BTreeSet<Job> {
    reservations
        .iter()
        .filter_map(|r| {
            job_for(r, today).map(|kind| Job {
                room: r.room.clone(),
                kind,
            })
        })
        .collect()
}

/// The printable job sheet for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub date: NaiveDate,
    pub jobs: BTreeSet<Job>,
}

impl JobReport {
    pub fn for_date(reservations: &[Reservation], date: NaiveDate) -> Self {
        Self {
            date,
            jobs: jobs_on(reservations, date),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Write the sheet as plain text for the printer queue.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        fs::write(path, format!("{self}\n"))
    }
}

impl fmt::Display for JobReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = "*".repeat(HEADER_MARKER_LEN);
        write!(f, "{marker}{}{marker}", format_date(self.date))?;
        for job in &self.jobs {
            write!(f, "\n{:<width$}*", job.to_string(), width = REPORT_WIDTH - 1)?;
        }
        write!(f, "\n{}", "*".repeat(REPORT_WIDTH))
    }
}

/// Reports for `start` and the six days after it, one block per day.
/// The projection stops early at the end of the representable calendar.
pub fn week_projection(reservations: &[Reservation], start: NaiveDate) -> String {
    (0..WEEK_DAYS)
        .map_while(|offset| start.checked_add_signed(Duration::days(offset)))
        .map(|date| JobReport::for_date(reservations, date).to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

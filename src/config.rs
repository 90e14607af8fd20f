use std::path::PathBuf;

use crate::model::normalize_room;

/// The hotel's rooms when `TURNOVER_ROOMS` is not set.
pub const DEFAULT_ROOMS: &[&str] = &[
    "R11", "R12", "R13", "R14", "R15", "R16", "R21", "R22", "R23", "R24", "R31", "R32", "R33",
    "R34",
];

pub const SNAPSHOT_FILE: &str = "bookings.snap";
pub const JOBS_FILE: &str = "jobs.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub rooms: Vec<String>,
    pub rules_path: PathBuf,
    pub services_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, so tests need not touch the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = PathBuf::from(lookup("TURNOVER_DATA_DIR").unwrap_or_else(|| ".".into()));

        let mut rooms: Vec<String> = lookup("TURNOVER_ROOMS")
            .map(|s| {
                s.split(',')
                    .map(normalize_room)
                    .filter(|r| !r.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        if rooms.is_empty() {
            rooms = DEFAULT_ROOMS.iter().map(|r| r.to_string()).collect();
        }

        let rules_path = lookup("TURNOVER_RULES")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("rules.json"));
        let services_path = lookup("TURNOVER_SERVICES")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("services.json"));

        Self {
            data_dir,
            rooms,
            rules_path,
            services_path,
        }
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILE)
    }

    pub fn jobs_path(&self) -> PathBuf {
        self.data_dir.join(JOBS_FILE)
    }
}

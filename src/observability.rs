use crate::store::StoreError;

// ── Store metrics ───────────────────────────────────────────────

/// Counter: reservations accepted by manual add.
pub const RESERVATIONS_ADDED_TOTAL: &str = "turnover_reservations_added_total";

/// Counter: manual adds refused. Labels: reason.
pub const RESERVATIONS_REJECTED_TOTAL: &str = "turnover_reservations_rejected_total";

/// Counter: completed bulk imports.
pub const IMPORTS_TOTAL: &str = "turnover_imports_total";

/// Gauge: reservations currently held by the store.
pub const RESERVATIONS: &str = "turnover_reservations";

/// Histogram: snapshot write duration in seconds.
pub const SNAPSHOT_WRITE_DURATION_SECONDS: &str = "turnover_snapshot_write_duration_seconds";

/// Install the log subscriber. Logs go to stderr; stdout carries reports.
pub fn init() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
}

/// Map a StoreError variant to a short label for metrics.
pub fn rejection_label(err: &StoreError) -> &'static str {
    match err {
        StoreError::InvalidRoom(_) => "invalid_room",
        StoreError::InvalidDate(_) => "invalid_date",
        StoreError::InvalidRange { .. } => "invalid_range",
        StoreError::RoomOccupied { .. } => "room_occupied",
        StoreError::NotFound(_) => "not_found",
        StoreError::LimitExceeded(_) => "limit_exceeded",
        StoreError::Storage(_) => "storage",
    }
}

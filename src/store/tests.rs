use std::path::PathBuf;

use chrono::NaiveDate;

use super::*;
use crate::import::ImportRow;
use crate::overlay::{RuleOverlay, ServiceOverlay};

const ROOMS: &[&str] = &["R11", "R12", "R21"];

fn test_snapshot_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("turnover_test_store");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    let _ = std::fs::remove_file(&path);
    path
}

fn d(day: u32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

fn every(n: u32) -> ServiceCycle {
    ServiceCycle::every(n).unwrap()
}

fn open(name: &str) -> BookingStore {
    BookingStore::open(ROOMS, test_snapshot_path(name)).unwrap()
}

// ── open / reload ────────────────────────────────────────

#[test]
fn open_without_image_starts_empty() {
    let store = open("open_empty.snap");
    assert!(store.is_empty());
    assert_eq!(store.rooms().collect::<Vec<_>>(), vec!["R11", "R12", "R21"]);
}

#[test]
fn open_normalizes_configured_rooms() {
    let path = test_snapshot_path("open_rooms.snap");
    let store = BookingStore::open(["r11", " R12 "], &path).unwrap();
    assert!(store.has_room("R11"));
    assert!(store.has_room("r12"));
    assert!(!store.has_room("R13"));
}

#[test]
fn open_fails_on_corrupt_image() {
    let path = test_snapshot_path("open_corrupt.snap");
    std::fs::write(&path, b"definitely not a snapshot").unwrap();
    match BookingStore::open(ROOMS, &path) {
        Err(StoreError::Storage(_)) => {}
        Err(e) => panic!("expected Storage, got {e}"),
        Ok(_) => panic!("corrupt image must not open"),
    }
}

#[test]
fn persist_then_reopen_roundtrips_all_fields() {
    let path = test_snapshot_path("roundtrip.snap");
    let mut store = BookingStore::open(ROOMS, &path).unwrap();
    store.add("R11", "01/06/2024", "05/06/2024", "1").unwrap();
    store.add("r12", "02/06/2024", "09/06/2024", "3").unwrap();
    let never = store.add("R21", "28/06/2024", "02/07/2024", "n").unwrap();
    store.update_service(&never, every(2)).unwrap();

    let reopened = BookingStore::open(ROOMS, &path).unwrap();
    assert_eq!(reopened.reservations(), store.reservations());
}

#[test]
fn reload_discards_unpersisted_view() {
    let path = test_snapshot_path("reload.snap");
    let mut a = BookingStore::open(ROOMS, &path).unwrap();
    let mut b = BookingStore::open(ROOMS, &path).unwrap();

    a.add("R11", "01/06/2024", "05/06/2024", "1").unwrap();
    assert!(b.is_empty());
    b.reload().unwrap();
    assert_eq!(b.len(), 1);
}

// ── add ──────────────────────────────────────────────────

#[test]
fn add_normalizes_room_and_cycle() {
    let mut store = open("add_normalizes.snap");
    let id = store.add("r11", "01/06/2024", "05/06/2024", "N").unwrap();
    let r = store.get(&id).unwrap();
    assert_eq!(r.room, "R11");
    assert_eq!(r.stay, Stay::new(d(1, 6), d(5, 6)));
    assert_eq!(r.service_cycle, ServiceCycle::Never);

    let id = store.add("R12", "01/06/2024", "05/06/2024", "whatever").unwrap();
    assert_eq!(store.get(&id).unwrap().service_cycle, ServiceCycle::default());
}

#[test]
fn add_rejects_unknown_room() {
    let mut store = open("add_unknown_room.snap");
    match store.add("R99", "01/06/2024", "05/06/2024", "1") {
        Err(StoreError::InvalidRoom(room)) => assert_eq!(room, "R99"),
        other => panic!("expected InvalidRoom, got {other:?}"),
    }
    assert!(store.is_empty());
}

#[test]
fn add_rejects_bad_dates() {
    let mut store = open("add_bad_dates.snap");
    assert!(matches!(
        store.add("R11", "2024-06-01", "05/06/2024", "1"),
        Err(StoreError::InvalidDate(s)) if s == "2024-06-01"
    ));
    assert!(matches!(
        store.add("R11", "01/06/2024", "32/06/2024", "1"),
        Err(StoreError::InvalidDate(_))
    ));
    assert!(store.is_empty());
}

#[test]
fn add_rejects_inverted_range() {
    let mut store = open("add_inverted.snap");
    match store.add("r11", "05/06/2024", "01/06/2024", "1") {
        Err(StoreError::InvalidRange { arrival, departure }) => {
            assert_eq!(arrival, d(5, 6));
            assert_eq!(departure, d(1, 6));
        }
        other => panic!("expected InvalidRange, got {other:?}"),
    }
}

#[test]
fn add_rejects_same_day_range() {
    let mut store = open("add_same_day.snap");
    assert!(matches!(
        store.add("R11", "01/06/2024", "01/06/2024", "1"),
        Err(StoreError::InvalidRange { .. })
    ));
}

#[test]
fn room_check_comes_before_date_check() {
    let mut store = open("add_order.snap");
    assert!(matches!(
        store.add("R99", "garbage", "garbage", "1"),
        Err(StoreError::InvalidRoom(_))
    ));
}

#[test]
fn add_rejects_overlap_in_same_room() {
    let mut store = open("add_overlap.snap");
    let first = store.add("R11", "01/06/2024", "05/06/2024", "1").unwrap();
    match store.add("R11", "04/06/2024", "08/06/2024", "1") {
        Err(StoreError::RoomOccupied { room, conflicting }) => {
            assert_eq!(room, "R11");
            assert_eq!(conflicting, first);
        }
        other => panic!("expected RoomOccupied, got {other:?}"),
    }
    // Fully contained stay is also an overlap.
    assert!(matches!(
        store.add("r11", "02/06/2024", "03/06/2024", "1"),
        Err(StoreError::RoomOccupied { .. })
    ));
    assert_eq!(store.len(), 1);
}

#[test]
fn add_allows_back_to_back_and_other_rooms() {
    let mut store = open("add_adjacent.snap");
    store.add("R11", "01/06/2024", "05/06/2024", "1").unwrap();
    store.add("R11", "05/06/2024", "08/06/2024", "1").unwrap();
    store.add("R11", "25/05/2024", "01/06/2024", "1").unwrap();
    store.add("R12", "01/06/2024", "05/06/2024", "1").unwrap();
    assert_eq!(store.len(), 4);
}

#[test]
fn stored_stays_never_overlap_per_room() {
    let mut store = open("add_invariant.snap");
    let attempts = [
        ("R11", "01/06/2024", "10/06/2024"),
        ("R11", "05/06/2024", "07/06/2024"),
        ("R11", "10/06/2024", "12/06/2024"),
        ("R11", "11/06/2024", "15/06/2024"),
        ("R12", "03/06/2024", "04/06/2024"),
        ("R12", "01/06/2024", "30/06/2024"),
        ("R21", "20/05/2024", "02/06/2024"),
        ("R21", "01/06/2024", "03/06/2024"),
    ];
    for (room, a, dep) in attempts {
        let _ = store.add(room, a, dep, "1");
    }
    let all = store.reservations();
    for (i, x) in all.iter().enumerate() {
        for y in &all[i + 1..] {
            assert!(
                x.room != y.room || !x.stay.overlaps(&y.stay),
                "overlap between {x} and {y}"
            );
        }
    }
    assert_eq!(store.len(), 4);
}

#[test]
fn add_assigns_distinct_identities() {
    let mut store = open("add_ids.snap");
    let a = store.add("R11", "01/06/2024", "05/06/2024", "1").unwrap();
    let b = store.add("R12", "01/06/2024", "05/06/2024", "1").unwrap();
    assert_ne!(a, b);
    assert_eq!(store.get(&a).unwrap().room, "R11");
    assert_eq!(store.get(&b).unwrap().room, "R12");
}

#[test]
fn add_accepts_long_stay() {
    let mut store = open("add_long.snap");
    let id = store.add("R11", "01/01/2024", "01/06/2025", "1").unwrap();
    assert_eq!(store.get(&id).unwrap().stay.nights(), 517);
}

#[test]
fn add_rejects_long_unknown_room_as_invalid_room() {
    let mut store = open("add_long_room.snap");
    assert!(matches!(
        store.add("PENTHOUSE-SUITE-ROOF", "01/06/2024", "05/06/2024", "1"),
        Err(StoreError::InvalidRoom(room)) if room == "PENTHOUSE-SUITE-ROOF"
    ));
}

#[test]
fn add_books_configured_room_with_long_name() {
    let path = test_snapshot_path("add_long_configured.snap");
    let mut store = BookingStore::open(["GARDEN-SUITE-NORTH"], &path).unwrap();
    let id = store
        .add("garden-suite-north", "01/06/2024", "05/06/2024", "1")
        .unwrap();
    assert_eq!(store.get(&id).unwrap().room, "GARDEN-SUITE-NORTH");
}

// ── update_service ───────────────────────────────────────

#[test]
fn update_service_sets_cycle_and_persists() {
    let path = test_snapshot_path("update.snap");
    let mut store = BookingStore::open(ROOMS, &path).unwrap();
    let id = store.add("R11", "01/06/2024", "05/06/2024", "1").unwrap();

    store.update_service(&id, ServiceCycle::Never).unwrap();
    assert_eq!(store.get(&id).unwrap().service_cycle, ServiceCycle::Never);

    let reopened = BookingStore::open(ROOMS, &path).unwrap();
    assert_eq!(reopened.get(&id).unwrap().service_cycle, ServiceCycle::Never);
}

#[test]
fn update_service_unknown_identity() {
    let mut store = open("update_missing.snap");
    store.add("R11", "01/06/2024", "05/06/2024", "1").unwrap();
    let before = store.reservations().to_vec();

    match store.update_service("X", ServiceCycle::Never) {
        Err(StoreError::NotFound(id)) => assert_eq!(id, "X"),
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert_eq!(store.reservations(), before.as_slice());
}

#[test]
fn update_service_edits_first_match_only() {
    let mut store = open("update_first.snap");
    let mut rules = RuleOverlay::new();
    rules.insert(
        "7",
        vec![Stay::new(d(1, 6), d(3, 6)), Stay::new(d(5, 6), d(8, 6))],
    );
    store
        .bulk_import([ImportRow::new("7", "R11", "", "")], &rules, &ServiceOverlay::new())
        .unwrap();

    store.update_service("7", every(4)).unwrap();
    assert_eq!(store.reservations()[0].service_cycle, every(4));
    assert_eq!(store.reservations()[1].service_cycle, ServiceCycle::default());
}

// ── bulk_import ──────────────────────────────────────────

#[test]
fn bulk_import_replaces_collection() {
    let mut store = open("import_replace.snap");
    store.add("R11", "01/06/2024", "05/06/2024", "1").unwrap();

    let rows = vec![
        ImportRow::new("1001", "R12", "01/06/2024", "03/06/2024"),
        ImportRow::new("1002", "R21", "02/06/2024", "06/06/2024"),
    ];
    let status = store
        .bulk_import(rows, &RuleOverlay::new(), &ServiceOverlay::new())
        .unwrap();
    assert!(status.contains("Imported 2 reservations"), "{status}");
    let ids: Vec<&str> = store.reservations().iter().map(|r| r.identity.as_str()).collect();
    assert_eq!(ids, vec!["1001", "1002"]);
}

#[test]
fn bulk_import_applies_rules_then_services() {
    let path = test_snapshot_path("import_overlays.snap");
    let mut store = BookingStore::open(ROOMS, &path).unwrap();

    let mut rules = RuleOverlay::new();
    rules.insert(
        "1001",
        vec![Stay::new(d(1, 6), d(4, 6)), Stay::new(d(10, 6), d(12, 6))],
    );
    let mut services = ServiceOverlay::new();
    services.insert("1001", every(2));
    services.insert("1002", ServiceCycle::Never);
    services.insert("9999", every(5));

    let rows = vec![
        ImportRow::new("1001", "R11", "ignored", "ignored"),
        ImportRow::new("1002", "R12", "01/06/2024", "03/06/2024"),
        ImportRow::new("1003", "R21", "01/06/2024", "03/06/2024"),
    ];
    let status = store.bulk_import(rows, &rules, &services).unwrap();
    assert!(status.contains("(3 with custom service cycles)"), "{status}");

    let got: Vec<(&str, Stay, ServiceCycle)> = store
        .reservations()
        .iter()
        .map(|r| (r.identity.as_str(), r.stay, r.service_cycle))
        .collect();
    assert_eq!(
        got,
        vec![
            ("1001", Stay::new(d(1, 6), d(4, 6)), every(2)),
            ("1001", Stay::new(d(10, 6), d(12, 6)), every(2)),
            ("1002", Stay::new(d(1, 6), d(3, 6)), ServiceCycle::Never),
            ("1003", Stay::new(d(1, 6), d(3, 6)), ServiceCycle::default()),
        ]
    );

    let reopened = BookingStore::open(ROOMS, &path).unwrap();
    assert_eq!(reopened.reservations(), store.reservations());
}

#[test]
fn bulk_import_does_not_check_overlap() {
    let mut store = open("import_overlap.snap");
    let rows = vec![
        ImportRow::new("1", "R11", "01/06/2024", "05/06/2024"),
        ImportRow::new("2", "R11", "03/06/2024", "07/06/2024"),
    ];
    store
        .bulk_import(rows, &RuleOverlay::new(), &ServiceOverlay::new())
        .unwrap();
    assert_eq!(store.len(), 2);
}

#[test]
fn failed_import_leaves_store_and_image_untouched() {
    let path = test_snapshot_path("import_abort.snap");
    let mut store = BookingStore::open(ROOMS, &path).unwrap();
    store.add("R11", "01/06/2024", "05/06/2024", "1").unwrap();
    let before = store.reservations().to_vec();

    let rows = vec![
        ImportRow::new("1", "R12", "01/06/2024", "05/06/2024"),
        ImportRow::new("2", "R12", "not a date", "07/06/2024"),
    ];
    let result = store.bulk_import(rows, &RuleOverlay::new(), &ServiceOverlay::new());
    assert!(matches!(result, Err(StoreError::InvalidDate(_))));
    assert_eq!(store.reservations(), before.as_slice());

    let reopened = BookingStore::open(ROOMS, &path).unwrap();
    assert_eq!(reopened.reservations(), before.as_slice());
}

#[test]
fn failed_write_rolls_back_memory() {
    // Point the image into a directory that does not exist so every write fails.
    let path = std::env::temp_dir()
        .join("turnover_test_store_missing_dir")
        .join("nested")
        .join("store.snap");
    let _ = std::fs::remove_dir_all(std::env::temp_dir().join("turnover_test_store_missing_dir"));
    let mut store = BookingStore::open(ROOMS, &path).unwrap();

    assert!(matches!(
        store.add("R11", "01/06/2024", "05/06/2024", "1"),
        Err(StoreError::Storage(_))
    ));
    assert!(store.is_empty());

    let rows = vec![ImportRow::new("1", "R12", "01/06/2024", "05/06/2024")];
    assert!(matches!(
        store.bulk_import(rows, &RuleOverlay::new(), &ServiceOverlay::new()),
        Err(StoreError::Storage(_))
    ));
    assert!(store.is_empty());
}

// ── queries ──────────────────────────────────────────────

#[test]
fn list_all_is_restartable_and_ordered() {
    let mut store = open("list.snap");
    store
        .bulk_import(
            vec![
                ImportRow::new("2", "R12", "02/06/2024", "04/06/2024"),
                ImportRow::new("1", "R11", "01/06/2024", "05/06/2024"),
            ],
            &RuleOverlay::new(),
            &ServiceOverlay::new(),
        )
        .unwrap();

    let listing = store.list_all();
    let first: Vec<String> = listing.clone().collect();
    let second: Vec<String> = listing.collect();
    assert_eq!(first, second);
    assert_eq!(
        first,
        vec![
            "ID: 2, Room: R12, Arrival: 02/06/2024, Departure: 04/06/2024, Service cycle: 1",
            "ID: 1, Room: R11, Arrival: 01/06/2024, Departure: 05/06/2024, Service cycle: 1",
        ]
    );
}

#[test]
fn reservations_for_room_filters_case_insensitively() {
    let mut store = open("for_room.snap");
    store.add("R11", "01/06/2024", "05/06/2024", "1").unwrap();
    store.add("R12", "01/06/2024", "05/06/2024", "1").unwrap();
    store.add("R11", "05/06/2024", "07/06/2024", "1").unwrap();
    assert_eq!(store.reservations_for_room("r11").count(), 2);
    assert_eq!(store.reservations_for_room("R21").count(), 0);
}

// ── jobs through the store ───────────────────────────────

#[test]
fn scenario_r11_first_week_of_june() {
    let mut store = open("scenario_r11.snap");
    store.add("R11", "01/06/2024", "05/06/2024", "1").unwrap();

    let expected = [
        (d(1, 6), "* R11: General turnover"),
        (d(2, 6), "* R11: Towels"),
        (d(3, 6), "* R11: Towels/Linens"),
        (d(4, 6), "* R11: Towels"),
        (d(5, 6), "* R11: Check-out"),
    ];
    for (day, job) in expected {
        let report = store.today_jobs(day);
        let lines: Vec<String> = report.jobs.iter().map(ToString::to_string).collect();
        assert_eq!(lines, vec![job.to_string()], "on {day}");
    }
}

#[test]
fn week_projection_through_store() {
    let mut store = open("scenario_week.snap");
    store.add("R11", "01/06/2024", "05/06/2024", "1").unwrap();
    let week = store.week_projection(d(1, 6));
    assert_eq!(week.matches("/06/2024").count(), 7);
    assert!(week.starts_with("**********01/06/2024**********"));
    assert!(week.contains("**********07/06/2024**********"));
    assert!(!week.contains("08/06/2024"));
}

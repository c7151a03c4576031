//! # Stats Subcommand
//!
//! Offline occupancy report over a JSON export of rooms (the `rooms` array
//! returned by `GET /v1/rooms`, or a bare array of rooms). Exported rooms
//! go through the same inventory checks as rooms loaded at server start:
//! inconsistent rooms, duplicate locations and double-booked students are
//! skipped with a warning.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};

use hallbridge_core::Floor;
use hallbridge_state::{OccupancyReport, Room, RoomFilter, RoomInventory, RoomStatus};

use crate::{render, OutputFormat};

/// Arguments for the `hallbridge stats` subcommand.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Room export (JSON).
    pub input: PathBuf,

    #[arg(long)]
    pub floor: Option<i64>,

    /// One of vacant, partial, occupied, maintenance.
    #[arg(long)]
    pub status: Option<String>,

    /// Match room number, occupant name or student code.
    #[arg(long)]
    pub search: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Export {
    Listing { rooms: Vec<Room> },
    Bare(Vec<Room>),
}

#[derive(Debug, Serialize)]
pub struct StatsOutput {
    #[serde(flatten)]
    pub report: OccupancyReport,
    pub occupancy_rate: f64,
    /// Exported rooms that failed the inventory checks.
    pub skipped_rooms: usize,
}

/// Read an export into an inventory. Returns the number of rooms skipped.
pub fn load_inventory(path: &Path) -> Result<(RoomInventory, usize)> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let rooms = match serde_json::from_str::<Export>(&text)
        .with_context(|| format!("{} is not a room export", path.display()))?
    {
        Export::Listing { rooms } | Export::Bare(rooms) => rooms,
    };

    let mut inventory = RoomInventory::new();
    let mut skipped = 0;
    for room in rooms {
        let room_number = room.room_number.clone();
        if let Err(e) = inventory.insert(room) {
            tracing::warn!(%room_number, error = %e, "skipping exported room");
            skipped += 1;
        }
    }
    tracing::debug!(loaded = inventory.len(), skipped, "loaded room export");
    Ok((inventory, skipped))
}

/// Translate the filter flags.
pub fn build_filter(args: &StatsArgs) -> Result<RoomFilter> {
    Ok(RoomFilter {
        floor: args.floor.map(Floor::new).transpose()?,
        status: args
            .status
            .as_deref()
            .map(str::parse::<RoomStatus>)
            .transpose()?,
        search: args.search.clone().filter(|s| !s.trim().is_empty()),
    })
}

pub fn compute(args: &StatsArgs) -> Result<StatsOutput> {
    let filter = build_filter(args)?;
    let (inventory, skipped_rooms) = load_inventory(&args.input)?;
    let report = inventory.report(&filter);
    Ok(StatsOutput {
        occupancy_rate: report.overall.occupancy_rate(),
        report,
        skipped_rooms,
    })
}

/// Run the stats subcommand, writing the report to stdout.
pub fn run_stats(args: &StatsArgs) -> Result<u8> {
    let output = compute(args)?;
    print!("{}", render(&output, args.format)?);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hallbridge_core::{BedNumber, StudentId};
    use hallbridge_state::{Occupant, RangePlan};

    fn occupant(name: &str, code: &str) -> Occupant {
        Occupant {
            student_id: StudentId::new(),
            name: name.to_string(),
            student_code: code.to_string(),
        }
    }

    /// Rooms 201..=204 with beds taken in 201 (1 of 4) and 202 (4 of 4).
    fn sample_rooms() -> Vec<Room> {
        let mut rooms: Vec<Room> = RangePlan::new(2, 1, 4, 4)
            .unwrap()
            .blueprints()
            .unwrap()
            .iter()
            .map(|b| b.build())
            .collect();
        rooms[0]
            .allocate(BedNumber::new(1).unwrap(), occupant("Meera", "HB-1"))
            .unwrap();
        for bed in 1..=4 {
            rooms[1]
                .allocate(
                    BedNumber::new(bed).unwrap(),
                    occupant(&format!("Student {bed}"), &format!("HB-1{bed}")),
                )
                .unwrap();
        }
        rooms
    }

    fn write_export(dir: &tempfile::TempDir, value: &serde_json::Value) -> PathBuf {
        let path = dir.path().join("rooms.json");
        std::fs::write(&path, value.to_string()).unwrap();
        path
    }

    fn args(status: Option<&str>, floor: Option<i64>) -> StatsArgs {
        StatsArgs {
            input: PathBuf::from("unused.json"),
            floor,
            status: status.map(String::from),
            search: Some("  ".into()),
            format: OutputFormat::Json,
        }
    }

    #[test]
    fn filter_parses_flags() {
        let filter = build_filter(&args(Some("Partial"), Some(3))).unwrap();
        assert_eq!(filter.status, Some(RoomStatus::Partial));
        assert_eq!(filter.floor, Some(Floor::new(3).unwrap()));
        assert!(filter.search.is_none());
    }

    #[test]
    fn filter_rejects_bad_values() {
        assert!(build_filter(&args(Some("full"), None)).is_err());
        assert!(build_filter(&args(None, Some(0))).is_err());
    }

    #[test]
    fn report_over_listing_export() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_export(&dir, &serde_json::json!({ "rooms": sample_rooms() }));
        let output = compute(&StatsArgs {
            input,
            floor: None,
            status: None,
            search: None,
            format: OutputFormat::Json,
        })
        .unwrap();
        let overall = output.report.overall;
        assert_eq!(overall.total_rooms, 4);
        assert_eq!((overall.vacant, overall.partial, overall.occupied), (2, 1, 1));
        assert_eq!(overall.total_beds, 16);
        assert_eq!(overall.occupied_beds, 5);
        assert_eq!(overall.available_beds, 11);
        assert_eq!(output.skipped_rooms, 0);
        assert!((output.occupancy_rate - 5.0 / 16.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bare_export_with_filters_and_duplicates() {
        let mut rooms = sample_rooms();
        let mut copy = rooms[3].clone();
        copy.id = hallbridge_core::RoomId::new();
        rooms.push(copy);
        let dir = tempfile::tempdir().unwrap();
        let input = write_export(&dir, &serde_json::to_value(&rooms).unwrap());

        let output = compute(&StatsArgs {
            input: input.clone(),
            floor: Some(2),
            status: Some("vacant".into()),
            search: None,
            format: OutputFormat::Yaml,
        })
        .unwrap();
        assert_eq!(output.skipped_rooms, 1);
        assert_eq!(output.report.overall.total_rooms, 2);

        let output = compute(&StatsArgs {
            input,
            floor: None,
            status: None,
            search: Some("meera".into()),
            format: OutputFormat::Yaml,
        })
        .unwrap();
        assert_eq!(output.report.overall.total_rooms, 1);
        assert_eq!(output.report.floors.len(), 1);
    }

    #[test]
    fn malformed_export_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_export(&dir, &serde_json::json!({"rooms": 3}));
        assert!(load_inventory(&input).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_inventory(Path::new("/nonexistent/rooms.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/rooms.json"));
    }
}

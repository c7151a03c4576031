//! # Plan Subcommand
//!
//! Dry-run provisioning. Builds the same [`InitializePlan`] or [`RangePlan`]
//! the API would, and prints the rooms it describes. With `--against`, the
//! plan is applied to an in-memory copy of an exported inventory and the
//! resulting per-room outcome is printed instead, so duplicates show up as
//! item failures before anyone touches the live hall.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use hallbridge_core::{default_amenities, Amenity, DEFAULT_CAPACITY};
use hallbridge_state::{BulkOutcome, InitializePlan, RangePlan, RoomBlueprint};

use crate::stats::load_inventory;
use crate::{render, OutputFormat};

/// Arguments for the `hallbridge plan` subcommand.
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(subcommand)]
    pub command: PlanCommand,

    /// Apply the plan to this room export instead of an empty hall.
    #[arg(long, global = true)]
    pub against: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml, global = true)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum PlanCommand {
    /// Every floor from 1 up to `--floors`.
    Building {
        #[arg(long, default_value_t = 8)]
        floors: i64,
        #[arg(long, default_value_t = 10)]
        rooms_per_floor: i64,
        #[arg(long, default_value_t = i64::from(DEFAULT_CAPACITY))]
        beds: i64,
        /// Amenity names; repeat the flag. Defaults to the standard set.
        #[arg(long = "amenity")]
        amenities: Vec<String>,
        /// Rebuild even when rooms already exist.
        #[arg(long)]
        force: bool,
    },

    /// Rooms `--start..=--end` on one floor.
    Range {
        #[arg(long)]
        floor: i64,
        #[arg(long)]
        start: i64,
        #[arg(long)]
        end: i64,
        #[arg(long, default_value_t = i64::from(DEFAULT_CAPACITY))]
        beds: i64,
        #[arg(long = "amenity")]
        amenities: Vec<String>,
    },
}

/// A validated plan of either shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Building(InitializePlan),
    Range(RangePlan),
}

impl Plan {
    pub fn blueprints(&self) -> Result<Vec<RoomBlueprint>> {
        let blueprints = match self {
            Plan::Building(plan) => plan.blueprints()?,
            Plan::Range(plan) => plan.blueprints()?,
        };
        Ok(blueprints)
    }
}

/// Printed when no inventory is supplied.
#[derive(Debug, Serialize)]
pub struct PlanSummary {
    pub room_count: usize,
    pub total_beds: usize,
    pub rooms: Vec<RoomBlueprint>,
}

fn amenity_set(names: &[String]) -> Result<BTreeSet<Amenity>> {
    if names.is_empty() {
        return Ok(default_amenities());
    }
    Ok(Amenity::parse_set(names)?)
}

/// Validate command-line arguments into a plan.
pub fn build_plan(command: &PlanCommand) -> Result<Plan> {
    let plan = match command {
        PlanCommand::Building {
            floors,
            rooms_per_floor,
            beds,
            amenities,
            force,
        } => Plan::Building(
            InitializePlan::new(*floors, *rooms_per_floor, *beds)?
                .with_amenities(amenity_set(amenities)?)
                .forced(*force),
        ),
        PlanCommand::Range {
            floor,
            start,
            end,
            beds,
            amenities,
        } => Plan::Range(
            RangePlan::new(*floor, *start, *end, *beds)?.with_amenities(amenity_set(amenities)?),
        ),
    };
    Ok(plan)
}

pub fn summarize(plan: &Plan) -> Result<PlanSummary> {
    let rooms = plan.blueprints()?;
    let total_beds = rooms.iter().map(|b| usize::from(b.capacity.get())).sum();
    Ok(PlanSummary {
        room_count: rooms.len(),
        total_beds,
        rooms,
    })
}

/// Apply the plan to the rooms in an export file.
pub fn simulate(plan: &Plan, export: &Path) -> Result<BulkOutcome> {
    let (mut inventory, skipped) = load_inventory(export)?;
    if skipped > 0 {
        tracing::warn!(skipped, "some exported rooms were not loaded");
    }
    let outcome = match plan {
        Plan::Building(plan) => inventory.initialize(plan)?,
        Plan::Range(plan) => inventory.provision_range(plan)?,
    };
    Ok(outcome)
}

/// Run the plan subcommand, writing the result to stdout.
pub fn run_plan(args: &PlanArgs) -> Result<u8> {
    let plan = build_plan(&args.command).context("invalid provisioning plan")?;
    let text = match &args.against {
        Some(export) => {
            let outcome = simulate(&plan, export)?;
            tracing::info!(
                created = outcome.created,
                skipped = outcome.skipped,
                failed = outcome.failed,
                "simulated plan"
            );
            render(&outcome, args.format)?
        }
        None => render(&summarize(&plan)?, args.format)?,
    };
    print!("{text}");
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(floor: i64, start: i64, end: i64) -> PlanCommand {
        PlanCommand::Range {
            floor,
            start,
            end,
            beds: 4,
            amenities: Vec::new(),
        }
    }

    #[test]
    fn range_plan_numbers_rooms_by_floor() {
        let summary = summarize(&build_plan(&range(2, 1, 20)).unwrap()).unwrap();
        assert_eq!(summary.room_count, 20);
        assert_eq!(summary.total_beds, 80);
        assert_eq!(summary.rooms[0].room_number.as_str(), "201");
        assert_eq!(summary.rooms[19].room_number.as_str(), "220");
        assert_eq!(summary.rooms[0].amenities, default_amenities());
    }

    #[test]
    fn building_plan_covers_every_floor() {
        let command = PlanCommand::Building {
            floors: 3,
            rooms_per_floor: 2,
            beds: 2,
            amenities: vec!["wifi".into(), "balcony".into()],
            force: false,
        };
        let summary = summarize(&build_plan(&command).unwrap()).unwrap();
        let numbers: Vec<&str> = summary.rooms.iter().map(|b| b.room_number.as_str()).collect();
        assert_eq!(numbers, vec!["101", "102", "201", "202", "301", "302"]);
        assert_eq!(summary.total_beds, 12);
        assert_eq!(summary.rooms[0].amenities.len(), 2);
    }

    #[test]
    fn simulate_reports_existing_rooms_as_failures() {
        let existing: Vec<_> = RangePlan::new(1, 1, 3, 4)
            .unwrap()
            .blueprints()
            .unwrap()
            .iter()
            .map(|b| b.build())
            .collect();
        let dir = tempfile::tempdir().unwrap();
        let export = dir.path().join("rooms.json");
        std::fs::write(&export, serde_json::to_string(&existing).unwrap()).unwrap();

        let outcome = simulate(&build_plan(&range(1, 2, 5)).unwrap(), &export).unwrap();
        assert_eq!(outcome.created, 2);
        assert_eq!(outcome.failed, 2);
        let failed: Vec<&str> = outcome.failures.iter().map(|f| f.room_number.as_str()).collect();
        assert_eq!(failed, vec!["102", "103"]);

        let building = PlanCommand::Building {
            floors: 1,
            rooms_per_floor: 4,
            beds: 4,
            amenities: Vec::new(),
            force: false,
        };
        let outcome = simulate(&build_plan(&building).unwrap(), &export).unwrap();
        assert_eq!(outcome.created, 0);
        assert_eq!(outcome.skipped, 3);
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        assert!(build_plan(&range(9, 1, 2)).is_err());
        assert!(build_plan(&range(1, 5, 4)).is_err());
        assert!(build_plan(&range(1, 1, 51)).is_err());
        let bad_amenity = PlanCommand::Range {
            floor: 1,
            start: 1,
            end: 2,
            beds: 4,
            amenities: vec!["jacuzzi".into()],
        };
        assert!(build_plan(&bad_amenity).is_err());
    }
}

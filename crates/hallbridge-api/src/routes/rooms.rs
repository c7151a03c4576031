//! # Rooms API
//!
//! Room listing and statistics, single-room creation, range and building
//! provisioning, guarded status changes, and bed allocation.
//!
//! Every mutation takes the room write guard, then runs under the inventory
//! write lock, which makes the bed check and the bed update a single step.
//! The inventory lock is released before the database write but the write
//! guard is held until it finishes; if the write fails the room is put back
//! as it was.

use std::collections::BTreeSet;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use hallbridge_core::{
    default_amenities, Amenity, BedNumber, Capacity, Floor, RoomId, RoomNumber, StudentId,
    ValidationError, DEFAULT_CAPACITY,
};
use hallbridge_state::{
    Bed, BulkOutcome, FloorOccupancy, InitializePlan, ItemFailure, OccupancyReport,
    OccupancyStats, Occupant, RangePlan, Room, RoomBlueprint, RoomFilter, RoomStatus,
    StatusChange,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_path, extract_query, extract_validated_json, Validate};
use crate::state::{AppState, RoomWriteGuard};

// ── Response views ──────────────────────────────────────────────────────────

/// The student cached on an occupied bed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OccupantView {
    pub student_id: Uuid,
    pub name: String,
    pub student_code: String,
}

impl From<&Occupant> for OccupantView {
    fn from(o: &Occupant) -> Self {
        Self {
            student_id: o.student_id.0,
            name: o.name.clone(),
            student_code: o.student_code.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BedView {
    pub bed_number: u8,
    pub is_occupied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupant: Option<OccupantView>,
}

impl From<&Bed> for BedView {
    fn from(b: &Bed) -> Self {
        Self {
            bed_number: b.bed_number.get(),
            is_occupied: b.is_occupied,
            occupant: b.occupant.as_ref().map(OccupantView::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusChangeView {
    pub from: String,
    pub to: String,
    pub at: DateTime<Utc>,
    pub reason: String,
}

impl From<&StatusChange> for StatusChangeView {
    fn from(c: &StatusChange) -> Self {
        Self {
            from: c.from.as_str().to_string(),
            to: c.to.as_str().to_string(),
            at: c.at,
            reason: c.reason.clone(),
        }
    }
}

/// A room with its beds and status history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomView {
    pub id: Uuid,
    pub floor: u8,
    pub room_number: String,
    pub capacity: u8,
    /// One of `vacant`, `partial`, `occupied`, `maintenance`.
    pub status: String,
    pub occupied_beds: usize,
    pub available_beds: usize,
    pub beds: Vec<BedView>,
    pub amenities: Vec<String>,
    /// Recent status changes. Omitted from listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_log: Option<Vec<StatusChangeView>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Room> for RoomView {
    fn from(r: &Room) -> Self {
        Self {
            id: r.id.0,
            floor: r.floor.get(),
            room_number: r.room_number.to_string(),
            capacity: r.capacity.get(),
            status: r.status.as_str().to_string(),
            occupied_beds: r.occupied_beds(),
            available_beds: r.available_beds(),
            beds: r.beds.iter().map(BedView::from).collect(),
            amenities: r.amenities.iter().map(|a| a.as_str().to_string()).collect(),
            status_log: Some(r.status_log.iter().map(StatusChangeView::from).collect()),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl RoomView {
    /// The view used in listings, without the status history.
    pub fn summary(r: &Room) -> Self {
        Self {
            status_log: None,
            ..Self::from(r)
        }
    }
}

/// Rooms matching a filter plus statistics over the same set.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoomListResponse {
    pub rooms: Vec<RoomView>,
    #[schema(value_type = Object)]
    pub stats: OccupancyStats,
}

/// Occupancy report, overall and per floor.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OccupancyReportView {
    #[schema(value_type = Object)]
    pub overall: OccupancyStats,
    /// Occupied beds over total beds, `0.0` when there are no beds.
    pub occupancy_rate: f64,
    #[schema(value_type = Vec<Object>)]
    pub floors: Vec<FloorOccupancy>,
}

impl From<OccupancyReport> for OccupancyReportView {
    fn from(report: OccupancyReport) -> Self {
        Self {
            occupancy_rate: report.overall.occupancy_rate(),
            overall: report.overall,
            floors: report.floors,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemFailureView {
    pub floor: u8,
    pub room_number: String,
    pub reason: String,
}

impl From<&ItemFailure> for ItemFailureView {
    fn from(f: &ItemFailure) -> Self {
        Self {
            floor: f.floor.get(),
            room_number: f.room_number.to_string(),
            reason: f.reason.clone(),
        }
    }
}

/// Per-item result of a bulk provisioning call.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BulkOutcomeView {
    pub created: usize,
    /// Existing rooms left alone by a non-forced initialise.
    pub skipped: usize,
    pub failed: usize,
    /// Rooms deleted by a forced initialise.
    pub removed: usize,
    pub rooms: Vec<RoomView>,
    pub failures: Vec<ItemFailureView>,
}

impl From<&BulkOutcome> for BulkOutcomeView {
    fn from(o: &BulkOutcome) -> Self {
        Self {
            created: o.created,
            skipped: o.skipped,
            failed: o.failed,
            removed: o.removed,
            rooms: o.rooms.iter().map(RoomView::from).collect(),
            failures: o.failures.iter().map(ItemFailureView::from).collect(),
        }
    }
}

/// Result of emptying a bed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReleaseResponse {
    pub room: RoomView,
    /// The student removed, absent when the bed was already empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub released: Option<OccupantView>,
}

// ── Requests ────────────────────────────────────────────────────────────────

/// Filters shared by the list and stats endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoomListQuery {
    /// Restrict to one floor (1..=8).
    pub floor: Option<i64>,
    /// Restrict to one status.
    pub status: Option<String>,
    /// Case-insensitive match on room number, occupant name or student code.
    pub search: Option<String>,
}

impl RoomListQuery {
    fn into_filter(self) -> Result<RoomFilter, ValidationError> {
        Ok(RoomFilter {
            floor: self.floor.map(Floor::new).transpose()?,
            status: self.status.as_deref().map(str::parse::<RoomStatus>).transpose()?,
            search: self.search.filter(|s| !s.trim().is_empty()),
        })
    }
}

fn default_capacity() -> i64 {
    i64::from(DEFAULT_CAPACITY)
}

fn default_floors() -> i64 {
    i64::from(hallbridge_core::MAX_FLOOR)
}

fn default_rooms_per_floor() -> i64 {
    10
}

fn parse_amenities(names: Option<&[String]>) -> Result<BTreeSet<Amenity>, ValidationError> {
    match names {
        Some(names) => Amenity::parse_set(names),
        None => Ok(default_amenities()),
    }
}

/// Request to create one room.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoomRequest {
    pub floor: i64,
    pub room_number: String,
    /// Number of beds; defaults to 4.
    #[serde(default = "default_capacity")]
    pub capacity: i64,
    /// Amenity names; the default set when omitted.
    pub amenities: Option<Vec<String>>,
}

impl Validate for CreateRoomRequest {
    fn validate(&self) -> Result<(), String> {
        if self.room_number.trim().is_empty() {
            return Err("room_number must not be empty".to_string());
        }
        Ok(())
    }
}

impl CreateRoomRequest {
    fn blueprint(&self) -> Result<RoomBlueprint, ValidationError> {
        Ok(RoomBlueprint {
            floor: Floor::new(self.floor)?,
            room_number: RoomNumber::new(self.room_number.as_str())?,
            capacity: Capacity::new(self.capacity)?,
            amenities: parse_amenities(self.amenities.as_deref())?,
        })
    }
}

/// Request to provision rooms `start..=end` on one floor.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BatchCreateRequest {
    pub floor: i64,
    pub start: i64,
    pub end: i64,
    #[serde(default = "default_capacity")]
    pub beds_per_room: i64,
    pub amenities: Option<Vec<String>>,
}

/// Request to provision the whole building.
#[derive(Debug, Deserialize, ToSchema)]
pub struct InitializeRequest {
    #[serde(default = "default_floors")]
    pub floors: i64,
    #[serde(default = "default_rooms_per_floor")]
    pub rooms_per_floor: i64,
    #[serde(default = "default_capacity")]
    pub beds_per_room: i64,
    pub amenities: Option<Vec<String>>,
    /// Delete every existing room first.
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusRequest {
    /// Target status.
    pub status: String,
}

impl Validate for StatusRequest {
    fn validate(&self) -> Result<(), String> {
        if self.status.trim().is_empty() {
            return Err("status must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AllocateRequest {
    /// A student registered in the directory.
    pub student_id: Uuid,
}

impl Validate for AllocateRequest {
    fn validate(&self) -> Result<(), String> {
        if self.student_id.is_nil() {
            return Err("student_id must not be nil".to_string());
        }
        Ok(())
    }
}

// ── Router ──────────────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/rooms", get(list_rooms).post(create_room))
        .route("/v1/rooms/batch", post(create_batch))
        .route("/v1/rooms/initialize", post(initialize_rooms))
        .route("/v1/rooms/stats", get(room_stats))
        .route("/v1/rooms/{id}", get(get_room))
        .route("/v1/rooms/{id}/status", put(set_room_status))
        .route("/v1/rooms/{id}/beds/{bed}/allocate", post(allocate_bed))
        .route("/v1/rooms/{id}/beds/{bed}/occupant", delete(release_bed))
}

/// Bed numbers below 1 are malformed; numbers past the last bed simply
/// don't exist.
fn bed_from_path(room_id: Uuid, raw: i64) -> Result<BedNumber, AppError> {
    if raw < 1 {
        return Err(ValidationError::InvalidBedNumber(raw).into());
    }
    BedNumber::new(raw).map_err(|_| AppError::not_found(format!("room {room_id} has no bed {raw}")))
}

/// Persist every room a bulk call created. Rooms that fail are removed
/// from memory and reported as item failures.
async fn persist_outcome(state: &AppState, writes: &RoomWriteGuard, outcome: &mut BulkOutcome) {
    let created: Vec<Room> = outcome.rooms.clone();
    for room in &created {
        if state.persist_room(writes, room, None).await.is_err() {
            outcome.demote(room.id, "storage write failed");
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────────────

/// GET /v1/rooms: List rooms with statistics.
#[utoipa::path(
    get,
    path = "/v1/rooms",
    params(RoomListQuery),
    responses(
        (status = 200, description = "Matching rooms ordered by floor and number", body = RoomListResponse),
        (status = 422, description = "Invalid filter", body = crate::error::ErrorBody),
    ),
    tag = "rooms"
)]
async fn list_rooms(
    State(state): State<AppState>,
    caller: CallerIdentity,
    query: Result<Query<RoomListQuery>, QueryRejection>,
) -> Result<Json<RoomListResponse>, AppError> {
    require_role(&caller, Role::Staff)?;
    let filter = extract_query(query)?.into_filter()?;

    let inventory = state.rooms.read();
    let rooms = inventory.list(&filter);
    let stats = OccupancyStats::from_rooms(&rooms);
    Ok(Json(RoomListResponse {
        rooms: rooms.iter().map(RoomView::summary).collect(),
        stats,
    }))
}

/// GET /v1/rooms/stats: Occupancy report.
#[utoipa::path(
    get,
    path = "/v1/rooms/stats",
    params(RoomListQuery),
    responses(
        (status = 200, description = "Occupancy report", body = OccupancyReportView),
        (status = 422, description = "Invalid filter", body = crate::error::ErrorBody),
    ),
    tag = "rooms"
)]
async fn room_stats(
    State(state): State<AppState>,
    caller: CallerIdentity,
    query: Result<Query<RoomListQuery>, QueryRejection>,
) -> Result<Json<OccupancyReportView>, AppError> {
    require_role(&caller, Role::Staff)?;
    let filter = extract_query(query)?.into_filter()?;
    let report = state.rooms.read().report(&filter);
    Ok(Json(report.into()))
}

/// POST /v1/rooms: Create a single room.
#[utoipa::path(
    post,
    path = "/v1/rooms",
    request_body = CreateRoomRequest,
    responses(
        (status = 201, description = "Room created", body = RoomView),
        (status = 409, description = "Room already exists on the floor", body = crate::error::ErrorBody),
        (status = 422, description = "Validation failure", body = crate::error::ErrorBody),
    ),
    tag = "rooms"
)]
async fn create_room(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateRoomRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RoomView>), AppError> {
    require_role(&caller, Role::Admin)?;
    let req = extract_validated_json(body)?;
    let blueprint = req.blueprint()?;

    let writes = state.lock_room_writes().await;
    let room = state.rooms.write().create(&blueprint)?;
    state.persist_room(&writes, &room, None).await?;
    drop(writes);

    tracing::info!(
        room_id = %room.id,
        floor = room.floor.get(),
        room_number = %room.room_number,
        capacity = room.capacity.get(),
        "room created"
    );
    Ok((StatusCode::CREATED, Json(RoomView::from(&room))))
}

/// POST /v1/rooms/batch: Create a range of rooms on one floor.
#[utoipa::path(
    post,
    path = "/v1/rooms/batch",
    request_body = BatchCreateRequest,
    responses(
        (status = 201, description = "At least one room created", body = BulkOutcomeView),
        (status = 200, description = "No room created; see failures", body = BulkOutcomeView),
        (status = 422, description = "Range invalid or larger than 50 rooms", body = crate::error::ErrorBody),
    ),
    tag = "rooms"
)]
async fn create_batch(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<BatchCreateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BulkOutcomeView>), AppError> {
    require_role(&caller, Role::Admin)?;
    let req = extract_json(body)?;
    let plan = RangePlan::new(req.floor, req.start, req.end, req.beds_per_room)?
        .with_amenities(parse_amenities(req.amenities.as_deref())?);

    let writes = state.lock_room_writes().await;
    let mut outcome = state.rooms.write().provision_range(&plan)?;
    persist_outcome(&state, &writes, &mut outcome).await;
    drop(writes);

    tracing::info!(
        floor = plan.floor.get(),
        start = plan.start,
        end = plan.end,
        created = outcome.created,
        failed = outcome.failed,
        "room range provisioned"
    );
    let status = if outcome.created > 0 {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(BulkOutcomeView::from(&outcome))))
}

/// POST /v1/rooms/initialize: Provision the whole building.
///
/// A no-op reporting the existing count when rooms already exist, unless
/// `force` is set.
#[utoipa::path(
    post,
    path = "/v1/rooms/initialize",
    request_body = InitializeRequest,
    responses(
        (status = 201, description = "Building provisioned", body = BulkOutcomeView),
        (status = 200, description = "Already provisioned; nothing written", body = BulkOutcomeView),
        (status = 422, description = "Invalid layout", body = crate::error::ErrorBody),
    ),
    tag = "rooms"
)]
async fn initialize_rooms(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<InitializeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BulkOutcomeView>), AppError> {
    require_role(&caller, Role::Admin)?;
    let req = extract_json(body)?;
    let plan = InitializePlan::new(req.floors, req.rooms_per_floor, req.beds_per_room)?
        .with_amenities(parse_amenities(req.amenities.as_deref())?)
        .forced(req.force);

    // No other room write may land between the wipe and the rebuild.
    let writes = state.lock_room_writes().await;
    if plan.force {
        if let Some(pool) = &state.db_pool {
            if let Err(e) = crate::db::rooms::delete_all(pool).await {
                tracing::error!(error = %e, "failed to clear rooms before forced initialise");
                return Err(AppError::Internal(
                    "stored rooms could not be cleared".to_string(),
                ));
            }
        }
    }

    let mut outcome = state.rooms.write().initialize(&plan)?;
    if plan.force {
        tracing::warn!(removed = outcome.removed, "forced initialise removed every room");
    }
    persist_outcome(&state, &writes, &mut outcome).await;
    drop(writes);

    tracing::info!(
        floors = plan.floors.get(),
        rooms_per_floor = plan.rooms_per_floor,
        created = outcome.created,
        skipped = outcome.skipped,
        failed = outcome.failed,
        "building initialise finished"
    );
    let status = if outcome.created > 0 {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(BulkOutcomeView::from(&outcome))))
}

/// GET /v1/rooms/{id}: Get one room.
#[utoipa::path(
    get,
    path = "/v1/rooms/{id}",
    params(("id" = Uuid, Path, description = "Room ID")),
    responses(
        (status = 200, description = "Room found", body = RoomView),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "rooms"
)]
async fn get_room(
    State(state): State<AppState>,
    caller: CallerIdentity,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<RoomView>, AppError> {
    require_role(&caller, Role::Staff)?;
    let id = extract_path(path)?;
    let inventory = state.rooms.read();
    let room = inventory
        .get(&RoomId(id))
        .ok_or_else(|| AppError::not_found(format!("room {id} not found")))?;
    Ok(Json(RoomView::from(room)))
}

/// PUT /v1/rooms/{id}/status: Guarded status change.
///
/// Entering maintenance requires every bed to be empty. Leaving maintenance
/// recomputes the status from the beds.
#[utoipa::path(
    put,
    path = "/v1/rooms/{id}/status",
    params(("id" = Uuid, Path, description = "Room ID")),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Status applied or already current", body = RoomView),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Occupied beds present or transition not allowed", body = crate::error::ErrorBody),
        (status = 422, description = "Unknown status", body = crate::error::ErrorBody),
    ),
    tag = "rooms"
)]
async fn set_room_status(
    State(state): State<AppState>,
    caller: CallerIdentity,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<StatusRequest>, JsonRejection>,
) -> Result<Json<RoomView>, AppError> {
    require_role(&caller, Role::Admin)?;
    let room_id = RoomId(extract_path(path)?);
    let req = extract_validated_json(body)?;
    let target: RoomStatus = req.status.parse()?;

    let writes = state.lock_room_writes().await;
    let (room, previous, changed) = {
        let mut inventory = state.rooms.write();
        let previous = inventory.get(&room_id).cloned();
        let (room, changed) = inventory.set_status(room_id, target)?;
        (room, previous, changed)
    };

    if changed {
        state.persist_room(&writes, &room, previous).await?;
        tracing::info!(room_id = %room_id, status = %room.status, "room status changed");
    }
    Ok(Json(RoomView::from(&room)))
}

/// POST /v1/rooms/{id}/beds/{bed}/allocate: Put a student in a bed.
#[utoipa::path(
    post,
    path = "/v1/rooms/{id}/beds/{bed}/allocate",
    params(
        ("id" = Uuid, Path, description = "Room ID"),
        ("bed" = i64, Path, description = "Bed number, starting at 1"),
    ),
    request_body = AllocateRequest,
    responses(
        (status = 200, description = "Bed allocated", body = RoomView),
        (status = 404, description = "Room, bed or student not found", body = crate::error::ErrorBody),
        (status = 409, description = "Bed occupied, student already housed, or room under maintenance", body = crate::error::ErrorBody),
        (status = 422, description = "Validation failure", body = crate::error::ErrorBody),
    ),
    tag = "rooms"
)]
async fn allocate_bed(
    State(state): State<AppState>,
    caller: CallerIdentity,
    path: Result<Path<(Uuid, i64)>, PathRejection>,
    body: Result<Json<AllocateRequest>, JsonRejection>,
) -> Result<Json<RoomView>, AppError> {
    require_role(&caller, Role::Admin)?;
    let (id, raw_bed) = extract_path(path)?;
    let bed = bed_from_path(id, raw_bed)?;
    let req = extract_validated_json(body)?;

    let student = state
        .students
        .get(&req.student_id)
        .ok_or_else(|| AppError::not_found(format!("student {} not found", req.student_id)))?;

    let room_id = RoomId(id);
    let writes = state.lock_room_writes().await;
    let (room, previous) = {
        let mut inventory = state.rooms.write();
        let previous = inventory.get(&room_id).cloned();
        let room = inventory.allocate(room_id, bed, student.occupant())?;
        (room, previous)
    };
    state.persist_room(&writes, &room, previous).await?;
    drop(writes);

    tracing::info!(
        room_id = %room_id,
        room_number = %room.room_number,
        bed = bed.get(),
        student_id = %StudentId(student.id),
        "bed allocated"
    );
    Ok(Json(RoomView::from(&room)))
}

/// DELETE /v1/rooms/{id}/beds/{bed}/occupant: Empty a bed.
///
/// Emptying a bed that is already empty succeeds without changes.
#[utoipa::path(
    delete,
    path = "/v1/rooms/{id}/beds/{bed}/occupant",
    params(
        ("id" = Uuid, Path, description = "Room ID"),
        ("bed" = i64, Path, description = "Bed number, starting at 1"),
    ),
    responses(
        (status = 200, description = "Bed emptied", body = ReleaseResponse),
        (status = 404, description = "Room or bed not found", body = crate::error::ErrorBody),
    ),
    tag = "rooms"
)]
async fn release_bed(
    State(state): State<AppState>,
    caller: CallerIdentity,
    path: Result<Path<(Uuid, i64)>, PathRejection>,
) -> Result<Json<ReleaseResponse>, AppError> {
    require_role(&caller, Role::Admin)?;
    let (id, raw_bed) = extract_path(path)?;
    let bed = bed_from_path(id, raw_bed)?;

    let room_id = RoomId(id);
    let writes = state.lock_room_writes().await;
    let (room, removed, previous) = {
        let mut inventory = state.rooms.write();
        let previous = inventory.get(&room_id).cloned();
        let (room, removed) = inventory.release(room_id, bed)?;
        (room, removed, previous)
    };

    if let Some(occupant) = &removed {
        state.persist_room(&writes, &room, previous).await?;
        tracing::info!(
            room_id = %room_id,
            bed = bed.get(),
            student_id = %occupant.student_id,
            "bed released"
        );
    }

    Ok(Json(ReleaseResponse {
        room: RoomView::from(&room),
        released: removed.as_ref().map(OccupantView::from),
    }))
}

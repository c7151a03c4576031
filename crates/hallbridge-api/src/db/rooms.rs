//! Room persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `rooms` table. The
//! status guard and occupancy rules are enforced in memory before anything
//! is written here.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use hallbridge_core::{Amenity, Capacity, Floor, RoomId, RoomNumber};
use hallbridge_state::{Bed, Room, RoomStatus, StatusChange};
use sqlx::PgPool;
use uuid::Uuid;

use super::to_json;

/// Stale snapshots never overwrite a newer stored row.
const UPSERT_SQL: &str = "INSERT INTO rooms (id, floor, room_number, capacity, status, beds, amenities, status_log, created_at, updated_at)
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
     ON CONFLICT (id) DO UPDATE SET
         floor = EXCLUDED.floor,
         room_number = EXCLUDED.room_number,
         capacity = EXCLUDED.capacity,
         status = EXCLUDED.status,
         beds = EXCLUDED.beds,
         amenities = EXCLUDED.amenities,
         status_log = EXCLUDED.status_log,
         updated_at = EXCLUDED.updated_at
     WHERE rooms.updated_at <= EXCLUDED.updated_at";

/// Insert a room, or overwrite an existing row with the same id unless the
/// stored row is newer.
///
/// A different room already holding `(floor, room_number)` fails on the
/// table's unique constraint.
pub async fn upsert(pool: &PgPool, room: &Room) -> Result<(), sqlx::Error> {
    let beds = to_json(&room.beds, "beds")?;
    let amenities = to_json(&room.amenities, "amenities")?;
    let status_log = to_json(&room.status_log, "status_log")?;

    sqlx::query(UPSERT_SQL)
        .bind(room.id.0)
        .bind(i16::from(room.floor.get()))
        .bind(room.room_number.as_str())
        .bind(i16::from(room.capacity.get()))
        .bind(room.status.as_str())
        .bind(&beds)
        .bind(&amenities)
        .bind(&status_log)
        .bind(room.created_at)
        .bind(room.updated_at)
        .execute(pool)
        .await?;

    Ok(())
}

/// Delete every room. Returns the number of rows removed.
pub async fn delete_all(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM rooms").execute(pool).await?;
    Ok(result.rows_affected())
}

/// Load every room, ordered by floor and number.
///
/// Rows that no longer decode into a valid room are logged and skipped.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Room>, sqlx::Error> {
    let rows = sqlx::query_as::<_, RoomRow>(
        "SELECT id, floor, room_number, capacity, status, beds, amenities, status_log, created_at, updated_at
         FROM rooms ORDER BY floor, room_number",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter_map(RoomRow::into_room).collect())
}

#[derive(sqlx::FromRow)]
struct RoomRow {
    id: Uuid,
    floor: i16,
    room_number: String,
    capacity: i16,
    status: String,
    beds: serde_json::Value,
    amenities: serde_json::Value,
    status_log: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RoomRow {
    fn into_room(self) -> Option<Room> {
        let id = self.id;
        let decoded = (|| -> Result<Room, String> {
            let floor = Floor::new(i64::from(self.floor)).map_err(|e| e.to_string())?;
            let room_number = RoomNumber::new(self.room_number).map_err(|e| e.to_string())?;
            let capacity = Capacity::new(i64::from(self.capacity)).map_err(|e| e.to_string())?;
            let status = self.status.parse::<RoomStatus>().map_err(|e| e.to_string())?;
            let beds: Vec<Bed> = serde_json::from_value(self.beds).map_err(|e| format!("beds: {e}"))?;
            let amenities: BTreeSet<Amenity> =
                serde_json::from_value(self.amenities).map_err(|e| format!("amenities: {e}"))?;
            let status_log: Vec<StatusChange> =
                serde_json::from_value(self.status_log).map_err(|e| format!("status_log: {e}"))?;
            Ok(Room {
                id: RoomId(id),
                floor,
                room_number,
                capacity,
                beds,
                status,
                amenities,
                status_log,
                created_at: self.created_at,
                updated_at: self.updated_at,
            })
        })();

        match decoded {
            Ok(room) => Some(room),
            Err(reason) => {
                tracing::error!(
                    id = %id,
                    reason = %reason,
                    "undecodable room row in database, skipping; investigate for data corruption"
                );
                None
            }
        }
    }
}

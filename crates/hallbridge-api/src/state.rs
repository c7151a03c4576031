//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! - **Rooms**: the indexed [`RoomInventory`] behind one `parking_lot`
//!   write lock. Every allocation, release and status change runs as a
//!   single check-and-set under that lock.
//! - **Students**: the student directory the occupancy core reads display
//!   fields from.
//! - **Settings**: hall cutoffs and fees.
//! - **Database pool**: optional Postgres write-through.
//!
//! `parking_lot` locks are never held across `.await`. Room mutations also
//! take the async [`RoomWriteGuard`] first and hold it until the database
//! write finishes, so writes to the room table land in the order the
//! mutations happened and a failed persist can restore the previous value
//! without undoing anyone else's change.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use hallbridge_core::StudentId;
use hallbridge_state::{Occupant, Room, RoomInventory};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::sync::{Mutex, OwnedMutexGuard};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::settings::SettingsStore;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// The lock is `parking_lot` and is never held across an `.await`.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Insert unless an existing record collides with the new one.
    ///
    /// The scan and the insert run under one write lock. Returns the
    /// colliding record on conflict.
    pub fn insert_unique(
        &self,
        id: Uuid,
        value: T,
        collides: impl Fn(&T, &T) -> bool,
    ) -> Result<(), T> {
        let mut guard = self.data.write();
        if let Some(existing) = guard.values().find(|v| collides(v, &value)) {
            return Err(existing.clone());
        }
        guard.insert(id, value);
        Ok(())
    }

    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    pub fn remove(&self, id: &Uuid) -> Option<T> {
        self.data.write().remove(id)
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Records ------------------------------------------------------------------

/// Student directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StudentRecord {
    pub id: Uuid,
    pub name: String,
    /// Institution-issued code, unique across the directory.
    pub student_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StudentRecord {
    /// The cached display fields stored on an allocated bed.
    pub fn occupant(&self) -> Occupant {
        Occupant {
            student_id: StudentId(self.id),
            name: self.name.clone(),
            student_code: self.student_code.clone(),
        }
    }
}

// -- Configuration ------------------------------------------------------------

/// Application configuration.
///
/// Custom `Debug` redacts the `auth_token`.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Shared bearer secret. `None` disables authentication.
    pub auth_token: Option<String>,
    /// Mount `/metrics` and record request metrics.
    pub metrics_enabled: bool,
    /// Requests allowed per caller per minute.
    pub rate_limit_per_minute: u64,
}

impl AppConfig {
    /// Read configuration from `PORT`, `AUTH_TOKEN`,
    /// `HALLBRIDGE_METRICS_ENABLED` and `RATE_LIMIT_PER_MINUTE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            auth_token: lookup("AUTH_TOKEN").filter(|t| !t.is_empty()),
            metrics_enabled: lookup("HALLBRIDGE_METRICS_ENABLED")
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(defaults.metrics_enabled),
            rate_limit_per_minute: lookup("RATE_LIMIT_PER_MINUTE")
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.rate_limit_per_minute),
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("metrics_enabled", &self.metrics_enabled)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            metrics_enabled: true,
            rate_limit_per_minute: 1000,
        }
    }
}

// -- Application State --------------------------------------------------------

/// Exclusive right to mutate and persist rooms.
///
/// Obtained from [`AppState::lock_room_writes`]; [`AppState::persist_room`]
/// takes it by reference so a persist cannot run outside the section.
#[derive(Debug)]
pub struct RoomWriteGuard {
    _guard: OwnedMutexGuard<()>,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub rooms: Arc<RwLock<RoomInventory>>,
    room_writes: Arc<Mutex<()>>,
    pub students: Store<StudentRecord>,
    pub settings: SettingsStore,
    /// Postgres pool; `None` runs in-memory only.
    pub db_pool: Option<PgPool>,
    pub config: AppConfig,
}

impl AppState {
    /// In-memory state with default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    pub fn with_config(config: AppConfig, db_pool: Option<PgPool>) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(RoomInventory::new())),
            room_writes: Arc::new(Mutex::new(())),
            students: Store::new(),
            settings: SettingsStore::new(),
            db_pool,
            config,
        }
    }

    /// Wait for exclusive room write access.
    pub async fn lock_room_writes(&self) -> RoomWriteGuard {
        RoomWriteGuard {
            _guard: Arc::clone(&self.room_writes).lock_owned().await,
        }
    }

    /// Write a room through to the database.
    ///
    /// On failure the in-memory room is rolled back to `previous`, or
    /// removed when there was none, and a 500 is returned.
    pub async fn persist_room(
        &self,
        _writes: &RoomWriteGuard,
        room: &Room,
        previous: Option<Room>,
    ) -> Result<(), AppError> {
        let Some(pool) = &self.db_pool else {
            return Ok(());
        };
        if let Err(e) = crate::db::rooms::upsert(pool, room).await {
            tracing::error!(room_id = %room.id, error = %e, "failed to persist room");
            let mut rooms = self.rooms.write();
            match previous {
                Some(previous) => rooms.restore(previous),
                None => {
                    rooms.discard(room.id);
                }
            }
            return Err(AppError::Internal(format!(
                "room {} could not be persisted",
                room.room_number
            )));
        }
        Ok(())
    }

    /// Load rooms, students and settings from the database.
    ///
    /// Called once on startup. Rooms that fail their structural checks or
    /// collide on a unique index are skipped with an error log.
    pub async fn hydrate_from_db(&self) -> Result<(), String> {
        let pool = match &self.db_pool {
            Some(pool) => pool,
            None => return Ok(()),
        };

        let students = crate::db::students::load_all(pool)
            .await
            .map_err(|e| format!("failed to load students: {e}"))?;
        let student_count = students.len();
        for record in students {
            self.students.insert(record.id, record);
        }

        let rooms = crate::db::rooms::load_all(pool)
            .await
            .map_err(|e| format!("failed to load rooms: {e}"))?;
        let mut room_count = 0usize;
        {
            let mut inventory = self.rooms.write();
            for room in rooms {
                let id = room.id;
                match inventory.insert(room) {
                    Ok(_) => room_count += 1,
                    Err(e) => tracing::error!(room_id = %id, error = %e, "skipping stored room"),
                }
            }
        }

        let settings = crate::db::settings::load_all(pool)
            .await
            .map_err(|e| format!("failed to load settings: {e}"))?;
        let setting_count = settings.len();
        for (key, value) in &settings {
            self.settings.load(key, value);
        }

        tracing::info!(
            rooms = room_count,
            students = student_count,
            settings = setting_count,
            "Hydrated in-memory stores from database"
        );

        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

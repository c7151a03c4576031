//! # Hall Settings Store
//!
//! A small key-value store for the operational constants other hall
//! services read at request time: meal and gate-pass cutoffs and the fee
//! schedule. Values are kept as JSON and validated per key on every write;
//! the typed accessors below never see a malformed value.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveTime;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;

const TIME_FORMAT: &str = "%H:%M";

/// Every recognised setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SettingKey {
    /// Last time (HH:MM) a meal can be booked for the next day.
    MealCutoff,
    /// Curfew (HH:MM) after which a gate pass is required.
    GatePassCutoff,
    /// Hostel fee per term, in minor currency units.
    HostelFee,
    /// Mess fee per term, in minor currency units.
    MessFee,
    /// Late fee per day overdue, in minor currency units.
    LateFeePerDay,
}

impl SettingKey {
    pub const ALL: [SettingKey; 5] = [
        Self::MealCutoff,
        Self::GatePassCutoff,
        Self::HostelFee,
        Self::MessFee,
        Self::LateFeePerDay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MealCutoff => "meal_cutoff",
            Self::GatePassCutoff => "gate_pass_cutoff",
            Self::HostelFee => "hostel_fee",
            Self::MessFee => "mess_fee",
            Self::LateFeePerDay => "late_fee_per_day",
        }
    }

    /// Value used until an administrator overrides it.
    pub fn default_value(&self) -> Value {
        match self {
            Self::MealCutoff => Value::from("21:00"),
            Self::GatePassCutoff => Value::from("22:30"),
            Self::HostelFee => Value::from(4_500_000u64),
            Self::MessFee => Value::from(3_000_000u64),
            Self::LateFeePerDay => Value::from(5_000u64),
        }
    }

    /// Check `value` against the key's type, returning its canonical form.
    pub fn validate(&self, value: &Value) -> Result<Value, SettingsError> {
        let invalid = |reason: &str| SettingsError::InvalidValue {
            key: *self,
            reason: reason.to_string(),
        };
        match self {
            Self::MealCutoff | Self::GatePassCutoff => {
                let s = value
                    .as_str()
                    .ok_or_else(|| invalid("expected a time string in HH:MM form"))?;
                let time = NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
                    .map_err(|_| invalid("expected a time string in HH:MM form"))?;
                Ok(Value::from(time.format(TIME_FORMAT).to_string()))
            }
            Self::HostelFee | Self::MessFee | Self::LateFeePerDay => value
                .as_u64()
                .map(Value::from)
                .ok_or_else(|| invalid("expected a non-negative integer amount")),
        }
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| SettingsError::UnknownKey(s.to_string()))
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("unknown setting: {0:?}")]
    UnknownKey(String),

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: SettingKey, reason: String },
}

/// Typed view of every setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HallSettings {
    pub meal_cutoff: String,
    pub gate_pass_cutoff: String,
    pub hostel_fee: u64,
    pub mess_fee: u64,
    pub late_fee_per_day: u64,
}

/// Shared, validated settings map.
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    overrides: Arc<RwLock<BTreeMap<SettingKey, Value>>>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value, falling back to the default.
    pub fn get(&self, key: SettingKey) -> Value {
        self.overrides
            .read()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| key.default_value())
    }

    /// Validate and store a value. Returns the previous override, if any.
    pub fn set(&self, key: SettingKey, value: &Value) -> Result<(Value, Option<Value>), SettingsError> {
        let canonical = key.validate(value)?;
        let previous = self.overrides.write().insert(key, canonical.clone());
        Ok((canonical, previous))
    }

    /// Put back an earlier state after a failed write-through.
    pub fn restore(&self, key: SettingKey, previous: Option<Value>) {
        let mut guard = self.overrides.write();
        match previous {
            Some(v) => guard.insert(key, v),
            None => guard.remove(&key),
        };
    }

    fn time(&self, key: SettingKey) -> NaiveTime {
        self.get(key)
            .as_str()
            .and_then(|s| NaiveTime::parse_from_str(s, TIME_FORMAT).ok())
            .or_else(|| {
                key.default_value()
                    .as_str()
                    .and_then(|s| NaiveTime::parse_from_str(s, TIME_FORMAT).ok())
            })
            .unwrap_or_default()
    }

    fn amount(&self, key: SettingKey) -> u64 {
        self.get(key)
            .as_u64()
            .or_else(|| key.default_value().as_u64())
            .unwrap_or(0)
    }

    pub fn meal_cutoff(&self) -> NaiveTime {
        self.time(SettingKey::MealCutoff)
    }

    pub fn gate_pass_cutoff(&self) -> NaiveTime {
        self.time(SettingKey::GatePassCutoff)
    }

    pub fn hostel_fee(&self) -> u64 {
        self.amount(SettingKey::HostelFee)
    }

    pub fn mess_fee(&self) -> u64 {
        self.amount(SettingKey::MessFee)
    }

    pub fn late_fee_per_day(&self) -> u64 {
        self.amount(SettingKey::LateFeePerDay)
    }

    pub fn snapshot(&self) -> HallSettings {
        HallSettings {
            meal_cutoff: self.meal_cutoff().format(TIME_FORMAT).to_string(),
            gate_pass_cutoff: self.gate_pass_cutoff().format(TIME_FORMAT).to_string(),
            hostel_fee: self.hostel_fee(),
            mess_fee: self.mess_fee(),
            late_fee_per_day: self.late_fee_per_day(),
        }
    }

    /// Load a persisted value, skipping anything that no longer validates.
    pub fn load(&self, key: &str, value: &Value) {
        let result = key
            .parse::<SettingKey>()
            .and_then(|k| self.set(k, value).map(|_| ()));
        if let Err(e) = result {
            tracing::warn!(key, error = %e, "ignoring stored setting");
        }
    }
}

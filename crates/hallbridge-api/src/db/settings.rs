//! Settings persistence operations.
//!
//! Values are stored as JSONB keyed by the setting's snake_case name.
//! Validation happens in the settings store, both before writing and
//! again when loading.

use sqlx::PgPool;

use crate::settings::SettingKey;

/// Insert or replace a setting value.
pub async fn upsert(pool: &PgPool, key: SettingKey, value: &serde_json::Value) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO settings (key, value, updated_at) VALUES ($1, $2, now())
         ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at",
    )
    .bind(key.as_str())
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load every stored `(key, value)` pair.
pub async fn load_all(pool: &PgPool) -> Result<Vec<(String, serde_json::Value)>, sqlx::Error> {
    sqlx::query_as::<_, (String, serde_json::Value)>("SELECT key, value FROM settings ORDER BY key")
        .fetch_all(pool)
        .await
}

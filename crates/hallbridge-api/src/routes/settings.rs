//! # Hall Settings API
//!
//! Read the typed settings view, or replace one value by key.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_path};
use crate::settings::{HallSettings, SettingKey};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSettingRequest {
    /// New value; a `"HH:MM"` string for cutoffs, a non-negative integer for fees.
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SettingView {
    pub key: SettingKey,
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/settings", get(get_settings))
        .route("/v1/settings/{key}", put(update_setting))
}

/// GET /v1/settings: Every setting, defaults filled in.
#[utoipa::path(
    get,
    path = "/v1/settings",
    responses(
        (status = 200, description = "Current settings", body = HallSettings),
    ),
    tag = "settings"
)]
async fn get_settings(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<HallSettings>, AppError> {
    require_role(&caller, Role::Staff)?;
    Ok(Json(state.settings.snapshot()))
}

/// PUT /v1/settings/{key}: Replace one setting.
#[utoipa::path(
    put,
    path = "/v1/settings/{key}",
    params(("key" = String, Path, description = "Setting key, e.g. meal_cutoff")),
    request_body = UpdateSettingRequest,
    responses(
        (status = 200, description = "Setting stored in canonical form", body = SettingView),
        (status = 404, description = "Unknown key", body = crate::error::ErrorBody),
        (status = 422, description = "Value has the wrong type or format", body = crate::error::ErrorBody),
    ),
    tag = "settings"
)]
async fn update_setting(
    State(state): State<AppState>,
    caller: CallerIdentity,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<UpdateSettingRequest>, JsonRejection>,
) -> Result<Json<SettingView>, AppError> {
    require_role(&caller, Role::Admin)?;
    let key: SettingKey = extract_path(path)?.parse()?;
    let req = extract_json(body)?;

    let (value, previous) = state.settings.set(key, &req.value)?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::settings::upsert(pool, key, &value).await {
            tracing::error!(key = %key, error = %e, "failed to persist setting");
            state.settings.restore(key, previous);
            return Err(AppError::Internal("setting could not be persisted".to_string()));
        }
    }

    tracing::info!(key = %key, value = %value, "setting updated");
    Ok(Json(SettingView { key, value }))
}

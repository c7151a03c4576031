//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from hallbridge-core and hallbridge-state to HTTP
//! status codes with a JSON body carrying a machine-readable code.
//! Internal error details never reach the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hallbridge_core::ValidationError;
use hallbridge_state::{InventoryError, ProvisionError, RoomError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::settings::SettingsError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "DUPLICATE_KEY").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for some client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type returned by every handler.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body, path or query could not be parsed (422).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient role (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Conflict with current resource state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The resource is not in a state that permits the operation (409).
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// A uniqueness constraint would be violated (409).
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),

    /// Service dependency unavailable (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    pub(crate) fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::UNPROCESSABLE_ENTITY, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::PreconditionFailed(_) => (StatusCode::CONFLICT, "PRECONDITION_FAILED"),
            Self::DuplicateKey(_) => (StatusCode::CONFLICT, "DUPLICATE_KEY"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
        }
    }

    /// Construct a not-found error (404).
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::ServiceUnavailable(_) => tracing::warn!(error = %self, "service unavailable"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<RoomError> for AppError {
    fn from(err: RoomError) -> Self {
        match &err {
            RoomError::BedNotFound { .. } => Self::NotFound(err.to_string()),
            RoomError::BedOccupied { .. } | RoomError::InvalidTransition { .. } => {
                Self::Conflict(err.to_string())
            }
            RoomError::UnderMaintenance { .. } | RoomError::OccupiedBedsPresent { .. } => {
                Self::PreconditionFailed(err.to_string())
            }
        }
    }
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        match &err {
            InventoryError::RoomNotFound(_) => Self::NotFound(err.to_string()),
            InventoryError::DuplicateKey { .. } => Self::DuplicateKey(err.to_string()),
            InventoryError::StudentAlreadyAllocated { .. } => Self::Conflict(err.to_string()),
            InventoryError::InconsistentRoom(_) => Self::Internal(err.to_string()),
            InventoryError::Room(inner) => inner.clone().into(),
        }
    }
}

impl From<ProvisionError> for AppError {
    fn from(err: ProvisionError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<SettingsError> for AppError {
    fn from(err: SettingsError) -> Self {
        match &err {
            SettingsError::UnknownKey(_) => Self::NotFound(err.to_string()),
            SettingsError::InvalidValue { .. } => Self::Validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hallbridge_core::{BedNumber, RoomId, RoomNumber};
    use http_body_util::BodyExt;

    fn room_number() -> RoomNumber {
        RoomNumber::new("201").unwrap()
    }

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                AppError::Validation("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
            ),
            (
                AppError::BadRequest("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
                "BAD_REQUEST",
            ),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT, "CONFLICT"),
            (
                AppError::PreconditionFailed("x".into()),
                StatusCode::CONFLICT,
                "PRECONDITION_FAILED",
            ),
            (AppError::DuplicateKey("x".into()), StatusCode::CONFLICT, "DUPLICATE_KEY"),
            (
                AppError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
            (
                AppError::ServiceUnavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
            ),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_and_code(), (status, code), "{err}");
        }
    }

    #[test]
    fn room_errors_map_to_expected_variants() {
        let bed = BedNumber::new(2).unwrap();
        assert!(matches!(
            AppError::from(RoomError::BedNotFound { room_number: room_number(), bed }),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(RoomError::BedOccupied { room_number: room_number(), bed }),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(RoomError::UnderMaintenance { room_number: room_number() }),
            AppError::PreconditionFailed(_)
        ));
        assert!(matches!(
            AppError::from(RoomError::OccupiedBedsPresent {
                room_number: room_number(),
                occupied: 1
            }),
            AppError::PreconditionFailed(_)
        ));
    }

    #[test]
    fn inventory_errors_map_to_expected_variants() {
        assert!(matches!(
            AppError::from(InventoryError::RoomNotFound(RoomId::new())),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(InventoryError::DuplicateKey {
                floor: hallbridge_core::Floor::new(2).unwrap(),
                room_number: room_number(),
            }),
            AppError::DuplicateKey(_)
        ));
        assert!(matches!(
            AppError::from(InventoryError::Room(RoomError::UnderMaintenance {
                room_number: room_number()
            })),
            AppError::PreconditionFailed(_)
        ));
    }

    #[test]
    fn settings_errors_map_to_expected_variants() {
        assert!(matches!(
            AppError::from(SettingsError::UnknownKey("x".into())),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(crate::settings::SettingKey::MessFee.validate(&serde_json::json!("x")).unwrap_err()),
            AppError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn internal_error_hides_message() {
        let response = AppError::Internal("database password leaked".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert!(!body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("password"));
    }

    #[tokio::test]
    async fn client_error_keeps_message() {
        let response = AppError::DuplicateKey("room 201 already exists on floor 2".into())
            .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "DUPLICATE_KEY");
        assert!(body["error"]["message"].as_str().unwrap().contains("201"));
        assert!(body["error"].get("details").is_none());
    }
}

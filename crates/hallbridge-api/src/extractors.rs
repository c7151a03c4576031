//! # Request Extraction & Validation
//!
//! The [`Validate`] trait for request DTOs, plus helpers that turn axum's
//! JSON, query and path rejections into [`AppError::BadRequest`] so every
//! malformed request gets the standard error body.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::Json;

use crate::error::AppError;

/// Business-rule validation beyond what serde checks.
pub trait Validate {
    /// Validate business rules. Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it using the [`Validate`] trait.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

/// Extract query parameters.
pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract path parameters.
pub fn extract_path<T>(result: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    result
        .map(|Path(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(String);

    impl Validate for Named {
        fn validate(&self) -> Result<(), String> {
            if self.0.trim().is_empty() {
                Err("name must not be empty".into())
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn validated_json_passes_through_valid_values() {
        let value = extract_validated_json(Ok(Json(Named("asha".into())))).unwrap();
        assert_eq!(value.0, "asha");
    }

    #[test]
    fn validated_json_rejects_invalid_values() {
        let err = extract_validated_json(Ok(Json(Named("  ".into())))).err().unwrap();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("name")));
    }
}

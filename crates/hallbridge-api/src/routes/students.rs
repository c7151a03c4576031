//! # Student Directory API
//!
//! Registration and lookup of students, plus each student's current bed.
//! Students may read their own entry and assignment; everything else needs
//! the staff role. A student asking for someone else gets a 404.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use hallbridge_core::StudentId;
use hallbridge_state::Assignment;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::extractors::{extract_path, extract_validated_json, Validate};
use crate::state::{AppState, StudentRecord};

const MAX_FIELD_LEN: usize = 255;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStudentRequest {
    pub name: String,
    /// Institution-issued code; must be unique.
    pub student_code: String,
    pub email: Option<String>,
}

impl Validate for CreateStudentRequest {
    fn validate(&self) -> Result<(), String> {
        for (field, value) in [("name", &self.name), ("student_code", &self.student_code)] {
            if value.trim().is_empty() {
                return Err(format!("{field} must not be empty"));
            }
            if value.len() > MAX_FIELD_LEN {
                return Err(format!("{field} must not exceed {MAX_FIELD_LEN} characters"));
            }
        }
        if let Some(email) = &self.email {
            if email.len() > MAX_FIELD_LEN || !email.contains('@') {
                return Err("email must be a valid address".to_string());
            }
        }
        Ok(())
    }
}

/// Where a student currently sleeps.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignmentView {
    pub student_id: Uuid,
    pub room_id: Uuid,
    pub floor: u8,
    pub room_number: String,
    pub bed_number: u8,
}

impl From<Assignment> for AssignmentView {
    fn from(a: Assignment) -> Self {
        Self {
            student_id: a.student_id.0,
            room_id: a.room_id.0,
            floor: a.floor.get(),
            room_number: a.room_number.to_string(),
            bed_number: a.bed_number.get(),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/students", post(create_student).get(list_students))
        .route("/v1/students/{id}", get(get_student))
        .route("/v1/students/{id}/room", get(get_student_room))
}

/// Look up a student the caller is allowed to see.
fn visible_student(state: &AppState, caller: &CallerIdentity, id: Uuid) -> Result<StudentRecord, AppError> {
    let not_found = || AppError::not_found(format!("student {id} not found"));
    if !caller.can_view_student(StudentId(id)) {
        return Err(not_found());
    }
    state.students.get(&id).ok_or_else(not_found)
}

/// POST /v1/students: Register a student.
#[utoipa::path(
    post,
    path = "/v1/students",
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student registered", body = StudentRecord),
        (status = 409, description = "Student code already registered", body = crate::error::ErrorBody),
        (status = 422, description = "Validation failure", body = crate::error::ErrorBody),
    ),
    tag = "students"
)]
async fn create_student(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateStudentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StudentRecord>), AppError> {
    require_role(&caller, Role::Admin)?;
    let req = extract_validated_json(body)?;

    let record = StudentRecord {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        student_code: req.student_code.trim().to_string(),
        email: req.email.map(|e| e.trim().to_string()),
        created_at: Utc::now(),
    };

    state
        .students
        .insert_unique(record.id, record.clone(), |a, b| a.student_code == b.student_code)
        .map_err(|existing| {
            AppError::DuplicateKey(format!(
                "student code {} is already registered",
                existing.student_code
            ))
        })?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::students::insert(pool, &record).await {
            tracing::error!(student_id = %record.id, error = %e, "failed to persist student");
            state.students.remove(&record.id);
            return Err(AppError::Internal(
                "student could not be persisted".to_string(),
            ));
        }
    }

    tracing::info!(student_id = %record.id, student_code = %record.student_code, "student registered");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /v1/students: List students ordered by code.
#[utoipa::path(
    get,
    path = "/v1/students",
    responses(
        (status = 200, description = "All students", body = Vec<StudentRecord>),
    ),
    tag = "students"
)]
async fn list_students(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<StudentRecord>>, AppError> {
    require_role(&caller, Role::Staff)?;
    let mut students = state.students.list();
    students.sort_by(|a, b| a.student_code.cmp(&b.student_code));
    Ok(Json(students))
}

/// GET /v1/students/{id}: Get one student.
#[utoipa::path(
    get,
    path = "/v1/students/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student found", body = StudentRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "students"
)]
async fn get_student(
    State(state): State<AppState>,
    caller: CallerIdentity,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<StudentRecord>, AppError> {
    let id = extract_path(path)?;
    visible_student(&state, &caller, id).map(Json)
}

/// GET /v1/students/{id}/room: The student's current bed.
#[utoipa::path(
    get,
    path = "/v1/students/{id}/room",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Current assignment", body = AssignmentView),
        (status = 404, description = "Student unknown or not assigned", body = crate::error::ErrorBody),
    ),
    tag = "students"
)]
async fn get_student_room(
    State(state): State<AppState>,
    caller: CallerIdentity,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<AssignmentView>, AppError> {
    let id = extract_path(path)?;
    visible_student(&state, &caller, id)?;
    let assignment = state
        .rooms
        .read()
        .assignment_of(StudentId(id))
        .ok_or_else(|| AppError::not_found(format!("student {id} has no room assignment")))?;
    Ok(Json(assignment.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use hallbridge_core::{default_amenities, BedNumber, Capacity, Floor, RoomNumber};
    use hallbridge_state::RoomBlueprint;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app_as(state: AppState, caller: CallerIdentity) -> Router<()> {
        router().layer(axum::Extension(caller)).with_state(state)
    }

    async fn body_json<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_student(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/v1/students")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[test]
    fn validation_rules() {
        let ok = CreateStudentRequest {
            name: "Asha Rao".into(),
            student_code: "HB-001".into(),
            email: Some("asha@example.edu".into()),
        };
        assert!(ok.validate().is_ok());

        let blank = CreateStudentRequest {
            name: " ".into(),
            student_code: "HB-001".into(),
            email: None,
        };
        assert!(blank.validate().unwrap_err().contains("name"));

        let bad_email = CreateStudentRequest {
            name: "Asha".into(),
            student_code: "HB-001".into(),
            email: Some("asha".into()),
        };
        assert!(bad_email.validate().unwrap_err().contains("email"));
    }

    #[tokio::test]
    async fn register_then_duplicate_code() {
        let app = app_as(AppState::new(), CallerIdentity::admin());
        let body = serde_json::json!({"name": "Asha Rao", "student_code": "HB-001"});
        let resp = app.clone().oneshot(post_student(body.clone())).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: StudentRecord = body_json(resp).await;
        assert_eq!(created.student_code, "HB-001");

        let resp = app.clone().oneshot(post_student(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let err: serde_json::Value = body_json(resp).await;
        assert_eq!(err["error"]["code"], "DUPLICATE_KEY");

        let resp = app.oneshot(get("/v1/students")).await.unwrap();
        let all: Vec<StudentRecord> = body_json(resp).await;
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn student_sees_only_self() {
        let state = AppState::new();
        let admin = app_as(state.clone(), CallerIdentity::admin());
        let resp = admin
            .oneshot(post_student(serde_json::json!({"name": "Ravi", "student_code": "HB-002"})))
            .await
            .unwrap();
        let ravi: StudentRecord = body_json(resp).await;

        let me = CallerIdentity {
            role: Role::Student,
            student_id: Some(StudentId(ravi.id)),
        };
        let app = app_as(state.clone(), me);
        let resp = app.clone().oneshot(get(&format!("/v1/students/{}", ravi.id))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let other = Uuid::new_v4();
        let resp = app.clone().oneshot(get(&format!("/v1/students/{other}"))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = app.oneshot(get("/v1/students")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn room_lookup_follows_allocation() {
        let state = AppState::new();
        let admin = app_as(state.clone(), CallerIdentity::admin());
        let resp = admin
            .clone()
            .oneshot(post_student(serde_json::json!({"name": "Meera", "student_code": "HB-003"})))
            .await
            .unwrap();
        let meera: StudentRecord = body_json(resp).await;

        let uri = format!("/v1/students/{}/room", meera.id);
        let resp = admin.clone().oneshot(get(&uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let room = {
            let mut inventory = state.rooms.write();
            let room = inventory
                .create(&RoomBlueprint {
                    floor: Floor::new(5).unwrap(),
                    room_number: RoomNumber::new("507").unwrap(),
                    capacity: Capacity::new(3).unwrap(),
                    amenities: default_amenities(),
                })
                .unwrap();
            inventory
                .allocate(room.id, BedNumber::new(2).unwrap(), meera.occupant())
                .unwrap()
        };

        let resp = admin.oneshot(get(&uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let assignment: AssignmentView = body_json(resp).await;
        assert_eq!(assignment.room_id, room.id.0);
        assert_eq!(assignment.room_number, "507");
        assert_eq!(assignment.bed_number, 2);
    }

    #[tokio::test]
    async fn failed_persist_unregisters_student() {
        let state = AppState::with_config(
            crate::state::AppConfig::default(),
            Some(crate::db::unreachable_pool()),
        );
        let app = app_as(state.clone(), CallerIdentity::admin());
        let resp = app
            .oneshot(post_student(serde_json::json!({"name": "Ira", "student_code": "HB-900"})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(state.students.is_empty());
    }
}

//! # OpenAPI Specification Assembly
//!
//! Collects every utoipa-documented handler into one OpenAPI document,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Adds the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "`{role}:{student_id}:{secret}` or `{secret}`. Set the secret via AUTH_TOKEN.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HallBridge API",
        version = "0.1.0",
        description = "Room inventory, bed allocation and occupancy statistics for a residence hall.",
        license(name = "AGPL-3.0-or-later")
    ),
    servers(
        (url = "/", description = "This server")
    ),
    security(
        ("bearer_auth" = [])
    ),
    paths(
        // Rooms
        crate::routes::rooms::list_rooms,
        crate::routes::rooms::create_room,
        crate::routes::rooms::create_batch,
        crate::routes::rooms::initialize_rooms,
        crate::routes::rooms::room_stats,
        crate::routes::rooms::get_room,
        crate::routes::rooms::set_room_status,
        crate::routes::rooms::allocate_bed,
        crate::routes::rooms::release_bed,
        // Students
        crate::routes::students::create_student,
        crate::routes::students::list_students,
        crate::routes::students::get_student,
        crate::routes::students::get_student_room,
        // Settings
        crate::routes::settings::get_settings,
        crate::routes::settings::update_setting,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::auth::Role,
        crate::routes::rooms::RoomView,
        crate::routes::rooms::BedView,
        crate::routes::rooms::OccupantView,
        crate::routes::rooms::StatusChangeView,
        crate::routes::rooms::RoomListResponse,
        crate::routes::rooms::OccupancyReportView,
        crate::routes::rooms::BulkOutcomeView,
        crate::routes::rooms::ItemFailureView,
        crate::routes::rooms::ReleaseResponse,
        crate::routes::rooms::CreateRoomRequest,
        crate::routes::rooms::BatchCreateRequest,
        crate::routes::rooms::InitializeRequest,
        crate::routes::rooms::StatusRequest,
        crate::routes::rooms::AllocateRequest,
        crate::routes::students::CreateStudentRequest,
        crate::routes::students::AssignmentView,
        crate::state::StudentRecord,
        crate::settings::HallSettings,
        crate::settings::SettingKey,
        crate::routes::settings::UpdateSettingRequest,
        crate::routes::settings::SettingView,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "rooms", description = "Room inventory, provisioning and bed allocation"),
        (name = "students", description = "Student directory and room assignments"),
        (name = "settings", description = "Hall cutoffs and fees"),
    )
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI document.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

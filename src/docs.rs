use crate::api::attendance::{RecordAttendance, RecordResponse};
use crate::api::subject::{CreateSubject, MarkAttendance};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::subject::Subject;
use crate::models::{CredentialsReq, LoginResponse, RegisterResponse};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Tracker API",
        version = "0.1.0",
        description = r#"
## Attendance Tracker

Per-student attendance records and per-subject class counts.

### Key Features
- **Daily attendance**: one present/absent record per student per day
- **Subjects**: attended/total counters with a mark-present toggle and an add-class action

### Security
Everything except `/api/auth/*` needs `Authorization: Bearer <token>`.
A missing token is `401`, an invalid or expired one is `403`.

### Response Format
JSON bodies; failures are `{"error": "<message>"}`.
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,

        crate::api::attendance::record_attendance,
        crate::api::attendance::list_attendance,
        crate::api::attendance::attendance_calendar,

        crate::api::subject::list_subjects,
        crate::api::subject::create_subject,
        crate::api::subject::mark_subject,
        crate::api::subject::add_class
    ),
    components(
        schemas(
            CredentialsReq,
            RegisterResponse,
            LoginResponse,
            AttendanceStatus,
            AttendanceRecord,
            RecordAttendance,
            RecordResponse,
            Subject,
            CreateSubject,
            MarkAttendance
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration and token issuing"),
        (name = "Attendance", description = "Daily attendance records"),
        (name = "Subjects", description = "Per-subject class counts"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

use std::collections::BTreeMap;

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::store::RecordStore;
use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RecordAttendance {
    #[schema(example = "present")]
    pub status: AttendanceStatus,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct RecordResponse {
    #[schema(example = "Attendance recorded successfully")]
    pub message: String,
    pub record: AttendanceRecord,
}

/// Record today's attendance for the caller
///
/// The date is the server's current UTC day. A second call on the same day
/// replaces the earlier status.
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = RecordAttendance,
    responses(
        (status = 201, description = "Attendance recorded", body = RecordResponse),
        (status = 400, description = "Malformed body or write rejected", body = Object, example = json!({
            "error": "Could not record attendance"
        })),
        (status = 401, description = "Missing bearer token"),
        (status = 403, description = "Invalid or expired token")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn record_attendance(
    auth: AuthUser,
    body: web::Json<RecordAttendance>,
    store: web::Data<RecordStore>,
) -> Result<HttpResponse, ApiError> {
    let today = Utc::now().date_naive();

    let record = store
        .upsert_record(&auth.user_id, today, body.status)
        .await
        .map_err(|e| ApiError::from_write(e, "Could not record attendance"))?;

    tracing::info!(user_id = %auth.user_id, date = %today, status = %body.status, "Attendance recorded");

    Ok(HttpResponse::Created().json(RecordResponse {
        message: "Attendance recorded successfully".to_string(),
        record,
    }))
}

/// List the caller's attendance records, oldest first
#[utoipa::path(
    get,
    path = "/api/attendance",
    responses(
        (status = 200, description = "Attendance records", body = [AttendanceRecord]),
        (status = 401, description = "Missing bearer token"),
        (status = 403, description = "Invalid or expired token"),
        (status = 500, description = "Could not retrieve attendance records")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    store: web::Data<RecordStore>,
) -> Result<HttpResponse, ApiError> {
    let records = store
        .records_for(&auth.user_id)
        .await
        .map_err(|e| ApiError::from_read(e, "Could not retrieve attendance records"))?;

    Ok(HttpResponse::Ok().json(records))
}

/// The caller's attendance as a `date -> status` map
#[utoipa::path(
    get,
    path = "/api/attendance/calendar",
    responses(
        (status = 200, description = "Status per day", body = Object, example = json!({
            "2024-05-01": "present",
            "2024-05-02": "absent"
        })),
        (status = 401, description = "Missing bearer token"),
        (status = 403, description = "Invalid or expired token"),
        (status = 500, description = "Could not retrieve attendance records")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_calendar(
    auth: AuthUser,
    store: web::Data<RecordStore>,
) -> Result<HttpResponse, ApiError> {
    let calendar: BTreeMap<_, _> = store
        .calendar_for(&auth.user_id)
        .await
        .map_err(|e| ApiError::from_read(e, "Could not retrieve attendance records"))?;

    Ok(HttpResponse::Ok().json(calendar))
}

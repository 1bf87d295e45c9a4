use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::subject::{Subject, SubjectAction, normalize_name};
use crate::store::RecordStore;
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateSubject {
    #[schema(example = "Mathematics")]
    pub name: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct MarkAttendance {
    /// true marks the class attended, false takes the mark back
    #[schema(example = true)]
    pub present: bool,
}

#[utoipa::path(
    get,
    path = "/api/subjects",
    responses(
        (status = 200, description = "Subjects in creation order", body = [Subject]),
        (status = 401, description = "Missing bearer token"),
        (status = 403, description = "Invalid or expired token")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Subjects"
)]
pub async fn list_subjects(
    auth: AuthUser,
    store: web::Data<RecordStore>,
) -> Result<HttpResponse, ApiError> {
    let subjects = store
        .subjects_for(&auth.user_id)
        .await
        .map_err(|e| ApiError::from_read(e, "Could not retrieve subjects"))?;

    Ok(HttpResponse::Ok().json(subjects))
}

#[utoipa::path(
    post,
    path = "/api/subjects",
    request_body = CreateSubject,
    responses(
        (status = 201, description = "Subject created", body = Subject),
        (status = 400, description = "Empty or overlong name"),
        (status = 401, description = "Missing bearer token"),
        (status = 403, description = "Invalid or expired token")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Subjects"
)]
pub async fn create_subject(
    auth: AuthUser,
    body: web::Json<CreateSubject>,
    store: web::Data<RecordStore>,
) -> Result<HttpResponse, ApiError> {
    let name = normalize_name(&body.name).ok_or_else(|| {
        ApiError::Validation("Subject name must be 1 to 128 characters".to_string())
    })?;

    let subject = Subject::new(Uuid::new_v4().to_string(), name);
    store
        .create_subject(&auth.user_id, &subject)
        .await
        .map_err(|e| ApiError::from_write(e, "Could not create subject"))?;

    tracing::info!(user_id = %auth.user_id, subject_id = %subject.id, "Subject created");

    Ok(HttpResponse::Created().json(subject))
}

#[utoipa::path(
    put,
    path = "/api/subjects/{id}/attendance",
    request_body = MarkAttendance,
    params(
        ("id" = String, Path, description = "Subject id")
    ),
    responses(
        (status = 200, description = "Updated subject", body = Subject),
        (status = 400, description = "Malformed body"),
        (status = 404, description = "Subject not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Subjects"
)]
pub async fn mark_subject(
    auth: AuthUser,
    path: web::Path<String>,
    body: web::Json<MarkAttendance>,
    store: web::Data<RecordStore>,
) -> Result<HttpResponse, ApiError> {
    let action = if body.present {
        SubjectAction::MarkPresent
    } else {
        SubjectAction::MarkAbsent
    };

    apply(&auth, &path, action, &store).await
}

/// Count one more held class for the subject
#[utoipa::path(
    post,
    path = "/api/subjects/{id}/classes",
    params(
        ("id" = String, Path, description = "Subject id")
    ),
    responses(
        (status = 200, description = "Updated subject", body = Subject),
        (status = 404, description = "Subject not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Subjects"
)]
pub async fn add_class(
    auth: AuthUser,
    path: web::Path<String>,
    store: web::Data<RecordStore>,
) -> Result<HttpResponse, ApiError> {
    apply(&auth, &path, SubjectAction::AddClass, &store).await
}

async fn apply(
    auth: &AuthUser,
    subject_id: &str,
    action: SubjectAction,
    store: &RecordStore,
) -> Result<HttpResponse, ApiError> {
    let subject = store
        .apply_to_subject(&auth.user_id, subject_id, action)
        .await
        .map_err(|e| ApiError::from_write(e, "Could not update subject"))?;

    tracing::debug!(
        user_id = %auth.user_id,
        subject_id,
        ?action,
        attended = subject.attended,
        total = subject.total,
        "Subject updated"
    );

    Ok(HttpResponse::Ok().json(subject))
}

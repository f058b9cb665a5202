use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::admission::{AdmissionError, ValidationError};
use crate::db::Database;
use crate::models::*;

pub const INVALID_NUMBER_MESSAGE: &str =
    "Please enter valid numbers for attendance/internal/external.";
pub const NO_SUBJECTS_MESSAGE: &str = "Add at least 1 subject.";
pub const MISSING_FIELD_MESSAGE: &str = "Name and roll number are required.";
pub const ROLL_NO_TAKEN_MESSAGE: &str = "Roll number already exists! Use a unique roll number.";

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("Internal error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

/// Map an admission failure to the message shown next to the form.
fn admission_error(e: AdmissionError) -> (StatusCode, String) {
    match e {
        AdmissionError::Validation(v) => {
            let msg = match v {
                ValidationError::InvalidNumber { .. } => INVALID_NUMBER_MESSAGE,
                ValidationError::NoSubjects => NO_SUBJECTS_MESSAGE,
                ValidationError::MissingField(_) => MISSING_FIELD_MESSAGE,
            };
            (StatusCode::UNPROCESSABLE_ENTITY, msg.to_string())
        }
        AdmissionError::UniquenessConflict { .. } => {
            (StatusCode::CONFLICT, ROLL_NO_TAKEN_MESSAGE.to_string())
        }
        AdmissionError::Storage(e) => internal_error(e),
    }
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Students
// ============================================================

pub async fn summary(
    State(db): State<Database>,
) -> Result<Json<Summary>, (StatusCode, String)> {
    db.count_students()
        .map(|total_students| Json(Summary { total_students }))
        .map_err(internal_error)
}

pub async fn list_students(
    State(db): State<Database>,
) -> Result<Json<Vec<Student>>, (StatusCode, String)> {
    db.list_students().map(Json).map_err(internal_error)
}

pub async fn admit_student(
    State(db): State<Database>,
    Json(form): Json<AdmissionForm>,
) -> Result<(StatusCode, Json<Student>), (StatusCode, String)> {
    db.create_student_with_marks(form)
        .map(|s| (StatusCode::CREATED, Json(s)))
        .map_err(admission_error)
}

pub async fn get_transcript(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<Transcript>, (StatusCode, String)> {
    let (student, marks) = db.get_student_with_marks(id).map_err(internal_error)?;
    student
        .map(|student| Json(Transcript::new(student, marks)))
        .ok_or((StatusCode::NOT_FOUND, "Student not found".to_string()))
}

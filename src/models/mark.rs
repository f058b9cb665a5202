use serde::{Deserialize, Serialize};

use crate::grading::ResultStatus;

/// Marks for one subject, owned by a single student.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubjectMark {
    pub id: i64,
    pub student_id: i64,
    /// Zero-based position of the subject in the admission submission.
    pub position: i64,
    pub subject_code: String,
    pub subject_name: String,
    /// Attendance percentage. Stored as submitted; the 0-100 range is not enforced.
    pub attendance: f64,
    pub internal_marks: f64,
    pub external_marks: f64,
    /// `internal_marks + external_marks`.
    pub total: f64,
    pub grade: String,
    pub grade_point: u8,
    pub result: ResultStatus,
}

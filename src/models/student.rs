use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A student admitted with at least one subject.
///
/// Students are created once through admission and are never updated or
/// deleted afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Student {
    /// System-assigned identifier. Later admissions always get larger ids.
    pub id: i64,
    pub name: String,
    /// Human-assigned identifier, unique across all students.
    pub roll_no: String,
    pub department: String,
    pub semester: String,
    /// Admission time. Absent for rows imported from databases that predate it.
    pub created_at: Option<DateTime<Utc>>,
}

use serde::{Deserialize, Serialize};

use super::{Student, SubjectMark};
use crate::grading::{calc_cgpa, ResultStatus};

/// A student's marks sheet with the aggregated CGPA.
///
/// The `student` fields are flattened into the JSON response alongside the
/// ordered `marks` and the derived summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(flatten)]
    pub student: Student,
    /// Marks in admission order.
    pub marks: Vec<SubjectMark>,
    pub cgpa: f64,
    pub subjects: usize,
    pub passed: usize,
    /// `PASS` only when at least one subject exists and every subject passed.
    pub result: ResultStatus,
}

impl Transcript {
    pub fn new(student: Student, marks: Vec<SubjectMark>) -> Self {
        let grade_points: Vec<u8> = marks.iter().map(|m| m.grade_point).collect();
        let passed = marks
            .iter()
            .filter(|m| m.result == ResultStatus::Pass)
            .count();
        let result = if !marks.is_empty() && passed == marks.len() {
            ResultStatus::Pass
        } else {
            ResultStatus::Fail
        };

        Self {
            cgpa: calc_cgpa(&grade_points),
            subjects: marks.len(),
            passed,
            result,
            student,
            marks,
        }
    }
}

//! Admission input validation.
//!
//! Turns a raw [`AdmissionForm`] into a fully derived [`PreparedAdmission`]
//! before anything touches the store. Any bad number fails the whole batch, so
//! a student is never saved with a partial subset of subjects.

use std::fmt;

use thiserror::Error;

use crate::grading::{grade_from_total, Grade};
use crate::models::{AdmissionForm, SubjectRow};

/// A numeric column of a subject row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Attendance,
    InternalMarks,
    ExternalMarks,
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Attendance => "attendance",
            Self::InternalMarks => "internal marks",
            Self::ExternalMarks => "external marks",
        };
        f.write_str(name)
    }
}

/// A required student attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentField {
    Name,
    RollNo,
}

impl fmt::Display for StudentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => f.write_str("name"),
            Self::RollNo => f.write_str("roll number"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// `row` is the zero-based index in the submitted rows, blank rows included.
    #[error("subject row {row}: {field} is not a valid number: {value:?}")]
    InvalidNumber {
        row: usize,
        field: NumericField,
        value: String,
    },
    #[error("at least one subject is required")]
    NoSubjects,
    #[error("{0} is required")]
    MissingField(StudentField),
}

#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("roll number already exists: {roll_no}")]
    UniquenessConflict { roll_no: String },
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

/// A subject row with every derived field computed, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubjectMark {
    pub subject_code: String,
    pub subject_name: String,
    pub attendance: f64,
    pub internal_marks: f64,
    pub external_marks: f64,
    pub total: f64,
    pub grade: Grade,
}

/// A validated admission. Holds at least one subject.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedAdmission {
    pub name: String,
    pub roll_no: String,
    pub department: String,
    pub semester: String,
    pub marks: Vec<NewSubjectMark>,
}

/// Validate the form and derive every subject's total and grade.
pub fn prepare(form: AdmissionForm) -> Result<PreparedAdmission, ValidationError> {
    let name = form.name.trim().to_string();
    if name.is_empty() {
        return Err(ValidationError::MissingField(StudentField::Name));
    }
    let roll_no = form.roll_no.trim().to_string();
    if roll_no.is_empty() {
        return Err(ValidationError::MissingField(StudentField::RollNo));
    }

    let mut marks = Vec::with_capacity(form.subjects.len());
    for (row, subject) in form.subjects.iter().enumerate() {
        if subject.is_blank() {
            continue;
        }
        marks.push(prepare_row(row, subject)?);
    }

    if marks.is_empty() {
        return Err(ValidationError::NoSubjects);
    }

    Ok(PreparedAdmission {
        name,
        roll_no,
        department: form.department.trim().to_string(),
        semester: form.semester.trim().to_string(),
        marks,
    })
}

fn prepare_row(row: usize, subject: &SubjectRow) -> Result<NewSubjectMark, ValidationError> {
    let attendance = parse_number(row, NumericField::Attendance, &subject.attendance)?;
    let internal_marks = parse_number(row, NumericField::InternalMarks, &subject.internal_marks)?;
    let external_marks = parse_number(row, NumericField::ExternalMarks, &subject.external_marks)?;
    let total = internal_marks + external_marks;

    Ok(NewSubjectMark {
        subject_code: subject.code.trim().to_string(),
        subject_name: subject.name.trim().to_string(),
        attendance,
        internal_marks,
        external_marks,
        total,
        grade: grade_from_total(total),
    })
}

fn parse_number(row: usize, field: NumericField, raw: &str) -> Result<f64, ValidationError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ValidationError::InvalidNumber {
            row,
            field,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::ResultStatus;

    fn form(subjects: Vec<SubjectRow>) -> AdmissionForm {
        AdmissionForm {
            name: " A ".to_string(),
            roll_no: "R1".to_string(),
            department: "CS".to_string(),
            semester: "3".to_string(),
            subjects,
        }
    }

    #[test]
    fn derives_total_and_grade() {
        let prepared = prepare(form(vec![SubjectRow::new("C1", "Math", "90", "40", "45")]))
            .expect("valid admission");

        assert_eq!(prepared.name, "A");
        assert_eq!(prepared.marks.len(), 1);
        let mark = &prepared.marks[0];
        assert_eq!(mark.total, 85.0);
        assert_eq!(mark.grade.letter, "A+");
        assert_eq!(mark.grade.point, 9);
        assert_eq!(mark.grade.result, ResultStatus::Pass);
    }

    #[test]
    fn drops_blank_rows_and_keeps_named_rows_without_code() {
        let prepared = prepare(form(vec![
            SubjectRow::new("", "", "", "", ""),
            SubjectRow::new("", "Physics", "75", "20", "30"),
            SubjectRow::new("  ", "  ", "x", "y", "z"),
        ]))
        .expect("valid admission");

        assert_eq!(prepared.marks.len(), 1);
        assert_eq!(prepared.marks[0].subject_name, "Physics");
        assert_eq!(prepared.marks[0].subject_code, "");
    }

    #[test]
    fn rejects_rows_with_bad_numbers() {
        let err = prepare(form(vec![
            SubjectRow::new("C1", "Math", "90", "40", "45"),
            SubjectRow::new("C2", "Chem", "ninety", "40", "45"),
        ]))
        .unwrap_err();

        assert_eq!(
            err,
            ValidationError::InvalidNumber {
                row: 1,
                field: NumericField::Attendance,
                value: "ninety".to_string(),
            }
        );
    }

    #[test]
    fn named_row_without_code_is_still_validated() {
        let err = prepare(form(vec![SubjectRow::new("", "Physics", "80", "", "30")])).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidNumber {
                field: NumericField::InternalMarks,
                ..
            }
        ));
    }

    #[test]
    fn rejects_non_finite_numbers() {
        let err = prepare(form(vec![SubjectRow::new("C1", "Math", "90", "NaN", "45")])).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidNumber { .. }));

        let err = prepare(form(vec![SubjectRow::new("C1", "Math", "inf", "4", "45")])).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidNumber { .. }));
    }

    #[test]
    fn accepts_padded_and_fractional_numbers() {
        let prepared = prepare(form(vec![SubjectRow::new("C1", "Math", " 87.5 ", "19.5", "20.5")]))
            .expect("valid admission");
        assert_eq!(prepared.marks[0].attendance, 87.5);
        assert_eq!(prepared.marks[0].total, 40.0);
        assert_eq!(prepared.marks[0].grade.letter, "P");
    }

    #[test]
    fn requires_at_least_one_subject() {
        assert_eq!(prepare(form(Vec::new())), Err(ValidationError::NoSubjects));
        assert_eq!(
            prepare(form(vec![SubjectRow::default()])),
            Err(ValidationError::NoSubjects)
        );
    }

    #[test]
    fn requires_name_and_roll_number() {
        let mut missing_name = form(vec![SubjectRow::new("C1", "Math", "90", "40", "45")]);
        missing_name.name = "   ".to_string();
        assert_eq!(
            prepare(missing_name),
            Err(ValidationError::MissingField(StudentField::Name))
        );

        let mut missing_roll = form(vec![SubjectRow::new("C1", "Math", "90", "40", "45")]);
        missing_roll.roll_no = String::new();
        assert_eq!(
            prepare(missing_roll),
            Err(ValidationError::MissingField(StudentField::RollNo))
        );
    }
}

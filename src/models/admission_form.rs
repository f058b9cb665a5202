use serde::{Deserialize, Serialize};

/// Admission input exactly as the form submits it.
///
/// Numeric subject fields are kept as text so that parse failures can be
/// reported as validation errors rather than rejected by deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdmissionForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub roll_no: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub semester: String,
    /// Subject rows in submission order. Rows with a blank code and a blank
    /// name are treated as empty form rows and dropped.
    #[serde(default)]
    pub subjects: Vec<SubjectRow>,
}

/// One subject row of the admission form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectRow {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub attendance: String,
    #[serde(default)]
    pub internal_marks: String,
    #[serde(default)]
    pub external_marks: String,
}

impl SubjectRow {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        attendance: impl Into<String>,
        internal_marks: impl Into<String>,
        external_marks: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            attendance: attendance.into(),
            internal_marks: internal_marks.into(),
            external_marks: external_marks.into(),
        }
    }

    /// True when both the code and the name are blank after trimming.
    pub fn is_blank(&self) -> bool {
        self.code.trim().is_empty() && self.name.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_row_needs_both_code_and_name_blank() {
        assert!(SubjectRow::new("  ", "\t", "", "", "").is_blank());
        assert!(!SubjectRow::new("", "Physics", "", "", "").is_blank());
        assert!(!SubjectRow::new("PH1", "", "", "", "").is_blank());
    }
}

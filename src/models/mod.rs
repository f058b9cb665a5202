//! Domain models for the marks register.
//!
//! - [`Student`]: an admitted student, identified by a system-assigned id and a
//!   unique, human-assigned roll number.
//! - [`SubjectMark`]: one subject's marks for a student. Derived fields (total,
//!   grade, grade point, result) are computed once at admission and stored.
//! - [`AdmissionForm`]: raw admission input as submitted by a form, before
//!   validation.
//! - [`Transcript`]: a student with ordered marks and the computed CGPA.
//! - [`Summary`]: register-wide counts.

mod admission_form;
mod mark;
mod student;
mod summary;
mod transcript;

pub use admission_form::*;
pub use mark::*;
pub use student::*;
pub use summary::*;
pub use transcript::*;

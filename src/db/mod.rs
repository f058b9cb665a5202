mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Row, TransactionBehavior};

use crate::admission::{self, AdmissionError, PreparedAdmission};
use crate::grading::ResultStatus;
use crate::models::*;

const STUDENT_COLUMNS: &str = "id, name, roll_no, department, semester, created_at";

const MARK_COLUMNS: &str = "id, student_id, position, subject_code, subject_name, attendance,
    internal_marks, external_marks, total, grade, grade_point, result";

/// Handle to the marks register.
///
/// Cloning shares the underlying connection. Every operation holds the
/// connection lock for its full duration, so writers are serialized and a
/// reader never sees a half-inserted admission.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Admission
    // ============================================================

    /// Validate an admission form and store the student with all of its
    /// subject marks in a single transaction.
    ///
    /// Nothing is written when validation fails or the roll number is taken.
    pub fn create_student_with_marks(&self, form: AdmissionForm) -> Result<Student, AdmissionError> {
        let prepared = admission::prepare(form).inspect_err(|e| {
            tracing::warn!("Rejected admission: {}", e);
        })?;
        self.insert_admission(prepared)
    }

    fn insert_admission(&self, admission: PreparedAdmission) -> Result<Student, AdmissionError> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let now = Utc::now();

        let inserted = tx.execute(
            "INSERT INTO students (name, roll_no, department, semester, created_at)
             VALUES (?, ?, ?, ?, ?)",
            (
                &admission.name,
                &admission.roll_no,
                &admission.department,
                &admission.semester,
                now.to_rfc3339(),
            ),
        );
        if let Err(e) = inserted {
            if is_unique_violation(&e) {
                tracing::warn!("Roll number {} already exists", admission.roll_no);
                return Err(AdmissionError::UniquenessConflict {
                    roll_no: admission.roll_no,
                });
            }
            return Err(e.into());
        }
        let student_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO subject_marks
                 (student_id, position, subject_code, subject_name, attendance, internal_marks,
                  external_marks, total, grade, grade_point, result)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )?;
            for (position, mark) in admission.marks.iter().enumerate() {
                stmt.execute((
                    student_id,
                    position as i64,
                    &mark.subject_code,
                    &mark.subject_name,
                    mark.attendance,
                    mark.internal_marks,
                    mark.external_marks,
                    mark.total,
                    mark.grade.letter,
                    mark.grade.point,
                    mark.grade.result.as_str(),
                ))?;
            }
        }

        tx.commit()?;

        tracing::info!(
            "Admitted student {} ({}) with {} subjects",
            student_id,
            admission.roll_no,
            admission.marks.len()
        );

        Ok(Student {
            id: student_id,
            name: admission.name,
            roll_no: admission.roll_no,
            department: admission.department,
            semester: admission.semester,
            created_at: Some(now),
        })
    }

    // ============================================================
    // Queries
    // ============================================================

    /// All students, most recently admitted first.
    pub fn list_students(&self) -> Result<Vec<Student>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students ORDER BY id DESC"
        ))?;

        let students = stmt
            .query_map([], student_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(students)
    }

    pub fn count_students(&self) -> Result<u64> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn count_subject_marks(&self) -> Result<u64> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM subject_marks", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn get_student(&self, id: i64) -> Result<Option<Student>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        query_student(&conn, id)
    }

    /// A student and their marks in admission order.
    ///
    /// An unknown id is not an error: the student is `None` and the marks are
    /// empty.
    pub fn get_student_with_marks(&self, id: i64) -> Result<(Option<Student>, Vec<SubjectMark>)> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let student = query_student(&conn, id)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {MARK_COLUMNS} FROM subject_marks
             WHERE student_id = ? ORDER BY position ASC, id ASC"
        ))?;
        let marks = stmt
            .query_map([id], mark_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok((student, marks))
    }
}

/// Per-user data location used when no database path is configured.
pub fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "marksheet")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("marksheet.db"))
}

fn query_student(conn: &Connection, id: i64) -> Result<Option<Student>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?"
    ))?;

    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        Ok(Some(student_from_row(row)?))
    } else {
        Ok(None)
    }
}

fn student_from_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get(0)?,
        name: row.get(1)?,
        roll_no: row.get(2)?,
        department: row.get(3)?,
        semester: row.get(4)?,
        created_at: row.get::<_, Option<String>>(5)?.and_then(parse_datetime),
    })
}

fn mark_from_row(row: &Row<'_>) -> rusqlite::Result<SubjectMark> {
    // Older databases store grade points as REAL
    let grade_point = row.get::<_, f64>(10)? as u8;
    let result_text: String = row.get(11)?;
    let result = ResultStatus::from_str(&result_text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            11,
            Type::Text,
            format!("unknown result status {result_text:?}").into(),
        )
    })?;

    Ok(SubjectMark {
        id: row.get(0)?,
        student_id: row.get(1)?,
        position: row.get(2)?,
        subject_code: row.get(3)?,
        subject_name: row.get(4)?,
        attendance: row.get(5)?,
        internal_marks: row.get(6)?,
        external_marks: row.get(7)?,
        total: row.get(8)?,
        grade: row.get(9)?,
        grade_point,
        result,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn parse_datetime(s: String) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

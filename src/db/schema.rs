use std::collections::HashSet;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};

struct Migration {
    version: &'static str,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "001",
        name: "initial",
        sql: include_str!("migrations/001_initial.sql"),
    },
    Migration {
        version: "002",
        name: "mark_position",
        sql: include_str!("migrations/002_mark_position.sql"),
    },
];

/// Version whose tables the legacy, untracked schema already contains.
const LEGACY_BASELINE: &str = "001";

pub fn run_migrations(conn: &Connection) -> Result<()> {
    apply_pending(conn, MIGRATIONS)
}

fn apply_pending(conn: &Connection, migrations: &[Migration]) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )
    .context("Failed to create schema_migrations table")?;

    let mut applied = applied_versions(conn)?;

    if applied.is_empty() && has_legacy_tables(conn)? {
        let baseline = migrations
            .iter()
            .find(|m| m.version == LEGACY_BASELINE)
            .ok_or_else(|| anyhow::anyhow!("No baseline migration {LEGACY_BASELINE}"))?;
        record(conn, baseline)?;
        applied.insert(baseline.version.to_string());
        tracing::info!(
            "Found students table without version tracking, baselined at {}",
            baseline.version
        );
    }

    let pending = migrations
        .iter()
        .filter(|m| !applied.contains(m.version));
    for migration in pending {
        apply(conn, migration)?;
    }

    Ok(())
}

fn applied_versions(conn: &Connection) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations")?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<HashSet<String>, _>>()?;
    Ok(versions)
}

fn has_legacy_tables(conn: &Connection) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'students'",
            [],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn record(conn: &Connection, migration: &Migration) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)",
        (
            migration.version,
            migration.name,
            chrono::Utc::now().to_rfc3339(),
        ),
    )?;
    Ok(())
}

/// Run one migration and record it. Both commit together or not at all.
fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    tracing::info!("Applying migration {} ({})", migration.version, migration.name);

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql)
        .and_then(|_| record(&tx, migration))
        .with_context(|| {
            format!(
                "Migration {} ({}) failed",
                migration.version, migration.name
            )
        })?;
    tx.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted_versions(conn: &Connection) -> Vec<String> {
        let mut versions: Vec<String> = applied_versions(conn).unwrap().into_iter().collect();
        versions.sort();
        versions
    }

    fn column_names(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("SELECT name FROM pragma_table_info('{table}')"))
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap()
    }

    #[test]
    fn test_migrations_run_on_fresh_db() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('students', 'subject_marks')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 2);

        assert!(column_names(&conn, "subject_marks").contains(&"position".to_string()));
        assert!(column_names(&conn, "students").contains(&"created_at".to_string()));

        assert_eq!(sorted_versions(&conn), vec!["001", "002"]);
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(sorted_versions(&conn), vec!["001", "002"]);
    }

    #[test]
    fn test_existing_db_gets_baseline() {
        let conn = Connection::open_in_memory().unwrap();

        // Layout written by the untracked schema, with one admitted student
        conn.execute_batch(include_str!("migrations/001_initial.sql"))
            .unwrap();
        conn.execute_batch(
            "INSERT INTO students (name, roll_no, department, semester) VALUES ('A', 'R1', 'CS', '3');
             INSERT INTO subject_marks
                (student_id, subject_code, subject_name, attendance, internal_marks, external_marks,
                 total, grade, grade_point, result)
             VALUES (1, 'C1', 'Math', 90.0, 40.0, 45.0, 85.0, 'A+', 9.0, 'PASS');",
        )
        .unwrap();

        run_migrations(&conn).unwrap();

        assert_eq!(sorted_versions(&conn), vec!["001", "002"]);

        let position: i64 = conn
            .query_row("SELECT position FROM subject_marks WHERE id = 1", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(position, 1);
    }

    #[test]
    fn test_failed_migration_is_rolled_back_and_not_recorded() {
        let conn = Connection::open_in_memory().unwrap();
        let migrations = [
            Migration {
                version: "001",
                name: "initial",
                sql: "CREATE TABLE things (id INTEGER PRIMARY KEY);",
            },
            Migration {
                version: "002",
                name: "broken",
                sql: "CREATE TABLE half_done (id INTEGER); ALTER TABLE missing ADD COLUMN x TEXT;",
            },
        ];

        let err = apply_pending(&conn, &migrations).unwrap_err();
        assert!(err.to_string().contains("002"));

        assert_eq!(sorted_versions(&conn), vec!["001"]);
        let half_done: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'half_done'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(half_done, 0);
    }
}

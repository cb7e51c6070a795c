use crate::errors::{RecorderError, Result};
use crate::outcome::Outcome;
use crate::storage::rows::{PropertyRow, RunRow, TestRow};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Shared handle on the result database. One handle lives for the duration
/// of a run; callers deliver events from a single logical sequence, the
/// mutex only guards against accidental cross-thread reuse.
#[derive(Clone, Debug)]
pub struct Store {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| RecorderError::StorageUnavailable {
            path: path.to_owned(),
            source: e,
        })?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// In-memory database, used by tests and short-lived hosts.
    pub fn memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Idempotent: safe to call against an already-initialized database.
    pub fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(crate::storage::schema::DDL)?;
        Ok(())
    }

    // --- Run lifecycle ---

    /// Insert a fresh runs row and return its generated identifier.
    /// Autocommit: the row is durable once this returns.
    pub fn begin_run(&self, start: DateTime<Utc>) -> Result<String> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO runs(id, start) VALUES (?1, ?2)",
            params![run_id, fmt_ts(start)],
        )?;
        tracing::debug!(run_id = %run_id, "run recording started");
        Ok(run_id)
    }

    pub fn end_run(&self, run_id: &str, finish: DateTime<Utc>) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE runs SET finish=?1 WHERE id=?2",
            params![fmt_ts(finish), run_id],
        )?;
        if changed == 0 {
            return Err(RecorderError::UnknownRun(run_id.to_owned()));
        }
        Ok(())
    }

    // --- Test records ---

    pub fn begin_test(
        &self,
        run_id: &str,
        name: &str,
        desc: Option<&str>,
        start: DateTime<Utc>,
    ) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO results(name, runid, \"desc\", start) VALUES (?1, ?2, ?3, ?4)",
            params![name, run_id, desc, fmt_ts(start)],
        )
        .map_err(|e| match &e {
            rusqlite::Error::SqliteFailure(f, _)
                if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                RecorderError::UnknownRun(run_id.to_owned())
            }
            _ => RecorderError::Storage(e),
        })?;
        Ok(conn.last_insert_rowid())
    }

    /// Record the outcome for an open test record. Guarded by
    /// `result IS NULL`: exactly one completion per record.
    pub fn complete_test(
        &self,
        test_id: i64,
        finish: DateTime<Utc>,
        outcome: Outcome,
        msg: &str,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE results SET finish=?1, result=?2, msg=?3 WHERE id=?4 AND result IS NULL",
            params![fmt_ts(finish), outcome.as_str(), msg, test_id],
        )?;
        if changed == 0 {
            let exists: Option<i64> = conn
                .query_row("SELECT id FROM results WHERE id=?1", params![test_id], |r| {
                    r.get(0)
                })
                .optional()?;
            return Err(match exists {
                Some(_) => RecorderError::AlreadyCompleted(test_id),
                None => RecorderError::UnknownTest(test_id),
            });
        }
        Ok(())
    }

    // --- Properties ---

    /// Write one batch of properties for a test record inside a single
    /// transaction. Any failure rolls the whole batch back; a partial set
    /// is never left committed.
    pub fn insert_properties(&self, test_id: i64, pairs: &[(String, String)]) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        for (key, value) in pairs {
            tx.execute(
                "INSERT INTO props(id, key, value) VALUES (?1, ?2, ?3)",
                params![test_id, key, value],
            )
            .map_err(|e| match &e {
                rusqlite::Error::SqliteFailure(f, _)
                    if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
                {
                    RecorderError::DuplicatePropertyKey {
                        id: test_id,
                        key: key.clone(),
                    }
                }
                _ => RecorderError::Storage(e),
            })?;
        }
        tx.commit()?;
        Ok(())
    }

    // --- Read-back ---

    pub fn fetch_run(&self, run_id: &str) -> Result<Option<RunRow>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT id, start, finish FROM runs WHERE id=?1",
                params![run_id],
                |r| {
                    Ok(RunRow {
                        id: r.get(0)?,
                        start: r.get(1)?,
                        finish: r.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    pub fn fetch_tests_for_run(&self, run_id: &str) -> Result<Vec<TestRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, runid, \"desc\", result, msg, start, finish
             FROM results WHERE runid=?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![run_id], |r| {
            Ok(TestRow {
                id: r.get(0)?,
                name: r.get(1)?,
                runid: r.get(2)?,
                desc: r.get(3)?,
                result: r.get(4)?,
                msg: r.get(5)?,
                start: r.get(6)?,
                finish: r.get(7)?,
            })
        })?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn fetch_properties(&self, test_id: i64) -> Result<Vec<PropertyRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT id, key, value FROM props WHERE id=?1 ORDER BY key ASC")?;
        let rows = stmt.query_map(params![test_id], |r| {
            Ok(PropertyRow {
                id: r.get(0)?,
                key: r.get(1)?,
                value: r.get(2)?,
            })
        })?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn count_rows(&self, table: &str) -> Result<i64> {
        // Allowlist to keep table names out of SQL injection territory.
        if !["runs", "results", "props"].contains(&table) {
            return Err(RecorderError::Storage(
                rusqlite::Error::InvalidParameterName(table.to_owned()),
            ));
        }
        let conn = self.conn.lock().unwrap();
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let n: i64 = conn.query_row(&sql, [], |r| r.get(0))?;
        Ok(n)
    }
}

/// Fixed-width RFC 3339 in UTC so lexicographic order matches time order.
pub(crate) fn fmt_ts(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

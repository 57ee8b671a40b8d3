//! SQLite-backed record collections.
//!
//! Provides persistent storage for:
//! - Planner tasks (`tasks`)
//! - Completed work sessions (`timersessions`)
//! - Key-value store for application state (`kv`)

use std::path::Path;

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::DatabaseError;
use crate::records::{Priority, SessionKind, Task, TimerSession};

use super::{data_dir, Store};

const TASK_COLUMNS: &str = "id, title, description, deadline, priority, tags, \
                            completed, completed_at, archived, created_at";
const SESSION_COLUMNS: &str = "id, duration_min, kind, date";

/// SQLite database holding every collection the dashboard touches.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/nosofy.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created or the
    /// database cannot be opened or migrated.
    pub fn open() -> crate::error::Result<Self> {
        let path = data_dir()?.join("nosofy.db");
        Ok(Self::open_at(&path)?)
    }

    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Additive schema creation only.
    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tasks (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                title        TEXT NOT NULL,
                description  TEXT NOT NULL DEFAULT '',
                deadline     TEXT,
                priority     TEXT NOT NULL DEFAULT 'medium',
                tags         TEXT NOT NULL DEFAULT '[]',
                completed    INTEGER NOT NULL DEFAULT 0,
                completed_at TEXT,
                archived     INTEGER NOT NULL DEFAULT 0,
                created_at   TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS timersessions (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                duration_min INTEGER NOT NULL DEFAULT 0,
                kind         TEXT NOT NULL DEFAULT 'work',
                date         TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_completed_at ON tasks(completed_at);
            CREATE INDEX IF NOT EXISTS idx_timersessions_date ON timersessions(date);",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn upsert_task(&self, task: &Task, replace: bool) -> Result<i64, DatabaseError> {
        let verb = if replace { "INSERT OR REPLACE" } else { "INSERT" };
        let tags = serde_json::to_string(&task.tags)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        self.conn.execute(
            &format!(
                "{verb} INTO tasks ({TASK_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            ),
            params![
                task.id,
                task.title,
                task.description,
                task.deadline,
                task.priority.as_str(),
                tags,
                task.completed,
                task.completed_at,
                task.archived,
                task.created_at,
            ],
        )?;
        Ok(task.id.unwrap_or_else(|| self.conn.last_insert_rowid()))
    }

    fn upsert_session(&self, session: &TimerSession, replace: bool) -> Result<i64, DatabaseError> {
        let verb = if replace { "INSERT OR REPLACE" } else { "INSERT" };
        self.conn.execute(
            &format!("{verb} INTO timersessions ({SESSION_COLUMNS}) VALUES (?1, ?2, ?3, ?4)"),
            params![
                session.id,
                session.duration_min,
                session.kind.as_str(),
                session.date,
            ],
        )?;
        Ok(session.id.unwrap_or_else(|| self.conn.last_insert_rowid()))
    }
}

fn conversion_error(
    idx: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let priority: String = row.get(4)?;
    let tags: String = row.get(5)?;
    Ok(Task {
        id: Some(row.get(0)?),
        title: row.get(1)?,
        description: row.get(2)?,
        deadline: row.get(3)?,
        priority: priority
            .parse::<Priority>()
            .map_err(|e| conversion_error(4, e))?,
        tags: serde_json::from_str(&tags).map_err(|e| conversion_error(5, e))?,
        completed: row.get(6)?,
        completed_at: row.get(7)?,
        archived: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<TimerSession> {
    let kind: String = row.get(2)?;
    Ok(TimerSession {
        id: Some(row.get(0)?),
        duration_min: row.get(1)?,
        kind: match kind.as_str() {
            "break" => SessionKind::Break,
            _ => SessionKind::Work,
        },
        date: row.get(3)?,
    })
}

impl Store<Task> for Database {
    fn get(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        let task = self
            .conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                task_from_row,
            )
            .optional()?;
        Ok(task)
    }

    fn get_all(&self) -> Result<Vec<Task>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id"))?;
        let tasks = stmt
            .query_map([], task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    fn add(&self, record: &Task) -> Result<i64, DatabaseError> {
        self.upsert_task(record, false)
    }

    fn put(&self, record: &Task) -> Result<i64, DatabaseError> {
        self.upsert_task(record, true)
    }

    fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(())
    }
}

impl Store<TimerSession> for Database {
    fn get(&self, id: i64) -> Result<Option<TimerSession>, DatabaseError> {
        let session = self
            .conn
            .query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM timersessions WHERE id = ?1"),
                params![id],
                session_from_row,
            )
            .optional()?;
        Ok(session)
    }

    fn get_all(&self) -> Result<Vec<TimerSession>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM timersessions ORDER BY id"
        ))?;
        let sessions = stmt
            .query_map([], session_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sessions)
    }

    fn add(&self, record: &TimerSession) -> Result<i64, DatabaseError> {
        let id = self.upsert_session(record, false)?;
        tracing::debug!(id, duration_min = record.duration_min, "timer session stored");
        Ok(id)
    }

    fn put(&self, record: &TimerSession) -> Result<i64, DatabaseError> {
        self.upsert_session(record, true)
    }

    fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM timersessions WHERE id = ?1", params![id])?;
        Ok(())
    }
}

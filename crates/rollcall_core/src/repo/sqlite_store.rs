//! SQLite-backed stand-in for the class/attendance document store.
//!
//! # Responsibility
//! - Implement `ClassStore` and `AttendanceStore` over migrated tables.
//! - Offer seeding and listing helpers for local runs and tests.
//!
//! # Invariants
//! - Write paths validate sessions before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - "Store order" for duplicate access codes is insertion order.

use crate::db::DbError;
use crate::model::attendance::{AttendanceRecord, RecordId};
use crate::model::class_session::{ClassSession, SessionId};
use crate::repo::store::{AttendanceStore, ClassStore, StoreError, StoreResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, Row};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

const CLASS_SELECT_SQL: &str = "SELECT
    id,
    name,
    access_code,
    date,
    teacher_name
FROM classes";

const ATTENDANCE_SELECT_SQL: &str = "SELECT
    id,
    session_id,
    student_key,
    student_name,
    student_email,
    teacher_name,
    class_name,
    access_code,
    session_date,
    recorded_at
FROM attendance";

/// Store adapter owning one migrated SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Inserts one class session document.
    pub fn insert_session(&self, session: &ClassSession) -> StoreResult<SessionId> {
        session.validate()?;

        self.lock()?.execute(
            "INSERT INTO classes (id, name, access_code, date, teacher_name)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                session.id.to_string(),
                session.name.as_str(),
                session.access_code.as_str(),
                session.date,
                session.teacher_name.as_deref(),
            ],
        )?;

        Ok(session.id)
    }

    /// Lists sessions, most recent class date first.
    pub fn list_sessions(&self) -> StoreResult<Vec<ClassSession>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{CLASS_SELECT_SQL} ORDER BY date DESC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut sessions = Vec::new();
        while let Some(row) = rows.next()? {
            sessions.push(parse_class_row(row)?);
        }
        Ok(sessions)
    }

    /// Lists attendance for one session in registration order.
    pub fn attendance_for_session(
        &self,
        session_id: SessionId,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{ATTENDANCE_SELECT_SQL}
             WHERE session_id = ?1
             ORDER BY recorded_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([session_id.to_string()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_attendance_row(row)?);
        }
        Ok(records)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("sqlite connection lock poisoned".to_string()))
    }
}

#[async_trait]
impl ClassStore for SqliteStore {
    async fn find_by_access_code(&self, code: &str) -> StoreResult<Vec<ClassSession>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{CLASS_SELECT_SQL}
             WHERE access_code = ?1
             ORDER BY rowid ASC;"
        ))?;
        let mut rows = stmt.query([code])?;
        let mut sessions = Vec::new();
        while let Some(row) = rows.next()? {
            sessions.push(parse_class_row(row)?);
        }
        Ok(sessions)
    }
}

#[async_trait]
impl AttendanceStore for SqliteStore {
    async fn find_attendance(
        &self,
        session_id: SessionId,
        student_key: &str,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{ATTENDANCE_SELECT_SQL}
             WHERE session_id = ?1 AND student_key = ?2;"
        ))?;
        let mut rows = stmt.query(params![session_id.to_string(), student_key])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_attendance_row(row)?));
        }
        Ok(None)
    }

    async fn add_attendance(&self, record: &AttendanceRecord) -> StoreResult<RecordId> {
        let inserted = self.lock()?.execute(
            "INSERT INTO attendance (
                id,
                session_id,
                student_key,
                student_name,
                student_email,
                teacher_name,
                class_name,
                access_code,
                session_date,
                recorded_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                record.id.to_string(),
                record.session_id.to_string(),
                record.student_key.as_str(),
                record.student_name.as_str(),
                record.student_email.as_str(),
                record.teacher_name.as_str(),
                record.class_name.as_str(),
                record.access_code.as_str(),
                record.session_date,
                record.recorded_at,
            ],
        );

        match inserted.map_err(DbError::Sqlite) {
            Ok(_) => Ok(record.id),
            Err(err) if err.is_unique_violation() => Err(StoreError::Duplicate),
            Err(err) => Err(StoreError::Db(err)),
        }
    }
}

fn parse_class_row(row: &Row<'_>) -> StoreResult<ClassSession> {
    let session = ClassSession {
        id: parse_uuid(row, "id", "classes.id")?,
        name: row.get("name")?,
        access_code: row.get("access_code")?,
        date: row.get("date")?,
        teacher_name: row.get("teacher_name")?,
    };
    session.validate()?;
    Ok(session)
}

fn parse_attendance_row(row: &Row<'_>) -> StoreResult<AttendanceRecord> {
    Ok(AttendanceRecord {
        id: parse_uuid(row, "id", "attendance.id")?,
        session_id: parse_uuid(row, "session_id", "attendance.session_id")?,
        student_key: row.get("student_key")?,
        student_name: row.get("student_name")?,
        student_email: row.get("student_email")?,
        teacher_name: row.get("teacher_name")?,
        class_name: row.get("class_name")?,
        access_code: row.get("access_code")?,
        session_date: row.get("session_date")?,
        recorded_at: row.get("recorded_at")?,
    })
}

fn parse_uuid(row: &Row<'_>, column: &str, label: &str) -> StoreResult<Uuid> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid value `{text}` in {label}")))
}

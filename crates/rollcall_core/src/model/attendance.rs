//! Attendance record model.
//!
//! # Responsibility
//! - Capture one student's presence at one class session.
//! - Snapshot session and identity attributes at registration time.
//!
//! # Invariants
//! - At most one record exists per `(session_id, student_key)`.
//! - Records are append-only; core never mutates or deletes them.

use crate::model::class_session::{ClassSession, SessionId};
use crate::model::user::User;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub type RecordId = Uuid;

/// Durable evidence that a student attended a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: RecordId,
    pub session_id: SessionId,
    /// Per-session uniqueness key, see [`User::attendance_key`].
    pub student_key: String,
    pub student_name: String,
    pub student_email: String,
    pub teacher_name: String,
    pub class_name: String,
    pub access_code: String,
    /// Copied from `ClassSession::date`.
    pub session_date: i64,
    /// Unix epoch milliseconds.
    pub recorded_at: i64,
}

impl AttendanceRecord {
    /// Builds a record for `user` attending `session`.
    ///
    /// Missing optional identity or session fields are replaced by their
    /// placeholders; this constructor never fails.
    pub fn for_session(session: &ClassSession, user: &User, recorded_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id: session.id,
            student_key: user.attendance_key(),
            student_name: user.student_name().to_string(),
            student_email: user.student_email().to_string(),
            teacher_name: session.teacher_name_or_placeholder().to_string(),
            class_name: session.name.clone(),
            access_code: session.access_code.clone(),
            session_date: session.date,
            recorded_at,
        }
    }
}

/// Current wall clock in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}

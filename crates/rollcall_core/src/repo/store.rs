//! Store contracts over the `classes` and `attendance` collections.
//!
//! # Responsibility
//! - Describe the round trips core makes against the external document store.
//! - Provide one error taxonomy shared by every adapter.

use crate::db::DbError;
use crate::model::attendance::{AttendanceRecord, RecordId};
use crate::model::class_session::{ClassSession, ClassSessionValidationError, SessionId};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-access failure.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Write rejected by the `(session_id, student_key)` uniqueness rule.
    Duplicate,
    /// Session document violates model invariants.
    Validation(ClassSessionValidationError),
    InvalidData(String),
    /// Backend could not be reached or is in an unusable state.
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Duplicate => write!(f, "attendance already recorded for this session"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::Unavailable(message) => write!(f, "store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Duplicate | Self::InvalidData(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::from(DbError::Sqlite(value))
    }
}

impl From<ClassSessionValidationError> for StoreError {
    fn from(value: ClassSessionValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Query side of the `classes` collection.
#[async_trait]
pub trait ClassStore: Send + Sync {
    /// Returns every session whose `access_code` equals `code`, in store order.
    async fn find_by_access_code(&self, code: &str) -> StoreResult<Vec<ClassSession>>;
}

/// `attendance` collection.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Returns the record for one student at one session, if any.
    async fn find_attendance(
        &self,
        session_id: SessionId,
        student_key: &str,
    ) -> StoreResult<Option<AttendanceRecord>>;

    /// Appends one record.
    ///
    /// Adapters must reject a second record for the same
    /// `(session_id, student_key)` with `StoreError::Duplicate`.
    async fn add_attendance(&self, record: &AttendanceRecord) -> StoreResult<RecordId>;
}

#[async_trait]
impl<T: ClassStore + ?Sized> ClassStore for Arc<T> {
    async fn find_by_access_code(&self, code: &str) -> StoreResult<Vec<ClassSession>> {
        (**self).find_by_access_code(code).await
    }
}

#[async_trait]
impl<T: AttendanceStore + ?Sized> AttendanceStore for Arc<T> {
    async fn find_attendance(
        &self,
        session_id: SessionId,
        student_key: &str,
    ) -> StoreResult<Option<AttendanceRecord>> {
        (**self).find_attendance(session_id, student_key).await
    }

    async fn add_attendance(&self, record: &AttendanceRecord) -> StoreResult<RecordId> {
        (**self).add_attendance(record).await
    }
}

//! Attendance registration use case.
//!
//! # Responsibility
//! - Resolve an access code and write one attendance record for a student.
//! - Guarantee at-most-once registration per `(session_id, student_key)`.
//!
//! # Invariants
//! - Zero writes for blank or unknown codes.
//! - Existing registrations are detected before insert; a concurrent insert
//!   that loses the race is reported as `AlreadyRegistered`, not as a fault.
//! - Missing identity fields never fail a registration.

use crate::logging::mask_code;
use crate::model::attendance::{now_epoch_ms, AttendanceRecord};
use crate::model::class_session::ClassSession;
use crate::model::user::User;
use crate::repo::store::{AttendanceStore, ClassStore, StoreError};
use crate::service::class_lookup::{ClassLookup, LookupError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Business result of a registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A new record was written.
    Registered(AttendanceRecord),
    /// The student already had a record for this session; nothing written.
    AlreadyRegistered(AttendanceRecord),
    /// No session matches the code; nothing written.
    InvalidCode,
}

/// Registration fault.
#[derive(Debug)]
pub enum RegisterError {
    /// Code was empty or whitespace-only.
    EmptyCode,
    /// Store faulted while reading sessions or existing attendance.
    LookupFailed(StoreError),
    /// Store faulted while inserting the record.
    WriteFailed(StoreError),
}

impl Display for RegisterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCode => write!(f, "access code must not be empty"),
            Self::LookupFailed(err) => write!(f, "attendance lookup failed: {err}"),
            Self::WriteFailed(err) => write!(f, "attendance write failed: {err}"),
        }
    }
}

impl Error for RegisterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyCode => None,
            Self::LookupFailed(err) | Self::WriteFailed(err) => Some(err),
        }
    }
}

impl From<LookupError> for RegisterError {
    fn from(value: LookupError) -> Self {
        match value {
            LookupError::EmptyCode => Self::EmptyCode,
            LookupError::LookupFailed(err) => Self::LookupFailed(err),
        }
    }
}

/// Writes attendance records for resolved class sessions.
pub struct AttendanceRecorder<C: ClassStore, A: AttendanceStore> {
    lookup: ClassLookup<C>,
    attendance: A,
    clock: fn() -> i64,
}

impl<C: ClassStore, A: AttendanceStore> AttendanceRecorder<C, A> {
    pub fn new(classes: C, attendance: A) -> Self {
        Self::with_clock(classes, attendance, now_epoch_ms)
    }

    /// Creates a recorder stamping `recorded_at` from `clock`.
    pub fn with_clock(classes: C, attendance: A, clock: fn() -> i64) -> Self {
        Self {
            lookup: ClassLookup::new(classes),
            attendance,
            clock,
        }
    }

    /// Registers `user` for the session addressed by `code`.
    ///
    /// # Contract
    /// - Blank code: `Err(EmptyCode)`, no store access.
    /// - Unknown code: `Ok(InvalidCode)`, no write.
    /// - Existing record: `Ok(AlreadyRegistered(existing))`, no write.
    /// - Otherwise exactly one write and `Ok(Registered(record))`.
    pub async fn register(&self, code: &str, user: &User) -> Result<Outcome, RegisterError> {
        let Some(session) = self.lookup.find_session_by_code(code).await? else {
            info!(
                "event=attendance_register module=service status=invalid_code code={}",
                mask_code(code.trim())
            );
            return Ok(Outcome::InvalidCode);
        };

        if let Some(existing) = self.existing_record(&session, user).await? {
            info!(
                "event=attendance_register module=service status=already_registered session_id={}",
                session.id
            );
            return Ok(Outcome::AlreadyRegistered(existing));
        }

        let record = AttendanceRecord::for_session(&session, user, (self.clock)());
        match self.attendance.add_attendance(&record).await {
            Ok(record_id) => {
                info!(
                    "event=attendance_register module=service status=ok session_id={} record_id={}",
                    session.id, record_id
                );
                Ok(Outcome::Registered(record))
            }
            Err(StoreError::Duplicate) => {
                warn!(
                    "event=attendance_register module=service status=duplicate_write session_id={}",
                    session.id
                );
                match self.existing_record(&session, user).await? {
                    Some(existing) => Ok(Outcome::AlreadyRegistered(existing)),
                    None => Err(RegisterError::WriteFailed(StoreError::Duplicate)),
                }
            }
            Err(err) => {
                error!(
                    "event=attendance_register module=service status=error session_id={} error={}",
                    session.id, err
                );
                Err(RegisterError::WriteFailed(err))
            }
        }
    }

    async fn existing_record(
        &self,
        session: &ClassSession,
        user: &User,
    ) -> Result<Option<AttendanceRecord>, RegisterError> {
        self.attendance
            .find_attendance(session.id, &user.attendance_key())
            .await
            .map_err(|err| {
                error!(
                    "event=attendance_precheck module=service status=error session_id={} error={}",
                    session.id, err
                );
                RegisterError::LookupFailed(err)
            })
    }
}

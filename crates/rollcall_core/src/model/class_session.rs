//! Class-session model.
//!
//! # Responsibility
//! - Describe one schedulable class instance addressable by access code.
//!
//! # Invariants
//! - `access_code` is non-blank and compared case-sensitively.
//! - `name` is non-blank.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Placeholder used when a session has no teacher name.
pub const TEACHER_NAME_PLACEHOLDER: &str = "Not available";

/// Stable identifier of a class session document.
pub type SessionId = Uuid;

/// One class instance students can check in to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSession {
    pub id: SessionId,
    pub name: String,
    /// Short-lived token used for manual entry or QR encoding.
    pub access_code: String,
    /// Unix epoch milliseconds.
    pub date: i64,
    pub teacher_name: Option<String>,
}

impl ClassSession {
    /// Creates a session with a generated id and no teacher name.
    pub fn new(name: impl Into<String>, access_code: impl Into<String>, date: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            access_code: access_code.into(),
            date,
            teacher_name: None,
        }
    }

    pub fn with_teacher(mut self, teacher_name: impl Into<String>) -> Self {
        self.teacher_name = Some(teacher_name.into());
        self
    }

    /// Teacher name, or [`TEACHER_NAME_PLACEHOLDER`] when absent or blank.
    pub fn teacher_name_or_placeholder(&self) -> &str {
        super::user::non_blank(self.teacher_name.as_deref()).unwrap_or(TEACHER_NAME_PLACEHOLDER)
    }

    /// Validates session invariants.
    pub fn validate(&self) -> Result<(), ClassSessionValidationError> {
        if self.name.trim().is_empty() {
            return Err(ClassSessionValidationError::EmptyName);
        }
        if self.access_code.trim().is_empty() {
            return Err(ClassSessionValidationError::EmptyAccessCode);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassSessionValidationError {
    EmptyName,
    EmptyAccessCode,
}

impl Display for ClassSessionValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "class session name must not be empty"),
            Self::EmptyAccessCode => write!(f, "class session access code must not be empty"),
        }
    }
}

impl Error for ClassSessionValidationError {}

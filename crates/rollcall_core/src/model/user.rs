//! Authenticated identity and derived role.
//!
//! # Responsibility
//! - Mirror the identity token handed out by the authentication provider.
//! - Define the closed set of roles core can derive from an identity.
//!
//! # Invariants
//! - Optional attributes are never unwrapped; every read site goes through
//!   an explicit fallback helper.
//! - `Role::Unknown` is both the initial and the logged-out role.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Placeholder used when neither display name nor email is available.
pub const STUDENT_NAME_PLACEHOLDER: &str = "Name not available";
/// Placeholder used when the identity carries no email.
pub const STUDENT_EMAIL_PLACEHOLDER: &str = "Email not available";

/// Identity observed from the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Provider-issued stable identifier.
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

impl User {
    /// Creates an identity with no optional attributes.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Returns the email when present and non-blank.
    pub fn email(&self) -> Option<&str> {
        non_blank(self.email.as_deref())
    }

    /// Returns the display name when present and non-blank.
    pub fn display_name(&self) -> Option<&str> {
        non_blank(self.display_name.as_deref())
    }

    /// Name shown on attendance records.
    ///
    /// Falls back to the email, then to [`STUDENT_NAME_PLACEHOLDER`].
    pub fn student_name(&self) -> &str {
        self.display_name()
            .or_else(|| self.email())
            .unwrap_or(STUDENT_NAME_PLACEHOLDER)
    }

    /// Email shown on attendance records, or [`STUDENT_EMAIL_PLACEHOLDER`].
    pub fn student_email(&self) -> &str {
        self.email().unwrap_or(STUDENT_EMAIL_PLACEHOLDER)
    }

    /// Per-session attendance key: the email, else the provider id.
    ///
    /// The `uid:` prefix keeps id-based keys apart from any email.
    pub fn attendance_key(&self) -> String {
        match self.email() {
            Some(email) => email.to_string(),
            None => format!("uid:{}", self.id),
        }
    }
}

/// Capability class of the current identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Teacher,
    #[default]
    Unknown,
}

impl Role {
    /// Stable string id used in config and log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Unknown => "unknown",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::{Role, User, STUDENT_EMAIL_PLACEHOLDER, STUDENT_NAME_PLACEHOLDER};

    #[test]
    fn student_name_prefers_display_name_then_email() {
        let full = User::new("u1")
            .with_display_name("Ana Rojas")
            .with_email("ana@school.test");
        assert_eq!(full.student_name(), "Ana Rojas");

        let email_only = User::new("u2").with_email("ana@school.test");
        assert_eq!(email_only.student_name(), "ana@school.test");
    }

    #[test]
    fn missing_and_blank_fields_fall_back_to_placeholders() {
        let bare = User::new("u3");
        assert_eq!(bare.student_name(), STUDENT_NAME_PLACEHOLDER);
        assert_eq!(bare.student_email(), STUDENT_EMAIL_PLACEHOLDER);

        let blank = User::new("u4").with_display_name("  ").with_email("");
        assert_eq!(blank.student_name(), STUDENT_NAME_PLACEHOLDER);
        assert_eq!(blank.student_email(), STUDENT_EMAIL_PLACEHOLDER);
    }

    #[test]
    fn attendance_key_prefers_email_then_id() {
        let with_email = User::new("u5").with_email("ana@school.test");
        assert_eq!(with_email.attendance_key(), "ana@school.test");

        assert_eq!(User::new("u6").attendance_key(), "uid:u6");
        assert_eq!(User::new("u7").with_email(" ").attendance_key(), "uid:u7");
    }

    #[test]
    fn role_defaults_to_unknown() {
        assert_eq!(Role::default(), Role::Unknown);
    }

    #[test]
    fn role_ids_round_trip_through_serde() {
        let role: Role = serde_json::from_str("\"teacher\"").expect("teacher");
        assert_eq!(role, Role::Teacher);
        assert_eq!(role.to_string(), "teacher");
        assert!(serde_json::from_str::<Role>("\"admin\"").is_err());
    }
}

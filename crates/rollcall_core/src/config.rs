//! Runtime configuration for role derivation, scanning and alerts.
//!
//! # Responsibility
//! - Load declarative settings from JSON.
//! - Validate settings before any flow is wired with them.
//!
//! # Invariants
//! - A config that passed `validate()` compiles into a working
//!   `EmailPatternPolicy` and a camera-only `ScanConfig`.
//! - Every field has a default, so `{}` is a valid document.

use crate::auth::role_policy::{EmailPatternPolicy, RolePatternError, RoleRule};
use crate::presenter::Alert;
use crate::scan::camera::{ScanConfig, ScanType};
use log::warn;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RollcallConfig {
    pub scan: ScanConfig,
    /// Ordered role rules; first match wins.
    pub roles: Vec<RoleRule>,
    pub routes: Routes,
    pub messages: Messages,
}

impl RollcallConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&raw)
    }

    /// Validates declaration-level invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan.fps == 0 {
            return Err(ConfigError::ZeroFps);
        }
        if self.scan.qrbox.width == 0 || self.scan.qrbox.height == 0 {
            return Err(ConfigError::EmptyQrBox);
        }
        if self.scan.scan_types != [ScanType::Camera] {
            return Err(ConfigError::UnsupportedScanTypes(self.scan.scan_types.clone()));
        }
        if self.routes.home.trim().is_empty() {
            return Err(ConfigError::EmptyRoute("home"));
        }
        self.role_policy()?;
        Ok(())
    }

    /// Compiles `roles` into a role policy.
    pub fn role_policy(&self) -> Result<EmailPatternPolicy, ConfigError> {
        let policy = EmailPatternPolicy::new(&self.roles).map_err(ConfigError::RolePattern)?;
        if policy.is_empty() {
            warn!("event=config_roles module=config status=empty every_role=unknown");
        }
        Ok(policy)
    }
}

/// Navigation targets used by core flows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Routes {
    /// Destination after sign-out.
    pub home: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            home: "/home".to_string(),
        }
    }
}

/// User-facing alert texts, one per terminal outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub missing_code: Alert,
    pub invalid_code: Alert,
    pub registered: Alert,
    pub already_registered: Alert,
    pub lookup_failed: Alert,
    pub write_failed: Alert,
    pub not_signed_in: Alert,
    pub permission_denied: Alert,
    pub camera_failed: Alert,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            missing_code: Alert::new("Error", "Please enter or scan the access code."),
            invalid_code: Alert::new("Error", "Invalid class code."),
            registered: Alert::new("Success", "Attendance registered successfully."),
            already_registered: Alert::new(
                "Already registered",
                "Your attendance for this class was already recorded.",
            ),
            lookup_failed: Alert::new("Error", "Could not look up the class. Please try again."),
            write_failed: Alert::new("Error", "Could not save your attendance. Please try again."),
            not_signed_in: Alert::new("Error", "Please sign in before registering attendance."),
            permission_denied: Alert::new(
                "Permission denied",
                "Please allow camera access in your settings.",
            ),
            camera_failed: Alert::new("Camera error", "The camera stopped before a code was read."),
        }
    }
}

/// Configuration load/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    ZeroFps,
    EmptyQrBox,
    UnsupportedScanTypes(Vec<ScanType>),
    EmptyRoute(&'static str),
    RolePattern(RolePatternError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::ZeroFps => write!(f, "scan.fps must be greater than zero"),
            Self::EmptyQrBox => write!(f, "scan.qrbox width and height must be non-zero"),
            Self::UnsupportedScanTypes(types) => {
                write!(f, "scan.scan_types must be exactly [camera], got {types:?}")
            }
            Self::EmptyRoute(name) => write!(f, "routes.{name} must not be empty"),
            Self::RolePattern(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::RolePattern(err) => Some(err),
            _ => None,
        }
    }
}

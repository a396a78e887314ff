//! Student check-in desk: manual and scan-triggered submissions.
//!
//! # Responsibility
//! - Hold the typed access code and the pending scan result.
//! - Submit the effective code for the signed-in student.
//! - Raise exactly one alert per submission outcome.
//!
//! # Invariants
//! - A pending scan result takes precedence over the typed code.
//! - A pending scan result is cleared once a registration consumed it
//!   (any outcome or a blank payload); store faults keep it for a retry.
//! - Locks are never held across an await point.

use crate::config::Messages;
use crate::model::user::User;
use crate::presenter::{Alert, Presenter};
use crate::repo::store::{AttendanceStore, ClassStore};
use crate::service::attendance_recorder::{AttendanceRecorder, Outcome, RegisterError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

/// Where the submitted code came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSource {
    Manual,
    Scan,
}

impl CodeSource {
    fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Scan => "scan",
        }
    }
}

/// Submission failure surfaced to callers after its alert was shown.
#[derive(Debug)]
pub enum CheckInError {
    NotSignedIn,
    Register(RegisterError),
}

impl Display for CheckInError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotSignedIn => write!(f, "no authenticated user"),
            Self::Register(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CheckInError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotSignedIn => None,
            Self::Register(err) => Some(err),
        }
    }
}

impl From<RegisterError> for CheckInError {
    fn from(value: RegisterError) -> Self {
        Self::Register(value)
    }
}

/// Registration front desk shared by the manual form and the scanner.
pub struct CheckInDesk<C: ClassStore, A: AttendanceStore> {
    recorder: AttendanceRecorder<C, A>,
    presenter: Arc<dyn Presenter>,
    messages: Messages,
    current_user: watch::Receiver<Option<User>>,
    typed_code: Mutex<String>,
    pending_scan: Mutex<Option<String>>,
}

impl<C: ClassStore, A: AttendanceStore> CheckInDesk<C, A> {
    /// Creates a desk following `current_user`, usually
    /// `RoleResolver::subscribe_user()`.
    pub fn new(
        recorder: AttendanceRecorder<C, A>,
        presenter: Arc<dyn Presenter>,
        messages: Messages,
        current_user: watch::Receiver<Option<User>>,
    ) -> Self {
        Self {
            recorder,
            presenter,
            messages,
            current_user,
            typed_code: Mutex::new(String::new()),
            pending_scan: Mutex::new(None),
        }
    }

    pub fn presenter(&self) -> &Arc<dyn Presenter> {
        &self.presenter
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Replaces the manually typed access code.
    pub fn set_typed_code(&self, code: impl Into<String>) {
        *lock(&self.typed_code) = code.into();
    }

    pub fn typed_code(&self) -> String {
        lock(&self.typed_code).clone()
    }

    /// Returns the decoded code awaiting registration, if any.
    pub fn pending_scan(&self) -> Option<String> {
        lock(&self.pending_scan).clone()
    }

    /// Stores a decoded code and submits it immediately.
    pub async fn accept_scan(&self, code: String) -> Result<Outcome, CheckInError> {
        *lock(&self.pending_scan) = Some(code);
        self.submit().await
    }

    /// Submits the effective code for the signed-in student.
    ///
    /// # Contract
    /// - Exactly one alert is shown, whatever the result.
    /// - Errors are returned after their alert was shown.
    pub async fn submit(&self) -> Result<Outcome, CheckInError> {
        let (code, source) = match self.pending_scan() {
            Some(code) => (code, CodeSource::Scan),
            None => (self.typed_code(), CodeSource::Manual),
        };

        let user = self.current_user.borrow().clone();
        let Some(user) = user else {
            warn!(
                "event=check_in module=service status=not_signed_in source={}",
                source.as_str()
            );
            self.alert(&self.messages.not_signed_in);
            return Err(CheckInError::NotSignedIn);
        };

        let result = self.recorder.register(&code, &user).await;
        let alert = match &result {
            Ok(Outcome::Registered(_)) => &self.messages.registered,
            Ok(Outcome::AlreadyRegistered(_)) => &self.messages.already_registered,
            Ok(Outcome::InvalidCode) => &self.messages.invalid_code,
            Err(RegisterError::EmptyCode) => &self.messages.missing_code,
            Err(RegisterError::LookupFailed(_)) => &self.messages.lookup_failed,
            Err(RegisterError::WriteFailed(_)) => &self.messages.write_failed,
        };

        let retryable = matches!(
            result,
            Err(RegisterError::LookupFailed(_) | RegisterError::WriteFailed(_))
        );
        if source == CodeSource::Scan && !retryable {
            self.clear_pending_if(&code);
        }
        info!(
            "event=check_in module=service status={} source={}",
            if result.is_ok() { "ok" } else { "error" },
            source.as_str()
        );
        self.alert(alert);

        result.map_err(CheckInError::from)
    }

    fn clear_pending_if(&self, consumed: &str) {
        let mut pending = lock(&self.pending_scan);
        if pending.as_deref() == Some(consumed) {
            *pending = None;
        }
    }

    fn alert(&self, alert: &Alert) {
        self.presenter.show_alert(alert);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

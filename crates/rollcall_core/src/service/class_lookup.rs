//! Access-code to class-session lookup.
//!
//! # Responsibility
//! - Reject blank codes before any store round trip.
//! - Resolve a code to at most one class session.
//!
//! # Invariants
//! - Store faults surface as `LookupError::LookupFailed`, never as `None`.
//! - Duplicate codes resolve to the first session in store order.

use crate::logging::mask_code;
use crate::model::class_session::ClassSession;
use crate::repo::store::{ClassStore, StoreError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Lookup failure.
#[derive(Debug)]
pub enum LookupError {
    /// Code was empty or whitespace-only.
    EmptyCode,
    LookupFailed(StoreError),
}

impl Display for LookupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCode => write!(f, "access code must not be empty"),
            Self::LookupFailed(err) => write!(f, "class lookup failed: {err}"),
        }
    }
}

impl Error for LookupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyCode => None,
            Self::LookupFailed(err) => Some(err),
        }
    }
}

/// Trims `code` and rejects blank input.
pub fn normalize_code(code: &str) -> Result<&str, LookupError> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return Err(LookupError::EmptyCode);
    }
    Ok(trimmed)
}

/// Class-session query service.
pub struct ClassLookup<C: ClassStore> {
    store: C,
}

impl<C: ClassStore> ClassLookup<C> {
    pub fn new(store: C) -> Self {
        Self { store }
    }

    /// Finds the session whose access code equals `code`.
    ///
    /// # Errors
    /// - `EmptyCode` before any store access for blank input.
    /// - `LookupFailed` when the store query faults.
    pub async fn find_session_by_code(
        &self,
        code: &str,
    ) -> Result<Option<ClassSession>, LookupError> {
        let code = normalize_code(code)?;
        let started_at = Instant::now();

        let sessions = self.store.find_by_access_code(code).await.map_err(|err| {
            error!(
                "event=class_lookup module=service status=error code={} duration_ms={} error={}",
                mask_code(code),
                started_at.elapsed().as_millis(),
                err
            );
            LookupError::LookupFailed(err)
        })?;

        if sessions.len() > 1 {
            warn!(
                "event=class_lookup module=service status=duplicate_code code={} matches={}",
                mask_code(code),
                sessions.len()
            );
        }
        info!(
            "event=class_lookup module=service status=ok code={} found={} duration_ms={}",
            mask_code(code),
            !sessions.is_empty(),
            started_at.elapsed().as_millis()
        );

        Ok(sessions.into_iter().next())
    }
}

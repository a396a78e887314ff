//! Presentation surface consumed by core flows.
//!
//! # Responsibility
//! - Abstract alert dialogs and route navigation owned by the session shell.
//!
//! # Invariants
//! - Core raises exactly one alert per terminal registration or scan outcome.

use serde::{Deserialize, Serialize};

/// User-facing alert content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub body: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Session-shell capabilities used by core.
///
/// Implementations must return quickly; presentation happens asynchronously
/// on the shell side.
pub trait Presenter: Send + Sync {
    fn show_message(&self, title: &str, body: &str);

    fn navigate(&self, route: &str);

    fn show_alert(&self, alert: &Alert) {
        self.show_message(&alert.title, &alert.body);
    }
}

impl<T: Presenter + ?Sized> Presenter for std::sync::Arc<T> {
    fn show_message(&self, title: &str, body: &str) {
        (**self).show_message(title, body);
    }

    fn navigate(&self, route: &str) {
        (**self).navigate(route);
    }
}

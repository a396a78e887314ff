//! Authentication-provider seam and role resolution.
//!
//! # Responsibility
//! - Define the provider contract core consumes (state stream + sign-out).
//! - Host the role policy and the resolver broadcasting the current role.
//!
//! # Invariants
//! - Core never creates or destroys identities; it only observes them.

pub mod role_policy;
pub mod role_resolver;

use crate::model::user::User;
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Authentication-state events in provider order; `None` means signed out.
pub type AuthStateStream = BoxStream<'static, Option<User>>;

/// External authentication provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Subscribes to authentication-state changes.
    fn auth_state(&self) -> AuthStateStream;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Provider-side failure, e.g. a sign-out request that did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthError {
    pub message: String,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "authentication provider error: {}", self.message)
    }
}

impl Error for AuthError {}

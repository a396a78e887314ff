//! Reactive role resolution.
//!
//! # Responsibility
//! - Turn each authentication-state event into exactly one role emission.
//! - Broadcast the latest role and identity to any number of readers.
//!
//! # Invariants
//! - The resolver is the only writer of both broadcast cells.
//! - Events are applied one at a time, in delivery order.
//! - New subscribers observe the current value immediately.
//! - `Role::Unknown` is the initial value and the value after sign-out.

use crate::auth::role_policy::RolePolicy;
use crate::auth::AuthStateStream;
use crate::model::user::{Role, User};
use futures_util::StreamExt;
use log::{debug, info};
use std::sync::Arc;
use tokio::sync::watch;

/// Single-writer, multi-reader role broadcaster.
pub struct RoleResolver {
    policy: Arc<dyn RolePolicy>,
    role_tx: watch::Sender<Role>,
    user_tx: watch::Sender<Option<User>>,
}

impl RoleResolver {
    pub fn new(policy: Arc<dyn RolePolicy>) -> Self {
        let (role_tx, _) = watch::channel(Role::Unknown);
        let (user_tx, _) = watch::channel(None);
        Self {
            policy,
            role_tx,
            user_tx,
        }
    }

    /// Returns the role current at this instant.
    pub fn current(&self) -> Role {
        *self.role_tx.borrow()
    }

    /// Subscribes to role changes; `borrow()` yields the current role at once.
    pub fn subscribe(&self) -> watch::Receiver<Role> {
        self.role_tx.subscribe()
    }

    /// Returns the identity the current role was derived from.
    pub fn current_user(&self) -> Option<User> {
        self.user_tx.borrow().clone()
    }

    /// Subscribes to the identity the current role was derived from.
    pub fn subscribe_user(&self) -> watch::Receiver<Option<User>> {
        self.user_tx.subscribe()
    }

    /// Applies one authentication-state event and returns the emitted role.
    ///
    /// Every call notifies subscribers, even when the role is unchanged, so
    /// no intermediate event is coalesced away at the source.
    pub fn apply(&self, state: Option<User>) -> Role {
        let role = match &state {
            Some(user) => self.policy.derive(user),
            None => Role::Unknown,
        };
        let signed_in = state.is_some();

        self.user_tx.send_replace(state);
        let previous = self.role_tx.send_replace(role);

        if previous == role {
            debug!("event=role_emit module=auth role={role} signed_in={signed_in} changed=false");
        } else {
            info!("event=role_emit module=auth role={role} previous={previous} signed_in={signed_in}");
        }
        role
    }

    /// Emits `Role::Unknown` and clears the identity ahead of sign-out.
    pub fn force_unknown(&self) {
        info!("event=role_reset module=auth role=unknown");
        self.apply(None);
    }

    /// Consumes an authentication-state stream until it ends.
    ///
    /// Returns the number of events applied.
    pub async fn run(&self, mut states: AuthStateStream) -> usize {
        let mut applied = 0;
        while let Some(state) = states.next().await {
            self.apply(state);
            applied += 1;
        }
        info!("event=auth_stream_end module=auth events={applied}");
        applied
    }
}

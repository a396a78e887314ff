//! Sign-out sequencing for the session shell.
//!
//! # Invariants
//! - `Role::Unknown` is emitted before the provider is asked to sign out and
//!   before any navigation, so no view renders a stale role.
//! - A sign-out the provider rejects leaves the previous identity and role
//!   in place.

use crate::auth::role_resolver::RoleResolver;
use crate::auth::{AuthError, AuthProvider};
use crate::config::Routes;
use crate::presenter::Presenter;
use log::{error, info};

/// Signs the current identity out and returns the shell to the home route.
///
/// Navigation only happens once the provider confirmed the sign-out.
pub async fn sign_out(
    auth: &dyn AuthProvider,
    resolver: &RoleResolver,
    presenter: &dyn Presenter,
    routes: &Routes,
) -> Result<(), AuthError> {
    let previous = resolver.current_user();
    resolver.force_unknown();

    if let Err(err) = auth.sign_out().await {
        error!("event=sign_out module=service status=error error={err}");
        resolver.apply(previous);
        return Err(err);
    }

    presenter.navigate(&routes.home);
    info!("event=sign_out module=service status=ok route={}", routes.home);
    Ok(())
}

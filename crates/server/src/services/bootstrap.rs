//! Startup bootstrap of the first admin account.

use secrecy::ExposeSecret;

use helpdesk_core::Role;

use crate::config::DefaultAdminConfig;
use crate::db::Store;
use crate::services::auth::{AuthError, PasswordHasher, create_account};

/// What [`ensure_default_admin`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// An admin already existed.
    AlreadyPresent,
    /// No admin existed and no default admin is configured.
    NotConfigured,
    /// The configured default admin was created.
    Created,
}

/// Create the configured default admin when the roster is empty.
///
/// Without any admin every ticket creation fails, so a fresh deployment can
/// seed one from `DEFAULT_ADMIN_*`.
///
/// # Errors
///
/// Returns `AuthError` if the store cannot be read or the account is rejected.
pub async fn ensure_default_admin(
    store: &dyn Store,
    hasher: &dyn PasswordHasher,
    default_admin: Option<&DefaultAdminConfig>,
) -> Result<BootstrapOutcome, AuthError> {
    if store.admin_exists().await? {
        return Ok(BootstrapOutcome::AlreadyPresent);
    }

    let Some(admin) = default_admin else {
        tracing::warn!("No admin account exists and DEFAULT_ADMIN_* is not set; ticket creation will fail");
        return Ok(BootstrapOutcome::NotConfigured);
    };

    let user = create_account(
        store,
        hasher,
        &admin.name,
        &admin.email,
        admin.password.expose_secret(),
        Role::Admin,
    )
    .await?;

    tracing::info!(user_id = %user.id, email = %user.email, "Created default admin");
    Ok(BootstrapOutcome::Created)
}

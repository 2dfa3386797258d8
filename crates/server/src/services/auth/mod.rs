//! Authentication service.
//!
//! Password registration and login, access token issuance, and bearer token
//! verification. Hashing and token signing sit behind the [`PasswordHasher`]
//! and [`TokenService`] traits.

mod error;
mod password;
mod token;

pub use error::AuthError;
pub use password::{Argon2Hasher, PasswordHasher};
pub use token::{Claims, JwtTokenService, TokenService};

use helpdesk_core::{Email, Role};

use crate::db::{RepositoryError, Store};
use crate::models::{AuthResponse, CurrentUser, NewUser, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Validate and store a new account.
///
/// Shared by public registration, startup bootstrap, and the CLI. Role
/// policy is the caller's concern.
///
/// # Errors
///
/// Returns `AuthError::InvalidName`, `AuthError::InvalidEmail` or
/// `AuthError::WeakPassword` for bad input.
/// Returns `AuthError::UserAlreadyExists` if the email is already registered.
pub async fn create_account(
    store: &dyn Store,
    hasher: &dyn PasswordHasher,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> Result<User, AuthError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuthError::InvalidName);
    }
    let email = Email::parse(email)?;
    validate_password(password)?;

    let password_hash = hasher.hash(password)?;

    store
        .create_user(NewUser {
            name: name.to_owned(),
            email,
            password_hash,
            role,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })
}

/// Authentication service.
pub struct AuthService<'a> {
    store: &'a dyn Store,
    hasher: &'a dyn PasswordHasher,
    tokens: &'a dyn TokenService,
    allow_admin_signup: bool,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        store: &'a dyn Store,
        hasher: &'a dyn PasswordHasher,
        tokens: &'a dyn TokenService,
        allow_admin_signup: bool,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            allow_admin_signup,
        }
    }

    /// Register a new account and sign it in.
    ///
    /// `role` defaults to `CUSTOMER`. An `ADMIN` role is only accepted when
    /// admin signup is enabled, which it is not by default.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AdminSignupDisabled` when asking for `ADMIN` while
    /// admin signup is off, plus everything [`create_account`] returns.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Option<Role>,
    ) -> Result<AuthResponse, AuthError> {
        let role = role.unwrap_or(Role::Customer);
        if role == Role::Admin && !self.allow_admin_signup {
            return Err(AuthError::AdminSignupDisabled);
        }

        let user = create_account(self.store, self.hasher, name, email, password, role).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "Registered user");

        self.respond(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        // A malformed email can't belong to anyone.
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .store
            .get_user_with_password(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        self.hasher.verify(password, &password_hash)?;

        self.respond(user)
    }

    /// Resolve a bearer token to the calling user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token does not verify.
    pub fn authenticate(&self, token: &str) -> Result<CurrentUser, AuthError> {
        self.tokens.verify(token)
    }

    fn respond(&self, user: User) -> Result<AuthResponse, AuthError> {
        let token = self.tokens.issue(user.id, user.role)?;
        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

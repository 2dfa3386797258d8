//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::HelpdeskConfig;
use crate::db::Store;
use crate::services::auth::{Argon2Hasher, JwtTokenService, PasswordHasher, TokenService};
use crate::services::{AuthService, TicketService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the store and auth capabilities.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: HelpdeskConfig,
    store: Arc<dyn Store>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
}

impl AppState {
    /// Create application state with Argon2id hashing and JWT access tokens.
    #[must_use]
    pub fn new(config: HelpdeskConfig, store: Arc<dyn Store>) -> Self {
        let tokens = JwtTokenService::new(&config.auth.jwt_secret, config.auth.token_ttl);
        Self::from_parts(
            config,
            store,
            Arc::new(Argon2Hasher::default()),
            Arc::new(tokens),
        )
    }

    /// Create application state from explicit capabilities.
    #[must_use]
    pub fn from_parts(
        config: HelpdeskConfig,
        store: Arc<dyn Store>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                hasher,
                tokens,
            }),
        }
    }

    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    #[must_use]
    pub fn hasher(&self) -> &dyn PasswordHasher {
        self.inner.hasher.as_ref()
    }

    #[must_use]
    pub fn tokens(&self) -> &dyn TokenService {
        self.inner.tokens.as_ref()
    }

    /// Authentication service bound to this state.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(
            self.store(),
            self.hasher(),
            self.tokens(),
            self.inner.config.auth.allow_admin_signup,
        )
    }

    /// Ticket service bound to this state.
    #[must_use]
    pub fn tickets(&self) -> TicketService<'_> {
        TicketService::new(self.store())
    }
}

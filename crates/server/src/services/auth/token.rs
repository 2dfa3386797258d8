//! Signed access tokens.
//!
//! Tokens are HS256 JWTs carrying the user id (`sub`) and role. They are
//! stateless: there is no server-side revocation list, so a token stays
//! valid until `exp`.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use helpdesk_core::{Role, UserId};

use super::AuthError;
use crate::models::CurrentUser;

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    pub role: Role,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Issues and verifies access tokens.
pub trait TokenService: Send + Sync {
    /// Issue a token for a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if the token cannot be signed.
    fn issue(&self, user_id: UserId, role: Role) -> Result<String, AuthError>;

    /// Verify a token and recover the caller.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for malformed, expired or forged tokens.
    fn verify(&self, token: &str) -> Result<CurrentUser, AuthError>;
}

/// HMAC-SHA256 JWT implementation.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
}

impl JwtTokenService {
    #[must_use]
    pub fn new(secret: &SecretString, ttl: TimeDelta) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            validation,
            ttl,
        }
    }
}

impl std::fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user_id: UserId, role: Role) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::TokenSigning)
    }

    fn verify(&self, token: &str) -> Result<CurrentUser, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Rejected access token");
            AuthError::InvalidToken
        })?;

        let id = data
            .claims
            .sub
            .parse::<UserId>()
            .map_err(|_| AuthError::InvalidToken)?;

        Ok(CurrentUser {
            id,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service(secret: &str, ttl: TimeDelta) -> JwtTokenService {
        JwtTokenService::new(&SecretString::from(secret.to_owned()), ttl)
    }

    #[test]
    fn test_issued_token_verifies() {
        let tokens = service("k3y-for-tests-with-enough-length!", TimeDelta::hours(24));
        let token = tokens.issue(UserId::new(12), Role::Admin).unwrap();

        let user = tokens.verify(&token).unwrap();
        assert_eq!(user.id, UserId::new(12));
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let issuer = service("first-signing-key-0123456789abcdef", TimeDelta::hours(1));
        let verifier = service("second-signing-key-0123456789abcde", TimeDelta::hours(1));
        let token = issuer.issue(UserId::new(1), Role::Customer).unwrap();

        assert!(matches!(
            verifier.verify(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Past the default 60s leeway.
        let tokens = service("k3y-for-tests-with-enough-length!", TimeDelta::minutes(-5));
        let token = tokens.issue(UserId::new(1), Role::Customer).unwrap();

        assert!(matches!(tokens.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let tokens = service("k3y-for-tests-with-enough-length!", TimeDelta::hours(1));
        assert!(matches!(
            tokens.verify("not.a.jwt"),
            Err(AuthError::InvalidToken)
        ));
    }
}

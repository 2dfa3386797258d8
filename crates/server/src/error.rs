//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Every error body is JSON of the form `{"message": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::{AuthError, TicketError};

/// Application-level error type for the helpdesk API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Ticket operation failed.
    #[error("Ticket error: {0}")]
    Ticket(#[from] TicketError),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::InvalidToken => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) | AuthError::InvalidName => {
                    StatusCode::BAD_REQUEST
                }
                AuthError::AdminSignupDisabled => StatusCode::FORBIDDEN,
                AuthError::TokenSigning(_) | AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Ticket(err) => match err {
                TicketError::OnlyCustomers | TicketError::AccessDenied => StatusCode::FORBIDDEN,
                TicketError::NotFound => StatusCode::NOT_FOUND,
                TicketError::Validation(_) => StatusCode::BAD_REQUEST,
                TicketError::NoAdminAvailable => StatusCode::SERVICE_UNAVAILABLE,
                TicketError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    /// Client-facing message. Internal details are never exposed.
    #[must_use]
    pub fn message(&self) -> String {
        if self.status().is_server_error() && !self.is_no_admin() {
            return "Internal server error".to_string();
        }

        match self {
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::InvalidToken => "Invalid or expired token".to_string(),
                AuthError::UserAlreadyExists => "Email already registered".to_string(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(e) => format!("Invalid email address: {e}"),
                AuthError::InvalidName => "Name is required".to_string(),
                AuthError::AdminSignupDisabled => {
                    "Registering as an admin is disabled".to_string()
                }
                _ => "Authentication error".to_string(),
            },
            Self::Ticket(err) => match err {
                TicketError::OnlyCustomers => "Only customers can create tickets".to_string(),
                TicketError::AccessDenied => "Access denied".to_string(),
                TicketError::NotFound => "Ticket not found".to_string(),
                TicketError::Validation(msg) => msg.clone(),
                TicketError::NoAdminAvailable => "No admin available".to_string(),
                TicketError::Repository(_) => "Internal server error".to_string(),
            },
            Self::Unauthorized(msg) => msg.clone(),
        }
    }

    const fn is_no_admin(&self) -> bool {
        matches!(self, Self::Ticket(TicketError::NoAdminAvailable))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() && !self.is_no_admin() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody {
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("tickets", "Created ticket", Some(&[("ticket_id", "42")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::RepositoryError;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_unauthorized_passes_message_through() {
        let err = AppError::Unauthorized("Missing bearer token".to_string());
        assert_eq!(err.to_string(), "Unauthorized: Missing bearer token");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.message(), "Missing bearer token");
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(
            get_status(AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AuthError::UserAlreadyExists.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AuthError::AdminSignupDisabled.into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AuthError::WeakPassword("short".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_ticket_error_status_codes() {
        assert_eq!(
            get_status(TicketError::OnlyCustomers.into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(TicketError::AccessDenied.into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(get_status(TicketError::NotFound.into()), StatusCode::NOT_FOUND);
        assert_eq!(
            get_status(TicketError::NoAdminAvailable.into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Auth(AuthError::Repository(RepositoryError::DataCorruption(
            "invalid email in database".to_string(),
        )));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Internal server error");

        let err = AppError::Ticket(TicketError::Repository(RepositoryError::NotFound));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Internal server error");
    }

    #[test]
    fn test_no_admin_message_is_visible() {
        let err = AppError::Ticket(TicketError::NoAdminAvailable);
        assert_eq!(err.message(), "No admin available");
    }
}

//! Registration and login handlers.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest};
use crate::state::AppState;

/// Create an account and return an access token for it.
///
/// `POST /api/auth/register`
///
/// `role` is optional and defaults to `CUSTOMER`. Asking for `ADMIN` is
/// answered with 403 unless `HELPDESK_ALLOW_ADMIN_SIGNUP=true`; admins are
/// otherwise created by the `DEFAULT_ADMIN_*` bootstrap or `hd-cli admin create`.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let response = state
        .auth()
        .register(&body.name, &body.email, &body.password, body.role)
        .await?;

    add_breadcrumb("auth", "Registered", None);
    Ok((StatusCode::CREATED, Json(response)))
}

/// Exchange email and password for an access token.
///
/// `POST /api/auth/login`
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let response = state.auth().login(&body.email, &body.password).await?;

    tracing::info!(user_id = %response.user.id, "User logged in");
    Ok(Json(response))
}

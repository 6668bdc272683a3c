use axum::{
    extract::{Extension, State},
    Json,
};
use secrecy::ExposeSecret;
use serde_json::{json, Value};

use crate::{
    error::Result,
    middleware::auth::AuthenticatedAccount,
    models::accounts::{AccountProfile, ChangePasswordRequest, LoginRequest, LoginResult},
    services::accounts,
    state::AppState,
};

/// POST /api/auth/login
///
/// Authenticates a username/password pair.
///
/// # Request Body
/// - `username`: Account username (exact match)
/// - `password`: Account password
///
/// # Returns
/// JSON response containing `token` (bearer token valid for 24 hours) and
/// `user` (`id`, `username`, `email`).
///
/// # HTTP Status Codes
/// - `200 OK`: Authentication successful
/// - `400 BAD_REQUEST`: Missing username or password
/// - `401 UNAUTHORIZED`: Invalid credentials or inactive account
/// - `500 INTERNAL_SERVER_ERROR`: Store error
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResult>> {
    let result = accounts::login(
        state.store.as_ref(),
        request,
        state.jwt_secret.expose_secret(),
        state.jwt_expiration_hours,
    )
    .await?;

    Ok(Json(result))
}

/// GET /api/auth/me
///
/// Returns the authenticated account without its password hash.
pub async fn me(
    State(state): State<AppState>,
    Extension(account): Extension<AuthenticatedAccount>,
) -> Result<Json<AccountProfile>> {
    let profile = accounts::get_profile(state.store.as_ref(), account.id).await?;
    Ok(Json(profile))
}

/// PUT /api/auth/change-password
///
/// # Request Body
/// - `currentPassword`: Must match the stored password
/// - `newPassword`: At least 6 characters
///
/// # HTTP Status Codes
/// - `200 OK`: `{"message": "Password updated successfully"}`
/// - `400 BAD_REQUEST`: Wrong current password or too short new password
/// - `401 UNAUTHORIZED`: Missing or invalid token
/// - `404 NOT_FOUND`: Account vanished after authentication
pub async fn change_password(
    State(state): State<AppState>,
    Extension(account): Extension<AuthenticatedAccount>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<Value>> {
    accounts::change_password(state.store.as_ref(), account.id, request).await?;

    Ok(Json(json!({
        "message": "Password updated successfully"
    })))
}

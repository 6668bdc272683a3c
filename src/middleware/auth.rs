//! Bearer token authentication middleware
//!
//! Every failure on this path (missing header, bad signature, expired token,
//! unknown or deactivated account) produces the same 401 response.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use secrecy::ExposeSecret;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::Result,
    models::accounts::Account,
    services::jwt::{authenticate_bearer, unauthorized},
    state::AppState,
};

/// Authenticated account extracted from the bearer token
///
/// Added to request extensions by [`auth_middleware`].
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedAccount {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<Account> for AuthenticatedAccount {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
        }
    }
}

/// Bearer token authentication middleware
///
/// Verifies the `Authorization: Bearer <token>` header, loads the account the
/// token was issued for and requires it to be active. Apply with `route_layer()`:
///
/// ```ignore
/// Router::new()
///     .route("/me", get(me))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
/// ```
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let auth_header = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok());
    let account_id = authenticate_bearer(auth_header, state.jwt_secret.expose_secret())?;

    let account = match state.store.find_account_by_id(account_id).await? {
        Some(account) if account.is_active => account,
        _ => {
            tracing::debug!(account_id = %account_id, "Token subject is unknown or inactive");
            return Err(unauthorized());
        }
    };

    request
        .extensions_mut()
        .insert(AuthenticatedAccount::from(account));
    Ok(next.run(request).await)
}

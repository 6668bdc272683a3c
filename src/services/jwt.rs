use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default token lifetime
pub const DEFAULT_EXPIRATION_HOURS: i64 = 24;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - account id as string
    pub sub: String,
    /// Expiration time as Unix timestamp
    pub exp: i64,
    /// Issued at time as Unix timestamp
    pub iat: i64,
}

/// A freshly signed bearer token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs a bearer token for an account
///
/// # Arguments
/// * `account_id` - The account's UUID
/// * `secret` - The JWT secret key for signing
/// * `expiration_hours` - Token lifetime in hours (from config)
///
/// # Example
/// ```rust
/// use customer_manager::services::jwt::{issue_token, verify_token};
/// use uuid::Uuid;
///
/// let account_id = Uuid::now_v7();
/// let issued = issue_token(account_id, "my-secret", 24)?;
/// assert_eq!(verify_token(&issued.token, "my-secret")?, account_id);
/// # Ok::<(), customer_manager::error::Error>(())
/// ```
pub fn issue_token(account_id: Uuid, secret: &str, expiration_hours: i64) -> Result<IssuedToken> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(expiration_hours);

    let claims = Claims {
        sub: account_id.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| Error::Internal(format!("Failed to generate JWT: {}", e)))?;

    Ok(IssuedToken { token, expires_at })
}

/// Verifies a token and returns the account id it was issued for.
///
/// Bad signatures, malformed payloads and elapsed expiry all fail with
/// `Error::Authentication`; the reason is logged, not returned.
pub fn verify_token(token: &str, secret: &str) -> Result<Uuid> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &validation)
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            unauthorized()
        })?;

    Uuid::parse_str(&token_data.claims.sub).map_err(|_| unauthorized())
}

/// Validates the `Authorization: Bearer <token>` header value and returns the account id.
pub fn authenticate_bearer(auth_header: Option<&str>, secret: &str) -> Result<Uuid> {
    let token = extract_token_from_header(auth_header)?;
    verify_token(token, secret)
}

/// The single external signal for every authentication failure.
pub fn unauthorized() -> Error {
    Error::Authentication("Not authorized".to_string())
}

/// Extracts the Bearer token from the Authorization header
fn extract_token_from_header(auth_header: Option<&str>) -> Result<&str> {
    match auth_header.and_then(|header| header.strip_prefix("Bearer ")) {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(unauthorized()),
    }
}

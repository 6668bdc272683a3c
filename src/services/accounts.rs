use crate::{
    error::{Error, Result},
    models::accounts::{
        Account, AccountProfile, AccountSummary, ChangePasswordRequest, LoginRequest, LoginResult,
        NewAccount,
    },
    services::jwt,
    store::AccountStore,
    validation::{normalize_email, validate_change_password, validate_login, MIN_PASSWORD_LENGTH},
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::LazyLock;
use uuid::Uuid;

/// Hash checked when no usable account matches a login, so a rejected
/// username costs the same Argon2 work as a wrong password.
static DUMMY_PASSWORD_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("unused-dummy-password").ok());

/// Hashes a password with Argon2 using a random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))
}

/// Verifies a password against a password hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| Error::Internal(format!("Invalid password hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(Error::Internal(format!("Password verification failed: {}", e))),
    }
}

/// Runs a password verification whose outcome is discarded.
fn verify_against_dummy_hash(password: &str) {
    if let Some(hash) = DUMMY_PASSWORD_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

/// Creates an account with a hashed password. Used by seeding only.
pub async fn create_account<S: AccountStore + ?Sized>(
    store: &S,
    username: &str,
    email: &str,
    password: &str,
) -> Result<Account> {
    let username = username.trim();
    if username.is_empty() {
        return Err(Error::validation("username", "Username is required"));
    }
    let email = normalize_email(email).map_err(|message| Error::validation("email", message))?;
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::validation(
            "password",
            "Password must be at least 6 characters",
        ));
    }

    store
        .insert_account(NewAccount {
            username: username.to_string(),
            email,
            password_hash: hash_password(password)?,
        })
        .await
}

/// Authenticates a username/password pair and issues a bearer token.
///
/// Unknown usernames, inactive accounts and wrong passwords give the same
/// error, and each of them pays for one Argon2 verification.
pub async fn login<S: AccountStore + ?Sized>(
    store: &S,
    request: LoginRequest,
    secret: &str,
    expiration_hours: i64,
) -> Result<LoginResult> {
    validate_login(&request)?;

    let invalid_credentials = || Error::Authentication("Invalid credentials".to_string());

    let account = match store.find_account_by_username(&request.username).await? {
        Some(account) if account.is_active => account,
        _ => {
            verify_against_dummy_hash(&request.password);
            tracing::warn!(username = %request.username, "Login rejected: unknown or inactive account");
            return Err(invalid_credentials());
        }
    };

    if !verify_password(&request.password, &account.password_hash)? {
        tracing::warn!(account_id = %account.id, "Login rejected: wrong password");
        return Err(invalid_credentials());
    }

    let issued = jwt::issue_token(account.id, secret, expiration_hours)?;
    tracing::info!(account_id = %account.id, expires_at = %issued.expires_at, "Login succeeded");

    Ok(LoginResult {
        token: issued.token,
        user: AccountSummary {
            id: account.id,
            username: account.username,
            email: account.email,
        },
    })
}

/// Loads the profile of the authenticated account.
pub async fn get_profile<S: AccountStore + ?Sized>(store: &S, account_id: Uuid) -> Result<AccountProfile> {
    store
        .find_account_by_id(account_id)
        .await?
        .map(AccountProfile::from)
        .ok_or_else(|| Error::NotFound("User not found".to_string()))
}

/// Replaces the password after checking the current one.
pub async fn change_password<S: AccountStore + ?Sized>(
    store: &S,
    account_id: Uuid,
    request: ChangePasswordRequest,
) -> Result<()> {
    validate_change_password(&request)?;

    let account = store
        .find_account_by_id(account_id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    if !verify_password(&request.current_password, &account.password_hash)? {
        return Err(Error::validation(
            "currentPassword",
            "Current password is incorrect",
        ));
    }

    let password_hash = hash_password(&request.new_password)?;
    store.update_account_password(account.id, &password_hash).await?;

    tracing::info!(account_id = %account.id, "Password changed");
    Ok(())
}

//! Input validation for the service layer.
//!
//! Every validator is a pure function over typed input. Customer and credential
//! validators collect all field errors before returning, so clients get the
//! complete list in one response.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;

use crate::{
    error::{Error, FieldErrors, Result},
    models::{
        accounts::{ChangePasswordRequest, LoginRequest},
        customers::{CustomerFields, CustomerForm},
    },
};

/// Minimum password length for login and password changes
pub const MIN_PASSWORD_LENGTH: usize = 6;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("valid email regex")
});

static CONTACT_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9][0-9]{0,15}$").expect("valid contact number regex"));

/// Trims and lowercases an email, then checks its shape.
///
/// # Examples
/// ```
/// use customer_manager::validation::normalize_email;
///
/// assert_eq!(normalize_email("  Jane@Example.COM ").unwrap(), "jane@example.com");
/// assert!(normalize_email("invalid-email").is_err());
/// ```
pub fn normalize_email(email: &str) -> std::result::Result<String, &'static str> {
    let email = email.trim().to_lowercase();

    if email.is_empty() || email.len() > 254 || !EMAIL_RE.is_match(&email) {
        return Err("Please provide a valid email");
    }

    Ok(email)
}

/// Trims a contact number and checks it against `+?[1-9][0-9]{0,15}`. Only ASCII digits count.
pub fn normalize_contact_number(number: &str) -> std::result::Result<String, &'static str> {
    let number = number.trim();

    if !CONTACT_NUMBER_RE.is_match(number) {
        return Err("Please provide a valid contact number");
    }

    Ok(number.to_string())
}

/// Parses an ISO 8601 date (`1990-05-01`) or timestamp (`1990-05-01T00:00:00Z`)
/// and rejects dates after `today`. A date of `today` is accepted since its
/// midnight has already passed.
pub fn parse_date_of_birth(value: &str, today: NaiveDate) -> std::result::Result<NaiveDate, &'static str> {
    let value = value.trim();

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
        .ok_or("Please provide a valid date of birth")?;

    if date > today {
        return Err("Date of birth must be in the past");
    }

    Ok(date)
}

/// Trims `value` and checks its length in characters.
fn trimmed_between(value: &str, min: usize, max: usize) -> Option<String> {
    let value = value.trim();
    let len = value.chars().count();
    (min..=max).contains(&len).then(|| value.to_string())
}

/// Validates a submitted customer form into normalized fields.
///
/// `today` is the date the date-of-birth check is evaluated against.
pub fn validate_customer_form(form: &CustomerForm, today: NaiveDate) -> Result<CustomerFields> {
    let mut errors = FieldErrors::new();

    let full_name = trimmed_between(form.full_name.as_deref().unwrap_or(""), 2, 100);
    if full_name.is_none() {
        errors.add("fullName", "Full name must be between 2 and 100 characters");
    }

    let email = match normalize_email(form.email.as_deref().unwrap_or("")) {
        Ok(email) => Some(email),
        Err(message) => {
            errors.add("email", message);
            None
        }
    };

    let contact_number = match normalize_contact_number(form.contact_number.as_deref().unwrap_or("")) {
        Ok(number) => Some(number),
        Err(message) => {
            errors.add("contactNumber", message);
            None
        }
    };

    let date_of_birth = match parse_date_of_birth(form.date_of_birth.as_deref().unwrap_or(""), today) {
        Ok(date) => Some(date),
        Err(message) => {
            errors.add("dateOfBirth", message);
            None
        }
    };

    let state = trimmed_between(form.state.as_deref().unwrap_or(""), 2, 50);
    if state.is_none() {
        errors.add("state", "State must be between 2 and 50 characters");
    }

    let city = trimmed_between(form.city.as_deref().unwrap_or(""), 2, 50);
    if city.is_none() {
        errors.add("city", "City must be between 2 and 50 characters");
    }

    errors.into_result()?;

    match (full_name, email, contact_number, date_of_birth, state, city) {
        (Some(full_name), Some(email), Some(contact_number), Some(date_of_birth), Some(state), Some(city)) => {
            Ok(CustomerFields {
                full_name,
                email,
                contact_number,
                date_of_birth,
                state,
                city,
            })
        }
        _ => Err(Error::Internal("Customer validation left a field unset".to_string())),
    }
}

/// Validates the shape of a login request.
pub fn validate_login(request: &LoginRequest) -> Result<()> {
    let mut errors = FieldErrors::new();

    if request.username.trim().is_empty() {
        errors.add("username", "Username is required");
    }
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add("password", "Password must be at least 6 characters");
    }

    errors.into_result()
}

/// Validates the shape of a change-password request.
pub fn validate_change_password(request: &ChangePasswordRequest) -> Result<()> {
    let mut errors = FieldErrors::new();

    if request.current_password.is_empty() {
        errors.add("currentPassword", "Current password is required");
    }
    if request.new_password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add("newPassword", "New password must be at least 6 characters");
    }

    errors.into_result()
}

/// Validates UUID format, reporting malformed ids as not found
///
/// # Arguments
/// * `uuid_str` - The UUID string to validate
/// * `resource` - Resource name used in the error message
pub fn parse_resource_id(uuid_str: &str, resource: &str) -> Result<uuid::Uuid> {
    uuid::Uuid::parse_str(uuid_str.trim())
        .map_err(|_| Error::NotFound(format!("{} not found", resource)))
}

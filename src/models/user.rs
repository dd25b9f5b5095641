// src/models/user.rs

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap());

/// Account role. Resolved once during login and carried in the JWT,
/// so authorization never re-reads the users table per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique username, used for login.
    pub username: String,

    /// Unique email address.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub full_name: Option<String>,

    /// Free-form qualification text, e.g. "BSc Computer Science".
    pub qualification: Option<String>,

    /// Date of birth.
    pub dob: Option<NaiveDate>,

    pub role: Role,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(
            min = 3,
            max = 50,
            message = "Username length must be between 3 and 50 characters."
        ),
        custom(function = validate_username)
    )]
    pub username: String,
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
    #[validate(length(max = 128, message = "Full name must be at most 128 characters."))]
    pub full_name: Option<String>,
    #[validate(length(max = 128, message = "Qualification must be at most 128 characters."))]
    pub qualification: Option<String>,
    /// ISO date, e.g. "1999-04-21".
    #[validate(custom(function = validate_dob))]
    pub dob: Option<NaiveDate>,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Restricts usernames to letters, digits, '_', '.' and '-'.
fn validate_username(username: &str) -> Result<(), ValidationError> {
    if !USERNAME_RE.is_match(username) {
        return Err(ValidationError::new("invalid_username_charset"));
    }
    Ok(())
}

fn validate_dob(dob: &NaiveDate) -> Result<(), ValidationError> {
    if *dob > chrono::Utc::now().date_naive() {
        return Err(ValidationError::new("dob_in_future"));
    }
    Ok(())
}

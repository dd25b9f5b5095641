// src/models/subject.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'subjects' table in the database.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Subject {
    pub id: i64,

    /// Unique subject name (e.g., "Physics").
    pub name: String,

    pub description: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a new subject.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubjectRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Subject name length must be between 1 and 100 characters."
    ))]
    pub name: String,
    #[validate(length(max = 5000))]
    #[serde(default)]
    pub description: String,
}

// src/models/chapter.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'chapters' table in the database.
/// A chapter always belongs to exactly one subject.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Chapter {
    pub id: i64,

    pub subject_id: i64,

    /// Chapter name, unique within its subject.
    pub name: String,

    pub description: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a new chapter under a subject.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateChapterRequest {
    pub subject_id: i64,
    #[validate(length(
        min = 1,
        max = 100,
        message = "Chapter name length must be between 1 and 100 characters."
    ))]
    pub name: String,
    #[validate(length(max = 5000))]
    #[serde(default)]
    pub description: String,
}

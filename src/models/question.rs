// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Represents the 'questions' table in the database.
/// Every question is multiple-choice with exactly four option slots.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    pub quiz_id: i64,

    /// Optional short heading shown above the statement.
    pub title: Option<String>,

    /// The text content of the question.
    pub statement: String,

    pub option1: String,
    pub option2: String,
    pub option3: String,
    pub option4: String,

    /// Slot number (1 to 4) of the correct option.
    pub correct_option: i64,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for sending a question to a quiz taker (excludes the answer key).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub title: Option<String>,
    pub statement: String,
    pub options: Vec<String>,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            title: q.title,
            statement: q.statement,
            options: vec![q.option1, q.option2, q.option3, q.option4],
        }
    }
}

/// DTO for creating a new question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    pub quiz_id: i64,
    #[validate(length(max = 200))]
    pub question_title: Option<String>,
    #[validate(length(
        min = 1,
        max = 2000,
        message = "Question statement length must be between 1 and 2000 characters."
    ))]
    pub question_statement: String,
    #[validate(length(min = 1, max = 500))]
    pub option1: String,
    #[validate(length(min = 1, max = 500))]
    pub option2: String,
    #[validate(length(min = 1, max = 500))]
    pub option3: String,
    #[validate(length(min = 1, max = 500))]
    pub option4: String,
    #[validate(range(min = 1, max = 4, message = "correct_option must be a slot from 1 to 4."))]
    pub correct_option: i64,
}

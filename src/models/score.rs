// src/models/score.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'scores' table: one immutable row per completed attempt.
/// Retakes append new rows; earlier rows are never overwritten.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Score {
    pub id: i64,

    pub quiz_id: i64,

    pub user_id: i64,

    /// When the attempt was finalized (submitted or expired).
    pub attempted_at: chrono::DateTime<chrono::Utc>,

    /// Number of correctly answered questions.
    pub total_score: i64,
}

/// Attempt count per subject, for dashboard breakdowns.
#[derive(Debug, Serialize, FromRow)]
pub struct SubjectAttempts {
    pub subject_id: i64,
    pub subject_name: String,
    pub attempts: i64,
}

/// One point of a user's score history, in attempt order.
#[derive(Debug, Serialize, FromRow)]
pub struct ScorePoint {
    pub quiz_id: i64,
    pub quiz_name: String,
    pub attempted_at: chrono::DateTime<chrono::Utc>,
    pub total_score: i64,
}

/// Best and worst recorded score for one quiz.
#[derive(Debug, Serialize, FromRow)]
pub struct QuizScoreExtremes {
    pub quiz_id: i64,
    pub quiz_name: String,
    pub top_score: i64,
    pub lowest_score: i64,
}

/// Personal statistics for the signed-in user.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub total_attempts: i64,
    pub average_score: f64,
    pub attempts_by_subject: Vec<SubjectAttempts>,
    pub score_history: Vec<ScorePoint>,
}

/// Platform-wide statistics for the admin dashboard.
#[derive(Debug, Serialize)]
pub struct AdminSummary {
    pub total_users: i64,
    pub total_subjects: i64,
    pub total_quizzes: i64,
    pub total_attempts: i64,
    pub average_score: f64,
    pub attempts_by_subject: Vec<SubjectAttempts>,
    pub quiz_extremes: Vec<QuizScoreExtremes>,
}

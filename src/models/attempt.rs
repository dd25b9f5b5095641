// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::question::PublicQuestion;
use crate::session::NavDirection;

/// DTO for answering and navigating within a running attempt.
///
/// `question_id` and `selected_option` travel together: a bare
/// navigation (e.g. skipping a question) sends neither.
#[derive(Debug, Deserialize, Validate)]
pub struct AttemptAnswerRequest {
    pub question_id: Option<i64>,
    #[validate(range(min = 1, max = 4, message = "selected_option must be a slot from 1 to 4."))]
    pub selected_option: Option<i64>,
    pub direction: NavDirection,
}

/// The question currently in front of the quiz taker.
#[derive(Debug, Serialize)]
pub struct AttemptView {
    pub attempt_id: u64,
    pub quiz_id: i64,
    pub quiz_name: String,
    /// Zero-based position within the attempt's question order.
    pub question_index: usize,
    pub total_questions: usize,
    /// Seconds left on the fixed deadline, never negative.
    pub remaining_seconds: i64,
    pub question: PublicQuestion,
    /// Previously recorded choice for this question, if any.
    pub selected_option: Option<i64>,
}

/// Outcome of a finalized (submitted or expired) attempt.
#[derive(Debug, Serialize)]
pub struct AttemptResult {
    pub quiz_id: i64,
    pub total_score: i64,
    pub total_questions: i64,
    pub attempted_questions: usize,
    /// True when the deadline forced the submission.
    pub expired: bool,
}

/// Tagged response body for the attempt endpoints.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptResponse {
    InProgress(AttemptView),
    Submitted(AttemptResult),
}

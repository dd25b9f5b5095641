// src/models/quiz.rs

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

static HH_MM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{1,3}):([0-5]\d)$").unwrap());

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Quiz {
    pub id: i64,

    pub chapter_id: i64,

    pub name: String,

    /// Time budget for a single attempt, in whole minutes.
    pub duration_minutes: i64,

    /// Denormalized question count, maintained alongside question writes.
    pub total_qsn: i64,

    /// Scheduled date, informational only.
    pub date_of_quiz: Option<NaiveDate>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a new quiz under a chapter.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    pub chapter_id: i64,
    #[validate(length(
        min = 1,
        max = 100,
        message = "Quiz name length must be between 1 and 100 characters."
    ))]
    pub quiz_name: String,
    /// Either whole minutes ("45") or the clock form "HH:MM" ("01:30").
    #[validate(length(min = 1, max = 10))]
    pub quiz_duration: String,
    pub date_of_quiz: Option<NaiveDate>,
}

/// Parses a quiz duration into whole minutes.
///
/// Accepts plain minutes ("45") and the "HH:MM" clock form ("01:30").
/// Returns `None` for anything else or for a zero duration.
pub fn parse_duration_minutes(raw: &str) -> Option<i64> {
    let raw = raw.trim();

    let minutes = if let Some(caps) = HH_MM_RE.captures(raw) {
        let hours: i64 = caps.get(1)?.as_str().parse().ok()?;
        let mins: i64 = caps.get(2)?.as_str().parse().ok()?;
        hours * 60 + mins
    } else {
        raw.parse().ok()?
    };

    if minutes > 0 { Some(minutes) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_minutes() {
        assert_eq!(parse_duration_minutes("45"), Some(45));
        assert_eq!(parse_duration_minutes(" 5 "), Some(5));
    }

    #[test]
    fn parses_clock_form() {
        assert_eq!(parse_duration_minutes("01:30"), Some(90));
        assert_eq!(parse_duration_minutes("0:45"), Some(45));
        assert_eq!(parse_duration_minutes("2:05"), Some(125));
    }

    #[test]
    fn rejects_zero_and_garbage() {
        assert_eq!(parse_duration_minutes("0"), None);
        assert_eq!(parse_duration_minutes("00:00"), None);
        assert_eq!(parse_duration_minutes("-30"), None);
        assert_eq!(parse_duration_minutes("1:75"), None);
        assert_eq!(parse_duration_minutes("ninety"), None);
        assert_eq!(parse_duration_minutes(""), None);
    }
}

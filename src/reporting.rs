// src/reporting.rs
//
// Read-side aggregations over recorded scores. Every function takes an
// optional user filter: `None` means platform-wide (admin dashboards),
// `Some(id)` narrows to that user's own attempts.

use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::score::{QuizScoreExtremes, ScorePoint, SubjectAttempts};

/// Count of recorded attempts.
pub async fn total_attempts(pool: &SqlitePool, user_id: Option<i64>) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM scores WHERE (?1 IS NULL OR user_id = ?1)",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Mean recorded score. Defaults to 0.0 when nothing matches, so empty
/// dashboards render instead of erroring.
pub async fn average_score(pool: &SqlitePool, user_id: Option<i64>) -> Result<f64, AppError> {
    let average = sqlx::query_scalar::<_, f64>(
        "SELECT COALESCE(AVG(total_score), 0.0) FROM scores WHERE (?1 IS NULL OR user_id = ?1)",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(average)
}

/// Attempt counts grouped by subject, walking score -> quiz -> chapter
/// -> subject. Subjects without attempts simply do not appear.
pub async fn attempts_by_subject(
    pool: &SqlitePool,
    user_id: Option<i64>,
) -> Result<Vec<SubjectAttempts>, AppError> {
    let rows = sqlx::query_as::<_, SubjectAttempts>(
        r#"
        SELECT
            sub.id AS subject_id,
            sub.name AS subject_name,
            COUNT(s.id) AS attempts
        FROM scores s
        JOIN quizzes q ON s.quiz_id = q.id
        JOIN chapters c ON q.chapter_id = c.id
        JOIN subjects sub ON c.subject_id = sub.id
        WHERE (?1 IS NULL OR s.user_id = ?1)
        GROUP BY sub.id, sub.name
        ORDER BY attempts DESC, sub.name ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// One user's full score history in attempt order.
pub async fn user_score_history(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<ScorePoint>, AppError> {
    let rows = sqlx::query_as::<_, ScorePoint>(
        r#"
        SELECT
            q.id AS quiz_id,
            q.name AS quiz_name,
            s.attempted_at AS attempted_at,
            s.total_score AS total_score
        FROM scores s
        JOIN quizzes q ON s.quiz_id = q.id
        WHERE s.user_id = ?
        ORDER BY s.attempted_at ASC, s.id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Best and worst recorded score for every quiz with at least one attempt.
pub async fn quiz_score_extremes(pool: &SqlitePool) -> Result<Vec<QuizScoreExtremes>, AppError> {
    let rows = sqlx::query_as::<_, QuizScoreExtremes>(
        r#"
        SELECT
            q.id AS quiz_id,
            q.name AS quiz_name,
            MAX(s.total_score) AS top_score,
            MIN(s.total_score) AS lowest_score
        FROM scores s
        JOIN quizzes q ON s.quiz_id = q.id
        GROUP BY q.id, q.name
        ORDER BY q.id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

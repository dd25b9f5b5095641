// src/handlers/summary.rs

use axum::{Json, extract::{Extension, State}, response::IntoResponse};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::score::{AdminSummary, UserSummary},
    reporting,
    utils::jwt::Claims,
};

/// Personal statistics for the signed-in user: attempt count, average
/// score, per-subject breakdown and full score history.
pub async fn my_summary(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    let total_attempts = reporting::total_attempts(&pool, Some(user_id)).await?;
    let average_score = reporting::average_score(&pool, Some(user_id)).await?;
    let attempts_by_subject = reporting::attempts_by_subject(&pool, Some(user_id)).await?;
    let score_history = reporting::user_score_history(&pool, user_id).await?;

    Ok(Json(UserSummary {
        total_attempts,
        average_score,
        attempts_by_subject,
        score_history,
    }))
}

/// Platform-wide statistics for the admin dashboard.
/// Admin only.
pub async fn admin_summary(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let total_users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await?;
    let total_subjects = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subjects")
        .fetch_one(&pool)
        .await?;
    let total_quizzes = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quizzes")
        .fetch_one(&pool)
        .await?;

    let total_attempts = reporting::total_attempts(&pool, None).await?;
    let average_score = reporting::average_score(&pool, None).await?;
    let attempts_by_subject = reporting::attempts_by_subject(&pool, None).await?;
    let quiz_extremes = reporting::quiz_score_extremes(&pool).await?;

    Ok(Json(AdminSummary {
        total_users,
        total_subjects,
        total_quizzes,
        total_attempts,
        average_score,
        attempts_by_subject,
        quiz_extremes,
    }))
}

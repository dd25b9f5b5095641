// src/handlers/catalog.rs
//
// Read-only browsing of the curated subject -> chapter -> quiz tree.
// Any signed-in user can walk it; mutation lives in the admin handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{chapter::Chapter, quiz::Quiz, subject::Subject},
};

/// Query parameters for listing subjects.
#[derive(Debug, Deserialize)]
pub struct SubjectListParams {
    pub q: Option<String>,
}

/// Lists all subjects, optionally filtered by a search keyword.
pub async fn list_subjects(
    State(pool): State<SqlitePool>,
    Query(params): Query<SubjectListParams>,
) -> Result<impl IntoResponse, AppError> {
    // Prepare search pattern
    let search_pattern = params.q.map(|k| format!("%{}%", k));

    let subjects = sqlx::query_as::<_, Subject>(
        r#"
        SELECT id, name, description, created_at
        FROM subjects
        WHERE (?1 IS NULL OR name LIKE ?1)
        ORDER BY name ASC
        "#,
    )
    .bind(search_pattern)
    .fetch_all(&pool)
    .await?;

    Ok(Json(subjects))
}

/// Lists the chapters of one subject.
pub async fn list_chapters(
    State(pool): State<SqlitePool>,
    Path(subject_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let _subject = sqlx::query_scalar::<_, i64>("SELECT id FROM subjects WHERE id = ?")
        .bind(subject_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Subject not found".to_string()))?;

    let chapters = sqlx::query_as::<_, Chapter>(
        r#"
        SELECT id, subject_id, name, description, created_at
        FROM chapters
        WHERE subject_id = ?
        ORDER BY name ASC
        "#,
    )
    .bind(subject_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(chapters))
}

/// Lists the quizzes of one chapter.
pub async fn list_quizzes(
    State(pool): State<SqlitePool>,
    Path(chapter_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let _chapter = sqlx::query_scalar::<_, i64>("SELECT id FROM chapters WHERE id = ?")
        .bind(chapter_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Chapter not found".to_string()))?;

    let quizzes = sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, chapter_id, name, duration_minutes, total_qsn, date_of_quiz, created_at
        FROM quizzes
        WHERE chapter_id = ?
        ORDER BY id ASC
        "#,
    )
    .bind(chapter_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(quizzes))
}

/// Retrieves a single quiz by ID, question count included.
pub async fn get_quiz(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, chapter_id, name, duration_minutes, total_qsn, date_of_quiz, created_at
        FROM quizzes
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    Ok(Json(quiz))
}

// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        chapter::CreateChapterRequest,
        question::{CreateQuestionRequest, Question},
        quiz::{CreateQuizRequest, parse_duration_minutes},
        subject::CreateSubjectRequest,
        user::User,
    },
    utils::{html::sanitize_rich_text, jwt::Claims},
};

/// Lists all users in the system.
/// Admin only.
pub async fn list_users(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password, full_name, qualification, dob, role, created_at
        FROM users
        ORDER BY id DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list users: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(users))
}

/// Deletes a user by ID, along with their recorded scores.
/// Admin only. Prevents deleting self.
pub async fn delete_user(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    // Prevent self-deletion
    let current_user_id = claims.sub.parse::<i64>().unwrap_or(0);
    if id == current_user_id {
        return Err(AppError::BadRequest("Cannot delete yourself".to_string()));
    }

    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete user: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Creates a new subject.
/// Admin only.
pub async fn create_subject(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateSubjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let description = sanitize_rich_text(&payload.description);

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO subjects (name, description)
        VALUES (?, ?)
        RETURNING id
        "#,
    )
    .bind(&payload.name)
    .bind(&description)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::Conflict(format!("Subject '{}' already exists", payload.name));
            }
        }
        tracing::error!("Failed to create subject: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// DTO for updating a subject. Fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateSubjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Updates a subject by ID.
/// Admin only.
pub async fn update_subject(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateSubjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.is_none() && payload.description.is_none() {
        return Ok(StatusCode::OK);
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE subjects SET ");
    let mut separated = builder.separated(", ");

    if let Some(name) = payload.name {
        separated.push("name = ");
        separated.push_bind_unseparated(name);
    }

    if let Some(description) = payload.description {
        separated.push("description = ");
        separated.push_bind_unseparated(sanitize_rich_text(&description));
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        let err = AppError::from(e);
        if let AppError::InternalServerError(msg) = &err {
            tracing::error!("Failed to update subject: {}", msg);
        }
        err
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Subject not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Deletes a subject by ID. Chapters, quizzes, questions and scores
/// underneath it go with it via cascade.
/// Admin only.
pub async fn delete_subject(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM subjects WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete subject: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Subject not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Creates a new chapter under an existing subject.
/// Admin only.
pub async fn create_chapter(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateChapterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    // Check existence
    let _subject = sqlx::query_scalar::<_, i64>("SELECT id FROM subjects WHERE id = ?")
        .bind(payload.subject_id)
        .fetch_optional(&pool)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or(AppError::NotFound("Subject not found".to_string()))?;

    let description = sanitize_rich_text(&payload.description);

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO chapters (subject_id, name, description)
        VALUES (?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(payload.subject_id)
    .bind(&payload.name)
    .bind(&description)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::Conflict(format!(
                    "Chapter '{}' already exists in this subject",
                    payload.name
                ));
            }
        }
        tracing::error!("Failed to create chapter: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// DTO for updating a chapter. Fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateChapterRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Updates a chapter by ID.
/// Admin only.
pub async fn update_chapter(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateChapterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.is_none() && payload.description.is_none() {
        return Ok(StatusCode::OK);
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE chapters SET ");
    let mut separated = builder.separated(", ");

    if let Some(name) = payload.name {
        separated.push("name = ");
        separated.push_bind_unseparated(name);
    }

    if let Some(description) = payload.description {
        separated.push("description = ");
        separated.push_bind_unseparated(sanitize_rich_text(&description));
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        let err = AppError::from(e);
        if let AppError::InternalServerError(msg) = &err {
            tracing::error!("Failed to update chapter: {}", msg);
        }
        err
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Chapter not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Deletes a chapter by ID (cascades to its quizzes).
/// Admin only.
pub async fn delete_chapter(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM chapters WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete chapter: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Chapter not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Creates a new quiz under an existing chapter.
///
/// `quiz_duration` accepts whole minutes ("45") or "HH:MM" ("01:30");
/// it is normalized to minutes before storage.
/// Admin only.
pub async fn create_quiz(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let duration_minutes = parse_duration_minutes(&payload.quiz_duration).ok_or(
        AppError::BadRequest(
            "quiz_duration must be whole minutes or HH:MM, and greater than zero".to_string(),
        ),
    )?;

    // Check existence
    let _chapter = sqlx::query_scalar::<_, i64>("SELECT id FROM chapters WHERE id = ?")
        .bind(payload.chapter_id)
        .fetch_optional(&pool)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or(AppError::NotFound("Chapter not found".to_string()))?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO quizzes (chapter_id, name, duration_minutes, date_of_quiz)
        VALUES (?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(payload.chapter_id)
    .bind(&payload.quiz_name)
    .bind(duration_minutes)
    .bind(payload.date_of_quiz)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create quiz: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// DTO for updating a quiz. Fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateQuizRequest {
    pub quiz_name: Option<String>,
    pub quiz_duration: Option<String>,
    pub date_of_quiz: Option<NaiveDate>,
}

/// Updates a quiz by ID. A changed duration applies to future attempts
/// only; running attempts keep the deadline they started with.
/// Admin only.
pub async fn update_quiz(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.quiz_name.is_none()
        && payload.quiz_duration.is_none()
        && payload.date_of_quiz.is_none()
    {
        return Ok(StatusCode::OK);
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE quizzes SET ");
    let mut separated = builder.separated(", ");

    if let Some(name) = payload.quiz_name {
        separated.push("name = ");
        separated.push_bind_unseparated(name);
    }

    if let Some(raw_duration) = payload.quiz_duration {
        let duration_minutes = parse_duration_minutes(&raw_duration).ok_or(
            AppError::BadRequest(
                "quiz_duration must be whole minutes or HH:MM, and greater than zero".to_string(),
            ),
        )?;
        separated.push("duration_minutes = ");
        separated.push_bind_unseparated(duration_minutes);
    }

    if let Some(date_of_quiz) = payload.date_of_quiz {
        separated.push("date_of_quiz = ");
        separated.push_bind_unseparated(date_of_quiz);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        tracing::error!("Failed to update quiz: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Deletes a quiz by ID (cascades to its questions and scores).
/// Admin only.
pub async fn delete_quiz(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM quizzes WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete quiz: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Query parameters for listing questions.
#[derive(Debug, Deserialize)]
pub struct QuestionListParams {
    pub quiz_id: i64,
}

/// Lists a quiz's questions, answer key included.
/// Admin only; quiz takers get questions through the attempt endpoints.
pub async fn list_questions(
    State(pool): State<SqlitePool>,
    Query(params): Query<QuestionListParams>,
) -> Result<impl IntoResponse, AppError> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, quiz_id, title, statement, option1, option2, option3, option4,
               correct_option, created_at
        FROM questions
        WHERE quiz_id = ?
        ORDER BY id ASC
        "#,
    )
    .bind(params.quiz_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list questions: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(questions))
}

/// Creates a new question and bumps the quiz's question counter in the
/// same transaction.
/// Admin only.
pub async fn create_question(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let statement = sanitize_rich_text(&payload.question_statement);

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let _quiz = sqlx::query_scalar::<_, i64>("SELECT id FROM quizzes WHERE id = ?")
        .bind(payload.quiz_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO questions
        (quiz_id, title, statement, option1, option2, option3, option4, correct_option)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(payload.quiz_id)
    .bind(&payload.question_title)
    .bind(&statement)
    .bind(&payload.option1)
    .bind(&payload.option2)
    .bind(&payload.option3)
    .bind(&payload.option4)
    .bind(payload.correct_option)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    sqlx::query("UPDATE quizzes SET total_qsn = total_qsn + 1 WHERE id = ?")
        .bind(payload.quiz_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    tx.commit()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// DTO for updating a question. Fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateQuestionRequest {
    pub question_title: Option<String>,
    pub question_statement: Option<String>,
    pub option1: Option<String>,
    pub option2: Option<String>,
    pub option3: Option<String>,
    pub option4: Option<String>,
    pub correct_option: Option<i64>,
}

/// Updates a question by ID.
/// Admin only.
pub async fn update_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.question_title.is_none()
        && payload.question_statement.is_none()
        && payload.option1.is_none()
        && payload.option2.is_none()
        && payload.option3.is_none()
        && payload.option4.is_none()
        && payload.correct_option.is_none()
    {
        return Ok(StatusCode::OK);
    }

    if let Some(correct_option) = payload.correct_option {
        if !(1..=4).contains(&correct_option) {
            return Err(AppError::BadRequest(
                "correct_option must be a slot from 1 to 4".to_string(),
            ));
        }
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE questions SET ");
    let mut separated = builder.separated(", ");

    if let Some(title) = payload.question_title {
        separated.push("title = ");
        separated.push_bind_unseparated(title);
    }

    if let Some(statement) = payload.question_statement {
        separated.push("statement = ");
        separated.push_bind_unseparated(sanitize_rich_text(&statement));
    }

    if let Some(option1) = payload.option1 {
        separated.push("option1 = ");
        separated.push_bind_unseparated(option1);
    }

    if let Some(option2) = payload.option2 {
        separated.push("option2 = ");
        separated.push_bind_unseparated(option2);
    }

    if let Some(option3) = payload.option3 {
        separated.push("option3 = ");
        separated.push_bind_unseparated(option3);
    }

    if let Some(option4) = payload.option4 {
        separated.push("option4 = ");
        separated.push_bind_unseparated(option4);
    }

    if let Some(correct_option) = payload.correct_option {
        separated.push("correct_option = ");
        separated.push_bind_unseparated(correct_option);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        tracing::error!("Failed to update question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Deletes a question by ID and decrements the quiz's question counter
/// in the same transaction.
/// Admin only.
pub async fn delete_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let quiz_id = sqlx::query_scalar::<_, i64>("SELECT quiz_id FROM questions WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    sqlx::query("DELETE FROM questions WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete question: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    sqlx::query("UPDATE quizzes SET total_qsn = MAX(0, total_qsn - 1) WHERE id = ?")
        .bind(quiz_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    tx.commit()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(StatusCode::NO_CONTENT)
}

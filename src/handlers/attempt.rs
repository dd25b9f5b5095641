// src/handlers/attempt.rs
//
// The quiz-taking flow. An attempt lives in the attempt store, not the
// database; only its final score is persisted. Expiry is enforced
// lazily: whichever request first observes a passed deadline finalizes
// the attempt with the answers recorded so far.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, State},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        attempt::{AttemptAnswerRequest, AttemptResponse, AttemptResult, AttemptView},
        question::Question,
        quiz::Quiz,
    },
    scoring::score_attempt,
    session::{AttemptStore, NavDirection, QuizAttempt},
    utils::jwt::Claims,
};

/// Helper struct for fetching answer keys.
#[derive(sqlx::FromRow)]
struct AnswerKey {
    id: i64,
    correct_option: i64,
}

/// Starts an attempt on a quiz, or resumes the caller's running attempt
/// on the same quiz.
///
/// Resuming never resets the clock: the deadline fixed at the first
/// start stays. Starting a different quiz silently replaces whatever
/// attempt was active before (one attempt per user). If the active
/// attempt already expired, it is finalized and the response reports
/// the forced submission instead of a fresh start.
pub async fn start_attempt(
    State(pool): State<SqlitePool>,
    State(attempts): State<Arc<dyn AttemptStore>>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);
    let now = Utc::now();

    if let Some(existing) = attempts.fetch(user_id).await {
        if existing.quiz_id == quiz_id {
            if existing.is_expired(now) {
                // A quiz deleted under the attempt finalizes to nothing;
                // fall through and report the missing quiz like any
                // fresh start would.
                if let Some(result) = finalize_attempt(&pool, &attempts, existing, true).await? {
                    return Ok(Json(AttemptResponse::Submitted(result)));
                }
            } else {
                let view = build_view(&pool, &existing, now).await?;
                return Ok(Json(AttemptResponse::InProgress(view)));
            }
        } else {
            // A different quiz: an expired attempt is finalized first, a
            // live one is abandoned unscored.
            if existing.is_expired(now) {
                finalize_attempt(&pool, &attempts, existing, true).await?;
            } else {
                attempts.remove(user_id).await;
            }
        }
    }

    let quiz = sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, chapter_id, name, duration_minutes, total_qsn, date_of_quiz, created_at
        FROM quizzes
        WHERE id = ?
        "#,
    )
    .bind(quiz_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    // Snapshot the question order up front.
    let question_ids = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM questions WHERE quiz_id = ? ORDER BY id ASC",
    )
    .bind(quiz_id)
    .fetch_all(&pool)
    .await?;

    if question_ids.is_empty() {
        return Err(AppError::BadRequest(
            "Quiz has no questions yet".to_string(),
        ));
    }

    let attempt = QuizAttempt::begin(
        attempts.next_attempt_id(),
        user_id,
        quiz.id,
        quiz.name,
        quiz.duration_minutes,
        question_ids,
        now,
    );

    let view = build_view(&pool, &attempt, now).await?;
    attempts.save(attempt).await;

    tracing::info!("User {} started an attempt on quiz {}", user_id, quiz_id);
    Ok(Json(AttemptResponse::InProgress(view)))
}

/// Shows the caller's current question on this quiz.
///
/// Viewing after the deadline finalizes the attempt with the answers
/// recorded so far and reports the forced submission.
pub async fn view_attempt(
    State(pool): State<SqlitePool>,
    State(attempts): State<Arc<dyn AttemptStore>>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);
    let now = Utc::now();

    let attempt = fetch_attempt_for_quiz(&attempts, user_id, quiz_id).await?;

    if attempt.is_expired(now) {
        return match finalize_attempt(&pool, &attempts, attempt, true).await? {
            Some(result) => Ok(Json(AttemptResponse::Submitted(result))),
            None => Err(AppError::NotFound("Quiz not found".to_string())),
        };
    }

    let view = build_view(&pool, &attempt, now).await?;
    Ok(Json(AttemptResponse::InProgress(view)))
}

/// Records an answer and/or moves through the attempt.
///
/// `next` and `prev` clamp at the ends of the question list; neither
/// wraps nor submits. `submit` finalizes unconditionally, from any
/// question. An answer arriving after the deadline is discarded and the
/// attempt is finalized with what was recorded in time.
pub async fn answer_attempt(
    State(pool): State<SqlitePool>,
    State(attempts): State<Arc<dyn AttemptStore>>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<AttemptAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = claims.sub.parse::<i64>().unwrap_or(0);
    let now = Utc::now();

    let mut attempt = fetch_attempt_for_quiz(&attempts, user_id, quiz_id).await?;

    if attempt.is_expired(now) {
        return match finalize_attempt(&pool, &attempts, attempt, true).await? {
            Some(result) => Ok(Json(AttemptResponse::Submitted(result))),
            None => Err(AppError::NotFound("Quiz not found".to_string())),
        };
    }

    match (payload.question_id, payload.selected_option) {
        (Some(question_id), Some(selected_option)) => {
            if !attempt.question_ids.contains(&question_id) {
                return Err(AppError::BadRequest(
                    "Question is not part of this attempt".to_string(),
                ));
            }
            attempt.record_answer(question_id, selected_option);
        }
        (None, None) => {}
        _ => {
            return Err(AppError::BadRequest(
                "question_id and selected_option must be provided together".to_string(),
            ));
        }
    }

    match payload.direction {
        NavDirection::Submit => match finalize_attempt(&pool, &attempts, attempt, false).await? {
            Some(result) => Ok(Json(AttemptResponse::Submitted(result))),
            None => Err(AppError::NotFound("Quiz not found".to_string())),
        },
        direction => {
            attempt.navigate(direction);
            // Save before building the view: a deleted question makes the
            // view fail, but the recorded answer and cursor must survive.
            attempts.save(attempt.clone()).await;
            let view = build_view(&pool, &attempt, now).await?;
            Ok(Json(AttemptResponse::InProgress(view)))
        }
    }
}

/// Returns the caller's active attempt if it is on the given quiz.
async fn fetch_attempt_for_quiz(
    attempts: &Arc<dyn AttemptStore>,
    user_id: i64,
    quiz_id: i64,
) -> Result<QuizAttempt, AppError> {
    let attempt = attempts
        .fetch(user_id)
        .await
        .ok_or(AppError::NotFound("No attempt in progress for this quiz".to_string()))?;

    if attempt.quiz_id != quiz_id {
        return Err(AppError::NotFound(
            "No attempt in progress for this quiz".to_string(),
        ));
    }

    Ok(attempt)
}

/// Scores the attempt against the live answer key, records the score
/// row, and drops the session state.
///
/// Returns `None` when the quiz was deleted while the attempt was live:
/// a score row cannot reference the missing quiz, so the session entry
/// is discarded without one.
async fn finalize_attempt(
    pool: &SqlitePool,
    attempts: &Arc<dyn AttemptStore>,
    mut attempt: QuizAttempt,
    expired: bool,
) -> Result<Option<AttemptResult>, AppError> {
    let quiz_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM quizzes WHERE id = ?")
        .bind(attempt.quiz_id)
        .fetch_optional(pool)
        .await?;

    if quiz_exists.is_none() {
        attempts.remove(attempt.user_id).await;
        tracing::info!(
            "Discarding attempt by user {} on deleted quiz {}",
            attempt.user_id,
            attempt.quiz_id
        );
        return Ok(None);
    }

    let answers = attempt.take_answers();

    // Questions deleted mid-attempt drop out of the key; answers to them
    // are ignored by the scorer.
    let key_rows = sqlx::query_as::<_, AnswerKey>(
        "SELECT id, correct_option FROM questions WHERE quiz_id = ?",
    )
    .bind(attempt.quiz_id)
    .fetch_all(pool)
    .await?;

    let answer_key: HashMap<i64, i64> = key_rows
        .into_iter()
        .map(|k| (k.id, k.correct_option))
        .collect();

    let total_score = score_attempt(&answers, &answer_key);
    let attempted_at: DateTime<Utc> = Utc::now();

    let inserted = sqlx::query(
        "INSERT INTO scores (quiz_id, user_id, attempted_at, total_score) VALUES (?, ?, ?, ?)",
    )
    .bind(attempt.quiz_id)
    .bind(attempt.user_id)
    .bind(attempted_at)
    .bind(total_score)
    .execute(pool)
    .await;

    if let Err(e) = inserted {
        // The quiz (or the user) can still vanish between the check
        // above and this insert.
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_foreign_key_violation() {
                attempts.remove(attempt.user_id).await;
                return Ok(None);
            }
        }
        tracing::error!("Failed to record score: {:?}", e);
        return Err(AppError::InternalServerError(e.to_string()));
    }

    attempts.remove(attempt.user_id).await;

    tracing::info!(
        "User {} finished quiz {} with score {}/{} (expired: {})",
        attempt.user_id,
        attempt.quiz_id,
        total_score,
        answer_key.len(),
        expired
    );

    Ok(Some(AttemptResult {
        quiz_id: attempt.quiz_id,
        total_score,
        total_questions: answer_key.len() as i64,
        attempted_questions: answers.len(),
        expired,
    }))
}

/// Assembles the client view of the question under the cursor.
///
/// The question text is read fresh so edits show up, while identity and
/// order come from the attempt's snapshot. A question deleted
/// mid-attempt turns into a 404 for this slot; the attempt itself stays
/// alive and the taker can navigate away. A fully deleted quiz is
/// reported as missing instead.
async fn build_view(
    pool: &SqlitePool,
    attempt: &QuizAttempt,
    now: DateTime<Utc>,
) -> Result<AttemptView, AppError> {
    let question_id = attempt
        .current_question_id()
        .ok_or(AppError::InternalServerError("Attempt has no questions".to_string()))?;

    let question = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, quiz_id, title, statement, option1, option2, option3, option4,
               correct_option, created_at
        FROM questions
        WHERE id = ?
        "#,
    )
    .bind(question_id)
    .fetch_optional(pool)
    .await?;

    let question = match question {
        Some(question) => question,
        None => {
            // One missing question is a removed slot; the quiz row gone
            // too means the whole quiz was deleted.
            let quiz_alive = sqlx::query_scalar::<_, i64>("SELECT id FROM quizzes WHERE id = ?")
                .bind(attempt.quiz_id)
                .fetch_optional(pool)
                .await?;
            if quiz_alive.is_none() {
                return Err(AppError::NotFound("Quiz not found".to_string()));
            }
            return Err(AppError::NotFound(
                "This question was removed from the quiz; navigate to another question"
                    .to_string(),
            ));
        }
    };

    Ok(AttemptView {
        attempt_id: attempt.attempt_id,
        quiz_id: attempt.quiz_id,
        quiz_name: attempt.quiz_name.clone(),
        question_index: attempt.current_index,
        total_questions: attempt.question_ids.len(),
        remaining_seconds: attempt.remaining_seconds(now),
        selected_option: attempt.answers.get(&question_id).copied(),
        question: question.into(),
    })
}

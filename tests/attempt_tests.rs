// tests/attempt_tests.rs
//
// End-to-end coverage of the quiz-taking flow: curation by an admin,
// timed attempts, navigation, forced submission on expiry, score rows
// and the summary dashboards.

use std::sync::Arc;

use quizmaster::{config::Config, db, routes, session::InMemoryAttemptStore, state::AppState};
use sqlx::sqlite::SqlitePoolOptions;

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL plus the app state, so tests can reach the
/// attempt store and the database directly.
async fn spawn_app() -> (String, AppState) {
    let connect_options =
        db::connect_options("sqlite::memory:").expect("Failed to build connect options");

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options)
        .await
        .expect("Failed to open in-memory SQLite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        listen_addr: "127.0.0.1:0".to_string(),
        cors_origins: "http://localhost:5173".to_string(),
        admin_username: None,
        admin_email: None,
        admin_password: None,
    };

    let state = AppState {
        pool,
        config,
        attempts: Arc::new(InMemoryAttemptStore::new()),
    };

    let app = routes::create_router(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .await
        .unwrap();
    });

    (address, state)
}

/// Seeds an admin account and returns its bearer token.
async fn admin_token(client: &reqwest::Client, address: &str, state: &AppState) -> String {
    db::seed_admin(&state.pool, "quizadmin", "quizadmin@example.com", "admin123")
        .await
        .expect("Failed to seed admin");

    let body: serde_json::Value = client
        .post(&format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "username": "quizadmin",
            "password": "admin123"
        }))
        .send()
        .await
        .expect("Admin login failed")
        .json()
        .await
        .expect("Failed to parse login json");

    body["token"].as_str().expect("Token not found").to_string()
}

/// Registers a fresh user and returns (username, token, user_id).
async fn user_token(
    client: &reqwest::Client,
    address: &str,
    state: &AppState,
) -> (String, String, i64) {
    let username = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);

    let response = client
        .post(&format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "password123"
        }))
        .send()
        .await
        .expect("Register failed");
    assert_eq!(response.status().as_u16(), 201);

    let body: serde_json::Value = client
        .post(&format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "username": username,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Login failed")
        .json()
        .await
        .expect("Failed to parse login json");

    let token = body["token"].as_str().expect("Token not found").to_string();

    let user_id = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = ?")
        .bind(&username)
        .fetch_one(&state.pool)
        .await
        .expect("User row missing");

    (username, token, user_id)
}

/// Builds subject -> chapter -> quiz (30 minutes) with three questions
/// whose correct options are 1, 2 and 3. Returns (quiz_id, question_ids).
async fn seed_quiz(client: &reqwest::Client, address: &str, token: &str) -> (i64, Vec<i64>) {
    let subject: serde_json::Value = client
        .post(&format!("{}/api/admin/subjects", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "name": "Physics",
            "description": "Mechanics and waves"
        }))
        .send()
        .await
        .expect("Create subject failed")
        .json()
        .await
        .unwrap();
    let subject_id = subject["id"].as_i64().unwrap();

    let chapter: serde_json::Value = client
        .post(&format!("{}/api/admin/chapters", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "subject_id": subject_id,
            "name": "Kinematics"
        }))
        .send()
        .await
        .expect("Create chapter failed")
        .json()
        .await
        .unwrap();
    let chapter_id = chapter["id"].as_i64().unwrap();

    let quiz: serde_json::Value = client
        .post(&format!("{}/api/admin/quizzes", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "chapter_id": chapter_id,
            "quiz_name": "Weekly Quiz 1",
            "quiz_duration": "00:30",
            "date_of_quiz": "2026-09-01"
        }))
        .send()
        .await
        .expect("Create quiz failed")
        .json()
        .await
        .unwrap();
    let quiz_id = quiz["id"].as_i64().unwrap();

    let mut question_ids = Vec::new();
    for (i, correct) in [1i64, 2, 3].iter().enumerate() {
        let question: serde_json::Value = client
            .post(&format!("{}/api/admin/questions", address))
            .header("Authorization", format!("Bearer {}", token))
            .json(&serde_json::json!({
                "quiz_id": quiz_id,
                "question_statement": format!("Question number {}", i + 1),
                "option1": "First",
                "option2": "Second",
                "option3": "Third",
                "option4": "Fourth",
                "correct_option": correct
            }))
            .send()
            .await
            .expect("Create question failed")
            .json()
            .await
            .unwrap();
        question_ids.push(question["id"].as_i64().unwrap());
    }

    (quiz_id, question_ids)
}

/// Posts an answer/navigation command on a running attempt.
async fn answer(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    quiz_id: i64,
    question: Option<(i64, i64)>,
    direction: &str,
) -> serde_json::Value {
    let mut body = serde_json::json!({ "direction": direction });
    if let Some((question_id, selected_option)) = question {
        body["question_id"] = serde_json::json!(question_id);
        body["selected_option"] = serde_json::json!(selected_option);
    }

    client
        .post(&format!("{}/api/quizzes/{}/attempt/answer", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&body)
        .send()
        .await
        .expect("Answer request failed")
        .json()
        .await
        .expect("Failed to parse answer json")
}

#[tokio::test]
async fn quiz_counter_tracks_question_writes() {
    // Arrange
    let (address, state) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = admin_token(&client, &address, &state).await;
    let (quiz_id, question_ids) = seed_quiz(&client, &address, &token).await;

    // Act / Assert: the denormalized counter matches the live count
    let quiz: serde_json::Value = client
        .get(&format!("{}/api/quizzes/{}", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(quiz["total_qsn"], 3);
    assert_eq!(quiz["duration_minutes"], 30); // "00:30" normalized

    let delete = client
        .delete(&format!("{}/api/admin/questions/{}", address, question_ids[0]))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(delete.status().as_u16(), 204);

    let quiz: serde_json::Value = client
        .get(&format!("{}/api/quizzes/{}", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(quiz["total_qsn"], 2);

    let live_count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions WHERE quiz_id = ?")
            .bind(quiz_id)
            .fetch_one(&state.pool)
            .await
            .unwrap();
    assert_eq!(quiz["total_qsn"].as_i64().unwrap(), live_count);
}

#[tokio::test]
async fn full_attempt_flow_scores_and_reports() {
    // Arrange
    let (address, state) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin = admin_token(&client, &address, &state).await;
    let (quiz_id, q) = seed_quiz(&client, &address, &admin).await;
    let (_username, token, _user_id) = user_token(&client, &address, &state).await;

    // Act: start the attempt
    let view: serde_json::Value = client
        .post(&format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(view["status"], "in_progress");
    assert_eq!(view["question_index"], 0);
    assert_eq!(view["total_questions"], 3);
    assert_eq!(view["question"]["id"].as_i64().unwrap(), q[0]);
    assert!(view["question"].get("correct_option").is_none(), "answer key must not leak");
    let remaining = view["remaining_seconds"].as_i64().unwrap();
    assert!(remaining > 1700 && remaining <= 1800);

    // Answer question 1 correctly, question 2 wrong, walk to the end
    let view = answer(&client, &address, &token, quiz_id, Some((q[0], 1)), "next").await;
    assert_eq!(view["question_index"], 1);
    assert_eq!(view["question"]["id"].as_i64().unwrap(), q[1]);

    let view = answer(&client, &address, &token, quiz_id, Some((q[1], 4)), "next").await;
    assert_eq!(view["question_index"], 2);

    // Next on the last question clamps; nothing is submitted
    let view = answer(&client, &address, &token, quiz_id, None, "next").await;
    assert_eq!(view["status"], "in_progress");
    assert_eq!(view["question_index"], 2);
    assert!(view["selected_option"].is_null());

    // Walk back; previously selected options are echoed
    let view = answer(&client, &address, &token, quiz_id, None, "prev").await;
    assert_eq!(view["question_index"], 1);
    assert_eq!(view["selected_option"], 4);

    let view = answer(&client, &address, &token, quiz_id, None, "prev").await;
    assert_eq!(view["question_index"], 0);
    assert_eq!(view["selected_option"], 1);

    // Prev on the first question clamps too
    let view = answer(&client, &address, &token, quiz_id, None, "prev").await;
    assert_eq!(view["question_index"], 0);

    // Submit from here, answering question 3 on the way out
    let result = answer(&client, &address, &token, quiz_id, Some((q[2], 3)), "submit").await;
    assert_eq!(result["status"], "submitted");
    assert_eq!(result["total_score"], 2);
    assert_eq!(result["total_questions"], 3);
    assert_eq!(result["attempted_questions"], 3);
    assert_eq!(result["expired"], false);

    // The session is gone once scored
    let gone = client
        .get(&format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status().as_u16(), 404);

    // Personal summary shows the recorded attempt
    let summary: serde_json::Value = client
        .get(&format!("{}/api/summary/me", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary["total_attempts"], 1);
    assert_eq!(summary["average_score"].as_f64().unwrap(), 2.0);
    assert_eq!(summary["score_history"][0]["total_score"], 2);
    assert_eq!(summary["attempts_by_subject"][0]["subject_name"], "Physics");
    assert_eq!(summary["attempts_by_subject"][0]["attempts"], 1);

    // Retake: a second attempt starts clean and appends a second row
    let view: serde_json::Value = client
        .post(&format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["status"], "in_progress");
    assert_eq!(view["question_index"], 0);
    assert!(view["selected_option"].is_null());

    let result = answer(&client, &address, &token, quiz_id, None, "submit").await;
    assert_eq!(result["total_score"], 0);
    assert_eq!(result["attempted_questions"], 0);

    let summary: serde_json::Value = client
        .get(&format!("{}/api/summary/me", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary["total_attempts"], 2);
    assert_eq!(summary["average_score"].as_f64().unwrap(), 1.0);
    assert_eq!(summary["score_history"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn restarting_same_quiz_resumes_without_resetting_clock() {
    // Arrange
    let (address, state) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin = admin_token(&client, &address, &state).await;
    let (quiz_id, q) = seed_quiz(&client, &address, &admin).await;
    let (_username, token, _user_id) = user_token(&client, &address, &state).await;

    let first: serde_json::Value = client
        .post(&format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let attempt_id = first["attempt_id"].as_u64().unwrap();

    answer(&client, &address, &token, quiz_id, Some((q[0], 2)), "next").await;

    // Act: post start again for the same quiz
    let resumed: serde_json::Value = client
        .post(&format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Assert: same attempt, same clock, recorded answer still there
    assert_eq!(resumed["status"], "in_progress");
    assert_eq!(resumed["attempt_id"].as_u64().unwrap(), attempt_id);
    assert_eq!(resumed["question_index"], 1);

    let back = answer(&client, &address, &token, quiz_id, None, "prev").await;
    assert_eq!(back["selected_option"], 2);
}

#[tokio::test]
async fn starting_another_quiz_replaces_active_attempt() {
    // Arrange
    let (address, state) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin = admin_token(&client, &address, &state).await;
    let (quiz_a, q) = seed_quiz(&client, &address, &admin).await;

    // A second quiz in the same chapter
    let chapter_id = sqlx::query_scalar::<_, i64>("SELECT chapter_id FROM quizzes WHERE id = ?")
        .bind(quiz_a)
        .fetch_one(&state.pool)
        .await
        .unwrap();
    let quiz_b: serde_json::Value = client
        .post(&format!("{}/api/admin/quizzes", address))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&serde_json::json!({
            "chapter_id": chapter_id,
            "quiz_name": "Weekly Quiz 2",
            "quiz_duration": "15"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let quiz_b = quiz_b["id"].as_i64().unwrap();
    client
        .post(&format!("{}/api/admin/questions", address))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&serde_json::json!({
            "quiz_id": quiz_b,
            "question_statement": "Only question",
            "option1": "A", "option2": "B", "option3": "C", "option4": "D",
            "correct_option": 1
        }))
        .send()
        .await
        .unwrap();

    let (_username, token, _user_id) = user_token(&client, &address, &state).await;

    client
        .post(&format!("{}/api/quizzes/{}/attempt", address, quiz_a))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    answer(&client, &address, &token, quiz_a, Some((q[0], 1)), "next").await;

    // Act: start the other quiz
    let view: serde_json::Value = client
        .post(&format!("{}/api/quizzes/{}/attempt", address, quiz_b))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Assert: the new attempt is live, the old one is gone and unscored
    assert_eq!(view["status"], "in_progress");
    assert_eq!(view["quiz_id"].as_i64().unwrap(), quiz_b);

    let old = client
        .get(&format!("{}/api/quizzes/{}/attempt", address, quiz_a))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(old.status().as_u16(), 404);

    let score_rows = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM scores")
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(score_rows, 0);
}

#[tokio::test]
async fn expired_attempt_is_force_submitted_on_view() {
    // Arrange
    let (address, state) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin = admin_token(&client, &address, &state).await;
    let (quiz_id, q) = seed_quiz(&client, &address, &admin).await;
    let (_username, token, user_id) = user_token(&client, &address, &state).await;

    client
        .post(&format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    answer(&client, &address, &token, quiz_id, Some((q[0], 1)), "next").await;

    // Push the deadline into the past, as if the half hour elapsed
    let mut attempt = state.attempts.fetch(user_id).await.expect("attempt in store");
    attempt.deadline = chrono::Utc::now() - chrono::Duration::seconds(5);
    state.attempts.save(attempt).await;

    // Act: the next view forces the submission
    let result: serde_json::Value = client
        .get(&format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Assert: graded with the answers recorded before the deadline
    assert_eq!(result["status"], "submitted");
    assert_eq!(result["expired"], true);
    assert_eq!(result["total_score"], 1);
    assert_eq!(result["attempted_questions"], 1);

    assert!(state.attempts.fetch(user_id).await.is_none());

    let score_rows = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM scores WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(score_rows, 1);
}

#[tokio::test]
async fn late_answers_are_discarded() {
    // Arrange
    let (address, state) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin = admin_token(&client, &address, &state).await;
    let (quiz_id, q) = seed_quiz(&client, &address, &admin).await;
    let (_username, token, user_id) = user_token(&client, &address, &state).await;

    client
        .post(&format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    let mut attempt = state.attempts.fetch(user_id).await.expect("attempt in store");
    attempt.deadline = chrono::Utc::now() - chrono::Duration::seconds(5);
    state.attempts.save(attempt).await;

    // Act: an answer arrives after the deadline
    let result = answer(&client, &address, &token, quiz_id, Some((q[0], 1)), "next").await;

    // Assert: the attempt is finalized without the late answer
    assert_eq!(result["status"], "submitted");
    assert_eq!(result["expired"], true);
    assert_eq!(result["total_score"], 0);
    assert_eq!(result["attempted_questions"], 0);
}

#[tokio::test]
async fn deleting_quiz_mid_attempt_discards_it_without_a_score() {
    // Arrange: a live attempt on a quiz the admin then deletes
    let (address, state) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin = admin_token(&client, &address, &state).await;
    let (quiz_id, q) = seed_quiz(&client, &address, &admin).await;
    let (_username, token, user_id) = user_token(&client, &address, &state).await;

    client
        .post(&format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    answer(&client, &address, &token, quiz_id, Some((q[0], 1)), "next").await;

    let deleted = client
        .delete(&format!("{}/api/admin/quizzes/{}", address, quiz_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 204);

    // Act: view while the clock is still running
    let response = client
        .get(&format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    // Assert: the vanished quiz is reported as missing, not as a
    // removed question slot
    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Quiz not found");

    // Push the deadline into the past; the next view must resolve the
    // attempt instead of erroring
    let mut attempt = state.attempts.fetch(user_id).await.expect("attempt in store");
    attempt.deadline = chrono::Utc::now() - chrono::Duration::seconds(5);
    state.attempts.save(attempt).await;

    let response = client
        .get(&format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    // The session is gone and nothing was scored
    assert!(state.attempts.fetch(user_id).await.is_none());

    let score_rows = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM scores WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(score_rows, 0);
}

#[tokio::test]
async fn restarting_deleted_quiz_after_expiry_reports_missing_quiz() {
    // Arrange: an attempt whose quiz is deleted, then left to expire
    let (address, state) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin = admin_token(&client, &address, &state).await;
    let (quiz_id, _q) = seed_quiz(&client, &address, &admin).await;
    let (_username, token, user_id) = user_token(&client, &address, &state).await;

    client
        .post(&format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    let deleted = client
        .delete(&format!("{}/api/admin/quizzes/{}", address, quiz_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 204);

    let mut attempt = state.attempts.fetch(user_id).await.expect("attempt in store");
    attempt.deadline = chrono::Utc::now() - chrono::Duration::seconds(5);
    state.attempts.save(attempt).await;

    // Act: try to start the deleted quiz again
    let response = client
        .post(&format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    // Assert: a plain 404, with the dead attempt cleared on the way
    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Quiz not found");

    assert!(state.attempts.fetch(user_id).await.is_none());

    let score_rows = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM scores")
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(score_rows, 0);
}

#[tokio::test]
async fn expired_attempt_on_deleted_quiz_does_not_block_other_quizzes() {
    // Arrange: two quizzes; an attempt on the first, which then vanishes
    let (address, state) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin = admin_token(&client, &address, &state).await;
    let (quiz_a, _q) = seed_quiz(&client, &address, &admin).await;

    let chapter_id = sqlx::query_scalar::<_, i64>("SELECT chapter_id FROM quizzes WHERE id = ?")
        .bind(quiz_a)
        .fetch_one(&state.pool)
        .await
        .unwrap();
    let quiz_b: serde_json::Value = client
        .post(&format!("{}/api/admin/quizzes", address))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&serde_json::json!({
            "chapter_id": chapter_id,
            "quiz_name": "Weekly Quiz 2",
            "quiz_duration": "15"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let quiz_b = quiz_b["id"].as_i64().unwrap();
    client
        .post(&format!("{}/api/admin/questions", address))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&serde_json::json!({
            "quiz_id": quiz_b,
            "question_statement": "Only question",
            "option1": "A", "option2": "B", "option3": "C", "option4": "D",
            "correct_option": 1
        }))
        .send()
        .await
        .unwrap();

    let (_username, token, user_id) = user_token(&client, &address, &state).await;

    client
        .post(&format!("{}/api/quizzes/{}/attempt", address, quiz_a))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    client
        .delete(&format!("{}/api/admin/quizzes/{}", address, quiz_a))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .unwrap();

    let mut attempt = state.attempts.fetch(user_id).await.expect("attempt in store");
    attempt.deadline = chrono::Utc::now() - chrono::Duration::seconds(5);
    state.attempts.save(attempt).await;

    // Act: start the second quiz straight away
    let view: serde_json::Value = client
        .post(&format!("{}/api/quizzes/{}/attempt", address, quiz_b))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Assert: the dead attempt stepped aside without a score
    assert_eq!(view["status"], "in_progress");
    assert_eq!(view["quiz_id"].as_i64().unwrap(), quiz_b);

    let replacement = state.attempts.fetch(user_id).await.expect("attempt in store");
    assert_eq!(replacement.quiz_id, quiz_b);

    let score_rows = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM scores")
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(score_rows, 0);
}

#[tokio::test]
async fn quiz_without_questions_cannot_be_started() {
    // Arrange
    let (address, state) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin = admin_token(&client, &address, &state).await;
    let (quiz_id, _q) = seed_quiz(&client, &address, &admin).await;

    let chapter_id = sqlx::query_scalar::<_, i64>("SELECT chapter_id FROM quizzes WHERE id = ?")
        .bind(quiz_id)
        .fetch_one(&state.pool)
        .await
        .unwrap();
    let empty_quiz: serde_json::Value = client
        .post(&format!("{}/api/admin/quizzes", address))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&serde_json::json!({
            "chapter_id": chapter_id,
            "quiz_name": "Empty Quiz",
            "quiz_duration": "10"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let (_username, token, _user_id) = user_token(&client, &address, &state).await;

    // Act
    let response = client
        .post(&format!(
            "{}/api/quizzes/{}/attempt",
            address,
            empty_quiz["id"].as_i64().unwrap()
        ))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn deleting_subject_cascades_to_scores() {
    // Arrange: one recorded attempt
    let (address, state) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin = admin_token(&client, &address, &state).await;
    let (quiz_id, q) = seed_quiz(&client, &address, &admin).await;
    let (_username, token, _user_id) = user_token(&client, &address, &state).await;

    client
        .post(&format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    let result = answer(&client, &address, &token, quiz_id, Some((q[0], 1)), "submit").await;
    assert_eq!(result["status"], "submitted");

    let subject_id = sqlx::query_scalar::<_, i64>("SELECT id FROM subjects LIMIT 1")
        .fetch_one(&state.pool)
        .await
        .unwrap();

    // Act
    let response = client
        .delete(&format!("{}/api/admin/subjects/{}", address, subject_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    // Assert: the whole tree, scores included, is gone
    for table in ["chapters", "quizzes", "questions", "scores"] {
        let rows = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&state.pool)
            .await
            .unwrap();
        assert_eq!(rows, 0, "{} should be empty after cascade", table);
    }

    // And the dashboards settle back to their zero defaults
    let summary: serde_json::Value = client
        .get(&format!("{}/api/summary/admin", address))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary["total_attempts"], 0);
    assert_eq!(summary["average_score"].as_f64().unwrap(), 0.0);
    assert!(summary["attempts_by_subject"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn admin_summary_reports_population_statistics() {
    // Arrange: two users attempt the same quiz with different results
    let (address, state) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin = admin_token(&client, &address, &state).await;
    let (quiz_id, q) = seed_quiz(&client, &address, &admin).await;

    let (_u1, token1, _id1) = user_token(&client, &address, &state).await;
    client
        .post(&format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token1))
        .send()
        .await
        .unwrap();
    answer(&client, &address, &token1, quiz_id, Some((q[0], 1)), "next").await;
    answer(&client, &address, &token1, quiz_id, Some((q[1], 2)), "next").await;
    let result = answer(&client, &address, &token1, quiz_id, Some((q[2], 3)), "submit").await;
    assert_eq!(result["total_score"], 3);

    let (_u2, token2, _id2) = user_token(&client, &address, &state).await;
    client
        .post(&format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token2))
        .send()
        .await
        .unwrap();
    let result = answer(&client, &address, &token2, quiz_id, Some((q[0], 1)), "submit").await;
    assert_eq!(result["total_score"], 1);

    // Act
    let summary: serde_json::Value = client
        .get(&format!("{}/api/summary/admin", address))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Assert
    assert_eq!(summary["total_users"], 3); // admin + two students
    assert_eq!(summary["total_subjects"], 1);
    assert_eq!(summary["total_quizzes"], 1);
    assert_eq!(summary["total_attempts"], 2);
    assert_eq!(summary["average_score"].as_f64().unwrap(), 2.0);
    assert_eq!(summary["quiz_extremes"][0]["top_score"], 3);
    assert_eq!(summary["quiz_extremes"][0]["lowest_score"], 1);
    assert_eq!(summary["attempts_by_subject"][0]["attempts"], 2);

    // A normal user cannot read the admin summary
    let forbidden = client
        .get(&format!("{}/api/summary/admin", address))
        .header("Authorization", format!("Bearer {}", token1))
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status().as_u16(), 403);
}

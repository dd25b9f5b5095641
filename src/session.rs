// src/session.rs

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Navigation command sent from the quiz-taking form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavDirection {
    Next,
    Prev,
    Submit,
}

/// One user's in-flight pass through a quiz.
///
/// The question order is snapshotted when the attempt begins, so the
/// positional cursor stays meaningful even if an admin edits the quiz
/// mid-attempt. The deadline is fixed at start and never moves; every
/// view recomputes the remaining time against it.
#[derive(Debug, Clone)]
pub struct QuizAttempt {
    pub attempt_id: u64,
    pub user_id: i64,
    pub quiz_id: i64,
    pub quiz_name: String,
    pub duration_minutes: i64,
    /// Snapshot of the quiz's question ids, in presentation order.
    pub question_ids: Vec<i64>,
    /// Zero-based cursor into `question_ids`.
    pub current_index: usize,
    pub started_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    /// question id -> selected option slot (1 to 4).
    pub answers: HashMap<i64, i64>,
}

impl QuizAttempt {
    /// Starts the clock. Reopening the quiz later must reuse the stored
    /// attempt instead of calling this again.
    pub fn begin(
        attempt_id: u64,
        user_id: i64,
        quiz_id: i64,
        quiz_name: String,
        duration_minutes: i64,
        question_ids: Vec<i64>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            attempt_id,
            user_id,
            quiz_id,
            quiz_name,
            duration_minutes,
            question_ids,
            current_index: 0,
            started_at: now,
            deadline: now + Duration::minutes(duration_minutes),
            answers: HashMap::new(),
        }
    }

    /// Seconds left on the clock, clamped at zero.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.deadline - now).num_seconds().max(0)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline
    }

    /// Question id under the cursor.
    pub fn current_question_id(&self) -> Option<i64> {
        self.question_ids.get(self.current_index).copied()
    }

    /// Records (or overwrites) the selected option for a question.
    pub fn record_answer(&mut self, question_id: i64, selected_option: i64) {
        self.answers.insert(question_id, selected_option);
    }

    /// Moves the cursor. `Next` on the last question and `Prev` on the
    /// first are no-ops: the cursor clamps, it never wraps and never
    /// submits implicitly. `Submit` is finalized by the caller and
    /// leaves the cursor alone.
    pub fn navigate(&mut self, direction: NavDirection) {
        match direction {
            NavDirection::Next => {
                if self.current_index + 1 < self.question_ids.len() {
                    self.current_index += 1;
                }
            }
            NavDirection::Prev => {
                self.current_index = self.current_index.saturating_sub(1);
            }
            NavDirection::Submit => {}
        }
    }

    /// Takes the final answer mapping for scoring, leaving the attempt
    /// without any recorded answers.
    pub fn take_answers(&mut self) -> HashMap<i64, i64> {
        std::mem::take(&mut self.answers)
    }

    /// When the store may drop this entry: one extra quiz duration past
    /// the deadline, so a late view still triggers the forced submission
    /// instead of silently losing the attempt.
    fn evict_after(&self) -> DateTime<Utc> {
        self.deadline + Duration::minutes(self.duration_minutes)
    }
}

/// Keyed store for in-flight attempts, at most one per user.
///
/// The seam is async so an external cache could replace the in-process
/// map without touching the handlers.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Returns the user's active attempt. Expired attempts are still
    /// returned within the grace window; the caller finalizes them.
    async fn fetch(&self, user_id: i64) -> Option<QuizAttempt>;

    /// Inserts or replaces the user's active attempt.
    async fn save(&self, attempt: QuizAttempt);

    /// Removes and returns the user's active attempt.
    async fn remove(&self, user_id: i64) -> Option<QuizAttempt>;

    /// Allocates a process-unique attempt identifier.
    fn next_attempt_id(&self) -> u64;
}

/// In-memory implementation backed by a mutexed map.
#[derive(Default)]
pub struct InMemoryAttemptStore {
    attempts: Mutex<HashMap<i64, QuizAttempt>>,
    next_id: AtomicU64,
}

impl InMemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops entries that outlived their grace window.
    fn prune(attempts: &mut HashMap<i64, QuizAttempt>, now: DateTime<Utc>) {
        attempts.retain(|_, attempt| now < attempt.evict_after());
    }
}

#[async_trait]
impl AttemptStore for InMemoryAttemptStore {
    async fn fetch(&self, user_id: i64) -> Option<QuizAttempt> {
        let mut attempts = self.attempts.lock().unwrap();
        Self::prune(&mut attempts, Utc::now());
        attempts.get(&user_id).cloned()
    }

    async fn save(&self, attempt: QuizAttempt) {
        let mut attempts = self.attempts.lock().unwrap();
        Self::prune(&mut attempts, Utc::now());
        attempts.insert(attempt.user_id, attempt);
    }

    async fn remove(&self, user_id: i64) -> Option<QuizAttempt> {
        self.attempts.lock().unwrap().remove(&user_id)
    }

    fn next_attempt_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

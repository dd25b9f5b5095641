// src/scoring.rs

use std::collections::HashMap;

/// Scores one finished attempt against the quiz's answer key.
///
/// Both maps go from question id to option slot. Every submitted answer
/// that exactly matches the key earns one point; unanswered questions
/// earn nothing and cost nothing. Answers for ids missing from the key
/// (e.g. a question deleted mid-attempt) are ignored, so the result
/// always lands in `[0, answer_key.len()]`.
pub fn score_attempt(user_answers: &HashMap<i64, i64>, answer_key: &HashMap<i64, i64>) -> i64 {
    let mut correct_count: i64 = 0;

    for (question_id, selected) in user_answers {
        if let Some(correct) = answer_key.get(question_id) {
            if selected == correct {
                correct_count += 1;
            }
        }
    }

    correct_count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(pairs: &[(i64, i64)]) -> HashMap<i64, i64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_score_partial_credit_counts_exact_matches_only() {
        let answer_key = key(&[(1, 1), (2, 2), (3, 3)]);
        // Question 2 answered wrong, the rest right.
        let user_answers = key(&[(1, 1), (2, 4), (3, 3)]);

        assert_eq!(score_attempt(&user_answers, &answer_key), 2);
    }

    #[test]
    fn test_score_perfect() {
        let answer_key = key(&[(1, 2), (2, 4)]);
        let user_answers = key(&[(1, 2), (2, 4)]);

        assert_eq!(score_attempt(&user_answers, &answer_key), 2);
    }

    #[test]
    fn test_score_no_answers_is_zero() {
        let answer_key = key(&[(1, 1), (2, 2)]);
        let user_answers = HashMap::new();

        assert_eq!(score_attempt(&user_answers, &answer_key), 0);
    }

    #[test]
    fn test_score_unanswered_questions_carry_no_penalty() {
        let answer_key = key(&[(1, 1), (2, 2), (3, 3), (4, 4)]);
        // Only one question attempted, correctly.
        let user_answers = key(&[(3, 3)]);

        assert_eq!(score_attempt(&user_answers, &answer_key), 1);
    }

    #[test]
    fn test_score_ignores_answers_for_unknown_questions() {
        let answer_key = key(&[(1, 1)]);
        // Question 99 was deleted after the attempt started.
        let user_answers = key(&[(1, 1), (99, 1)]);

        assert_eq!(score_attempt(&user_answers, &answer_key), 1);
    }

    #[test]
    fn test_score_never_exceeds_question_count() {
        let answer_key = key(&[(1, 1), (2, 2)]);
        let user_answers = key(&[(1, 1), (2, 2), (3, 3), (4, 4)]);

        let score = score_attempt(&user_answers, &answer_key);
        assert!(score >= 0 && score <= answer_key.len() as i64);
        assert_eq!(score, 2);
    }
}

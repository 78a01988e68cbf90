use std::collections::HashSet;

use uuid::Uuid;

use crate::models::{QuizQuestion, SubmittedAnswer};

/// ScoredAnswer
///
/// One submitted answer after matching against its question: what gets written
/// into a `quiz_answers` row.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredAnswer {
    pub question_id: Uuid,
    pub answer: String,
    pub is_correct: bool,
}

/// SubmissionScore
///
/// The complete scoring outcome for one quiz submission.
#[derive(Debug, Clone)]
pub struct SubmissionScore {
    pub answers: Vec<ScoredAnswer>,
    pub correct: usize,
    pub total_questions: usize,
    // round(correct / total_questions * 100), 0 for an empty quiz.
    pub score: i32,
    pub passed: bool,
}

/// score_submission
///
/// Pure scoring routine used inside the quiz-completion transaction.
///
/// Rules:
/// - Every quiz question counts against the denominator, answered or not.
/// - An answer is correct iff it exactly matches the stored correct answer.
/// - The first submitted answer per question wins; later duplicates are dropped.
/// - Submitted answers that match no question are dropped, with a WARN log
///   (the upstream behavior silently swallowed these; the log makes malformed
///   submissions visible without rejecting the whole attempt).
pub fn score_submission(
    questions: &[QuizQuestion],
    submitted: &[SubmittedAnswer],
    passing_score: i32,
) -> SubmissionScore {
    let mut answers = Vec::with_capacity(submitted.len());
    let mut seen: HashSet<Uuid> = HashSet::new();
    let mut correct = 0usize;

    for sub in submitted {
        let Some(question) = questions.iter().find(|q| q.id == sub.question_id) else {
            tracing::warn!(
                question_id = %sub.question_id,
                "submitted answer matches no question in this quiz, ignoring"
            );
            continue;
        };
        if !seen.insert(sub.question_id) {
            tracing::warn!(
                question_id = %sub.question_id,
                "duplicate answer for question, keeping the first"
            );
            continue;
        }

        let is_correct = question.correct_answer == sub.answer;
        if is_correct {
            correct += 1;
        }
        answers.push(ScoredAnswer {
            question_id: sub.question_id,
            answer: sub.answer.clone(),
            is_correct,
        });
    }

    let total_questions = questions.len();
    let score = if total_questions == 0 {
        0
    } else {
        ((correct as f64 / total_questions as f64) * 100.0).round() as i32
    };

    SubmissionScore {
        answers,
        correct,
        total_questions,
        score,
        passed: score >= passing_score,
    }
}

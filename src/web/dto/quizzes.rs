use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    model::entity::Quiz,
    progress::{ProgressEntry, ProgressMap, QuizState, ScoreResult},
};

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuizListResponse {
    pace: i32,
    quizzes: Vec<QuizListItem>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuizListItem {
    quiz_number: i32,
    question_count: usize,
    state: QuizState,
}

impl QuizListResponse {
    pub fn build(pace: i32, quizzes: &[Quiz], states: Vec<QuizState>) -> Self {
        let quizzes = quizzes
            .iter()
            .zip(states)
            .map(|(quiz, state)| QuizListItem {
                quiz_number: quiz.quiz_number(),
                question_count: quiz.questions().len(),
                state,
            })
            .collect();

        Self { pace, quizzes }
    }
}

/// A question with the answer key stripped. This is the only question shape
/// unpassed quizzes ever serialize.
#[derive(Serialize, utoipa::ToSchema)]
pub struct QuestionView {
    question: String,
    choices: Vec<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuizReview {
    correct_indices: Vec<usize>,
    answers: Vec<i32>,
    completed_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuizResponse {
    quiz_number: i32,
    state: QuizState,
    questions: Vec<QuestionView>,
    /// Present only once the quiz is passed.
    #[serde(skip_serializing_if = "Option::is_none")]
    review: Option<QuizReview>,
}

impl QuizResponse {
    pub fn build(quiz: &Quiz, state: QuizState, entry: Option<&ProgressEntry>) -> Self {
        let questions = quiz
            .questions()
            .iter()
            .map(|q| QuestionView {
                question: q.question.clone(),
                choices: q.choices.clone(),
            })
            .collect();

        let review = match (state, entry) {
            (QuizState::Passed, Some(entry)) => Some(QuizReview {
                correct_indices: quiz.questions().iter().map(|q| q.correct_index).collect(),
                answers: entry.answers.clone(),
                completed_at: entry.completed_at,
            }),
            _ => None,
        };

        Self {
            quiz_number: quiz.quiz_number(),
            state,
            questions,
            review,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct QuizSubmitBody {
    /// One choice index per question, -1 for "no answer".
    pub selections: Vec<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuizSubmitResponse {
    quiz_number: i32,
    correct_count: usize,
    total_questions: usize,
    passed: bool,
    #[schema(value_type = Object)]
    progress: ProgressMap,
}

impl QuizSubmitResponse {
    pub fn new(quiz_number: i32, score: ScoreResult, progress: ProgressMap) -> Self {
        Self {
            quiz_number,
            correct_count: score.correct_count,
            total_questions: score.total_questions,
            passed: score.passed,
            progress,
        }
    }
}

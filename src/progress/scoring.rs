use serde::Serialize;

use crate::progress::{Pace, ProgressError, ProgressResult, QuizQuestion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ScoreResult {
    pub correct_count: usize,
    pub total_questions: usize,
    pub passed: bool,
}

/// Scores one submission against a quiz.
///
/// `selections` must carry exactly one element per question: either a choice
/// index or -1 for "no answer selected". A length mismatch is rejected up
/// front rather than truncated or padded. -1 never scores as correct.
///
/// A zero-question quiz is trivially passed; it never occurs in valid
/// catalog data but must not panic.
pub fn score_submission(
    questions: &[QuizQuestion],
    selections: &[i32],
    pace: Pace,
) -> ProgressResult<ScoreResult> {
    if selections.len() != questions.len() {
        return Err(ProgressError::SelectionCountMismatch {
            expected: questions.len(),
            got: selections.len(),
        });
    }

    let correct_count = questions
        .iter()
        .zip(selections)
        .filter(|&(question, &selected)| {
            selected >= 0 && selected as usize == question.correct_index
        })
        .count();

    let total_questions = questions.len();
    let required = total_questions.saturating_sub(pace.allowed_mistakes());

    Ok(ScoreResult {
        correct_count,
        total_questions,
        passed: correct_count >= required,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn quiz(answers: &[usize]) -> Vec<QuizQuestion> {
        answers
            .iter()
            .map(|&correct_index| QuizQuestion {
                question: String::from("q"),
                choices: vec![String::from("c"); 5],
                correct_index,
            })
            .collect()
    }

    #[test]
    fn rejects_length_mismatch() {
        let questions = quiz(&[0, 1, 2]);
        let err = score_submission(&questions, &[0, 1], Pace::Ten).unwrap_err();
        assert_eq!(
            err,
            ProgressError::SelectionCountMismatch {
                expected: 3,
                got: 2
            }
        );
    }

    #[test]
    fn scoring_is_deterministic() {
        let questions = quiz(&[0, 1, 2, 3, 4]);
        let selections = [0, 1, 0, 3, -1];
        let first = score_submission(&questions, &selections, Pace::Fifteen).unwrap();
        let second = score_submission(&questions, &selections, Pace::Fifteen).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.correct_count, 3);
    }

    #[test]
    fn pace_twenty_requires_perfection() {
        let questions = quiz(&[0, 0, 0, 0, 0]);
        let four_of_five = [0, 0, 0, 0, 1];

        let strict = score_submission(&questions, &four_of_five, Pace::Twenty).unwrap();
        assert_eq!(strict.correct_count, 4);
        assert!(!strict.passed);

        // same submission passes at every compressed pace
        for pace in [Pace::Five, Pace::Ten, Pace::Fifteen] {
            assert!(score_submission(&questions, &four_of_five, pace).unwrap().passed);
        }

        let perfect = [0, 0, 0, 0, 0];
        assert!(score_submission(&questions, &perfect, Pace::Twenty).unwrap().passed);
    }

    #[test]
    fn unanswered_never_counts_as_correct() {
        // a quiz whose correct answer index could collide with the sentinel
        let questions = quiz(&[0, 1]);
        let result = score_submission(&questions, &[-1, -1], Pace::Five).unwrap();
        assert_eq!(result.correct_count, 0);
    }

    #[test]
    fn out_of_range_selection_is_just_wrong() {
        let questions = quiz(&[0]);
        let result = score_submission(&questions, &[9], Pace::Twenty).unwrap();
        assert_eq!(result.correct_count, 0);
        assert!(!result.passed);
    }

    #[test]
    fn empty_quiz_passes_trivially() {
        let result = score_submission(&[], &[], Pace::Twenty).unwrap();
        assert_eq!(result.total_questions, 0);
        assert!(result.passed);
    }
}

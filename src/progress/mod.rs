//! Course progress engine: unlock gating, quiz scoring and the types they
//! operate on. Everything in here is pure; persistence lives in
//! `crate::model` and the handlers in `crate::web` glue the two together.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod scoring;
pub use scoring::{ScoreResult, score_submission};

mod unlock;
pub use unlock::{QuizState, is_unlocked, quiz_state};

pub type ProgressResult<T> = std::result::Result<T, ProgressError>;

#[derive(Debug, Error, PartialEq)]
pub enum ProgressError {
    #[error("submission has {got} selections but the quiz has {expected} questions")]
    SelectionCountMismatch { expected: usize, got: usize },
    #[error("no course pace matches {0}, expected one of 5/10/15/20")]
    UnknownPace(i64),
}

/// Course pace: how many lessons the assigned course contains. Fixed per user
/// once derived from the survey. The per-pace constants mirror the offline
/// course generator and must stay in sync with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Pace {
    Five,
    Ten,
    Fifteen,
    Twenty,
}

impl Pace {
    pub fn lesson_count(self) -> usize {
        match self {
            Self::Five => 5,
            Self::Ten => 10,
            Self::Fifteen => 15,
            Self::Twenty => 20,
        }
    }

    /// Quizzes are 1:1 with lessons at every pace.
    pub fn quiz_count(self) -> usize {
        self.lesson_count()
    }

    /// Slower paces compress more material into each quiz, so the quizzes
    /// get longer as the lesson count shrinks.
    pub fn questions_per_quiz(self) -> usize {
        match self {
            Self::Five => 11,
            Self::Ten => 9,
            Self::Fifteen => 7,
            Self::Twenty => 5,
        }
    }

    pub fn choices_per_question(self) -> usize {
        5
    }

    /// Pass bar. Pace 20 demands a perfect score; the compressed paces
    /// tolerate a single mistake. This asymmetry is product policy, not an
    /// implementation detail.
    pub fn allowed_mistakes(self) -> usize {
        match self {
            Self::Twenty => 0,
            Self::Five | Self::Ten | Self::Fifteen => 1,
        }
    }

    /// Derives the pace from the free-form survey answer, e.g. "10 lessons".
    /// Takes the first run of digits, falling back to 20 when there is none,
    /// then validates against the allowed set.
    pub fn from_survey_answer(answer: &str) -> ProgressResult<Self> {
        let digits: String = answer
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();

        let value: i64 = if digits.is_empty() {
            20
        } else {
            digits.parse().map_err(|_| ProgressError::UnknownPace(-1))?
        };

        Self::try_from(value)
    }
}

impl TryFrom<i64> for Pace {
    type Error = ProgressError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            5 => Ok(Self::Five),
            10 => Ok(Self::Ten),
            15 => Ok(Self::Fifteen),
            20 => Ok(Self::Twenty),
            other => Err(ProgressError::UnknownPace(other)),
        }
    }
}

impl From<Pace> for i64 {
    fn from(pace: Pace) -> Self {
        pace.lesson_count() as i64
    }
}

impl std::fmt::Display for Pace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lesson_count())
    }
}

/// One quiz question as produced by the offline generator.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuizQuestion {
    pub question: String,
    pub choices: Vec<String>,
    pub correct_index: usize,
}

/// The persisted outcome of one quiz for one user. Deserialization is
/// lenient: a malformed entry with a missing `passed` field reads as not
/// passed, so bad data locks content instead of unlocking it.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProgressEntry {
    #[serde(default)]
    pub passed: bool,
    /// One selected choice index per question; -1 marks "no answer".
    #[serde(default)]
    pub answers: Vec<i32>,
    #[serde(default)]
    pub pace: i64,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Full progress snapshot for one user, keyed by quiz number.
pub type ProgressMap = BTreeMap<i32, ProgressEntry>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pace_round_trip() {
        for value in [5i64, 10, 15, 20] {
            let pace = Pace::try_from(value).unwrap();
            assert_eq!(i64::from(pace), value);
        }
        assert_eq!(Pace::try_from(7), Err(ProgressError::UnknownPace(7)));
    }

    #[test]
    fn pace_from_survey_answer() {
        assert_eq!(Pace::from_survey_answer("10 lessons"), Ok(Pace::Ten));
        assert_eq!(Pace::from_survey_answer("I prefer 5 lessons"), Ok(Pace::Five));
        // no digits means the most granular course
        assert_eq!(Pace::from_survey_answer("whatever"), Ok(Pace::Twenty));
        assert_eq!(
            Pace::from_survey_answer("42 lessons"),
            Err(ProgressError::UnknownPace(42))
        );
    }

    #[test]
    fn malformed_entry_reads_as_not_passed() {
        let entry: ProgressEntry = serde_json::from_str("{}").unwrap();
        assert!(!entry.passed);
        assert!(entry.answers.is_empty());
        assert!(entry.completed_at.is_none());
    }
}

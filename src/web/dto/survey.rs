use serde::{Deserialize, Serialize};

use crate::model::entity::SurveyResponse;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SurveySaveBody {
    pub study_focus: String,
    pub confidence_level: String,
    pub goals: Vec<String>,
    pub situation: String,
    /// Free-form answer from the pace screen, e.g. "10 lessons".
    pub preferred_pace: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SurveyBody {
    study_focus: String,
    confidence_level: String,
    goals: Vec<String>,
    situation: String,
    pace: i32,
}

impl From<SurveyResponse> for SurveyBody {
    fn from(survey: SurveyResponse) -> Self {
        Self {
            study_focus: survey.study_focus().to_string(),
            confidence_level: survey.confidence_level().to_string(),
            goals: survey.goals().to_vec(),
            situation: survey.situation().to_string(),
            pace: survey.pace(),
        }
    }
}

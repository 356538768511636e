use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

/// The five-screen onboarding survey, one row per user. The pace column is
/// the derived course assignment and is only ever written here — quiz
/// submissions read it, they never change it.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct SurveyResponse {
    id: Uuid,
    user_id: Uuid,
    study_focus: String,
    confidence_level: String,
    #[schema(value_type = Vec<String>)]
    goals: Json<Vec<String>>,
    situation: String,
    pace: i32,
    updated_at: DateTime<Utc>,
}

impl ResourceTyped for SurveyResponse {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Survey
    }
}

impl SurveyResponse {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn study_focus(&self) -> &str {
        &self.study_focus
    }

    pub fn confidence_level(&self) -> &str {
        &self.confidence_level
    }

    pub fn goals(&self) -> &[String] {
        &self.goals.0
    }

    pub fn situation(&self) -> &str {
        &self.situation
    }

    pub fn pace(&self) -> i32 {
        self.pace
    }
}

pub struct SurveyResponseUpsert {
    pub user_id: Uuid,
    pub study_focus: String,
    pub confidence_level: String,
    pub goals: Vec<String>,
    pub situation: String,
    pub pace: i32,
}

impl SurveyResponse {
    /// Retaking the survey replaces the previous answers wholesale.
    pub async fn upsert(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: SurveyResponseUpsert,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO survey_responses (id, user_id, study_focus, confidence_level, goals, situation, pace, updated_at)
            VALUES ($1,$2,$3,$4,$5,$6,$7,now())
            ON CONFLICT (user_id) DO UPDATE SET
                study_focus = EXCLUDED.study_focus,
                confidence_level = EXCLUDED.confidence_level,
                goals = EXCLUDED.goals,
                situation = EXCLUDED.situation,
                pace = EXCLUDED.pace,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(&data.study_focus)
        .bind(&data.confidence_level)
        .bind(Json(&data.goals))
        .bind(&data.situation)
        .bind(data.pace)
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }

    pub async fn find_by_user(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        user_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM survey_responses WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }
}

#[async_trait]
impl HasOwner for SurveyResponse {
    type OwnerId = uuid::Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.user_id)
    }
}

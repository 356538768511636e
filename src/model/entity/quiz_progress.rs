use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::progress::{ProgressEntry, ProgressMap};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

/// The Progress Store: one row per (user, quiz number) holding the latest
/// submission outcome. Rows are overwritten, never deleted.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct QuizProgress {
    id: Uuid,
    user_id: Uuid,
    quiz_number: i32,
    passed: bool,
    #[schema(value_type = Vec<i32>)]
    answers: Json<Vec<i32>>,
    pace: i32,
    completed_at: DateTime<Utc>,
}

impl ResourceTyped for QuizProgress {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::QuizProgress
    }
}

impl QuizProgress {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn quiz_number(&self) -> i32 {
        self.quiz_number
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn answers(&self) -> &[i32] {
        &self.answers.0
    }

    pub fn pace(&self) -> i32 {
        self.pace
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    pub fn into_entry(self) -> (i32, ProgressEntry) {
        (
            self.quiz_number,
            ProgressEntry {
                passed: self.passed,
                answers: self.answers.0,
                pace: self.pace as i64,
                completed_at: Some(self.completed_at),
            },
        )
    }
}

pub struct QuizProgressUpsert {
    pub user_id: Uuid,
    pub quiz_number: i32,
    pub passed: bool,
    pub answers: Vec<i32>,
    pub pace: i32,
}

impl QuizProgress {
    /// Last-write-wins overwrite of the (user, quiz) slot. The single upsert
    /// statement keeps the write atomic per key: a concurrent read sees the
    /// old row or the new one, never a half-updated mix. Deliberately does
    /// not refuse to overwrite a passed row — the submit route enforces the
    /// no-resubmission rule at the boundary.
    pub async fn upsert(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuizProgressUpsert,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO quiz_progress (id, user_id, quiz_number, passed, answers, pace, completed_at)
            VALUES ($1,$2,$3,$4,$5,$6,now())
            ON CONFLICT (user_id, quiz_number) DO UPDATE SET
                passed = EXCLUDED.passed,
                answers = EXCLUDED.answers,
                pace = EXCLUDED.pace,
                completed_at = now()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(data.quiz_number)
        .bind(data.passed)
        .bind(Json(&data.answers))
        .bind(data.pace)
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }

    /// Materializes the user's full progress snapshot for the engine.
    pub async fn map_for_user(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
    ) -> DatabaseResult<ProgressMap> {
        let rows: Vec<QuizProgress> =
            sqlx::query_as("SELECT * FROM quiz_progress WHERE user_id = $1")
                .bind(actor.user_id())
                .fetch_all(mm.executor())
                .await?;

        Ok(rows.into_iter().map(QuizProgress::into_entry).collect())
    }

    pub async fn find_by_quiz(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        quiz_number: i32,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM quiz_progress WHERE user_id = $1 AND quiz_number = $2",
        )
        .bind(actor.user_id())
        .bind(quiz_number)
        .fetch_optional(mm.executor())
        .await?;
        Ok(result)
    }
}

#[async_trait]
impl HasOwner for QuizProgress {
    type OwnerId = uuid::Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.user_id)
    }
}

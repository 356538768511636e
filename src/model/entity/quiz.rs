use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::progress::QuizQuestion;
use crate::web::AuthenticatedUser;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::prelude::Row;
use sqlx::types::Json;
use uuid::Uuid;

/// One quiz of the catalog. Questions are stored as one jsonb document, the
/// same shape the offline generator emits.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Quiz {
    id: Uuid,
    course_id: Uuid,
    quiz_number: i32,
    #[schema(value_type = Vec<QuizQuestion>)]
    questions: Json<Vec<QuizQuestion>>,
}

impl ResourceTyped for Quiz {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Quiz
    }
}

impl Quiz {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    /// 1-indexed, aligned with the lesson of the same number.
    pub fn quiz_number(&self) -> i32 {
        self.quiz_number
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions.0
    }
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct QuizCreate {
    pub course_id: Uuid,
    pub quiz_number: i32,
    pub questions: Vec<QuizQuestion>,
}

impl Quiz {
    pub async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuizCreate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query(
            "INSERT INTO quizzes (id, course_id, quiz_number, questions) VALUES ($1,$2,$3,$4) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(data.course_id)
        .bind(data.quiz_number)
        .bind(Json(&data.questions))
        .fetch_one(mm.executor())
        .await?;

        let id = result.try_get("id")?;
        Ok(Quiz {
            id,
            course_id: data.course_id,
            quiz_number: data.quiz_number,
            questions: Json(data.questions),
        })
    }

    pub async fn find_by_number(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        course_id: Uuid,
        quiz_number: i32,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM quizzes WHERE course_id = $1 AND quiz_number = $2",
        )
        .bind(course_id)
        .bind(quiz_number)
        .fetch_optional(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn all_by_course(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM quizzes WHERE course_id = $1 ORDER BY quiz_number",
        )
        .bind(course_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn count_by_course(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quizzes WHERE course_id = $1")
            .bind(course_id)
            .fetch_one(mm.executor())
            .await?;
        Ok(result)
    }
}

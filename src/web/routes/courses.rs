use axum::{
    Json, Router, extract::State, http::StatusCode, middleware, response::IntoResponse,
    routing::get,
};

use crate::{
    model::{
        ModelManager, ResourceTyped,
        entity::{Course, Lesson, SurveyResponse},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::courses::CourseResponse, error::ErrorResponse, middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/me", get(course_me_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

/// Resolves the caller's assigned course through their survey pace. Shared
/// by the course and quiz routes.
pub(super) async fn assigned_course(
    mm: &ModelManager,
    user: &AuthenticatedUser,
) -> WebResult<(SurveyResponse, Course)> {
    let survey = SurveyResponse::find_by_user(mm, user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(SurveyResponse::get_resource_type(), e))?;

    let survey = match survey {
        Some(survey) => survey,
        None => {
            return Err(WebError::resource_not_found(
                SurveyResponse::get_resource_type(),
            ));
        }
    };

    let course = Course::find_by_pace(mm, user, survey.pace())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    let course = match course {
        Some(course) => course,
        None => return Err(WebError::resource_not_found(Course::get_resource_type())),
    };

    Ok((survey, course))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/me",
    description = "Returns the caller's course with per-lesson unlock status",
    responses(
        (status = 200, description = "The assigned course", body = CourseResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 404, description = "Survey not taken or no course for the pace", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("cookie" = [])
    )
)]
pub async fn course_me_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let (_, course) = assigned_course(state.pool(), user).await?;

    let lessons = Lesson::all_by_course(state.pool(), user, course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    let progress = crate::model::entity::QuizProgress::map_for_user(state.pool(), user)
        .await
        .map_err(|e| {
            WebError::resource_fetch_error(
                crate::model::entity::QuizProgress::get_resource_type(),
                e,
            )
        })?;

    Ok((
        StatusCode::OK,
        Json(CourseResponse::build(&course, lessons, &progress)),
    ))
}

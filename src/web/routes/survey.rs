use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::post,
};

use crate::{
    model::{
        ResourceTyped,
        entity::{SurveyResponse, SurveyResponseUpsert},
    },
    progress::Pace,
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::survey::{SurveyBody, SurveySaveBody},
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", post(survey_save_handler).get(survey_get_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/survey/",
    request_body = SurveySaveBody,
    description = "Saves the onboarding survey and assigns the course pace",
    responses(
        (status = 200, description = "Survey saved", body = SurveyBody),
        (status = 400, description = "Pace answer did not match any course", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "survey",
    security(
        ("cookie" = [])
    )
)]
pub async fn survey_save_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<SurveySaveBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let pace =
        Pace::from_survey_answer(&payload.preferred_pace).map_err(WebError::submission_invalid)?;

    let saved = SurveyResponse::upsert(
        state.pool(),
        user,
        SurveyResponseUpsert {
            user_id: user.user_id(),
            study_focus: payload.study_focus,
            confidence_level: payload.confidence_level,
            goals: payload.goals,
            situation: payload.situation,
            pace: pace.lesson_count() as i32,
        },
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(SurveyResponse::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(SurveyBody::from(saved))))
}

#[utoipa::path(
    get,
    path = "/api/v1/survey/",
    description = "Returns the caller's survey answers",
    responses(
        (status = 200, description = "Survey answers", body = SurveyBody),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 404, description = "Survey not taken yet", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "survey",
    security(
        ("cookie" = [])
    )
)]
pub async fn survey_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let survey = SurveyResponse::find_by_user(state.pool(), user, user.user_id())
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

    Ok((StatusCode::OK, Json(SurveyBody::from(survey))))
}

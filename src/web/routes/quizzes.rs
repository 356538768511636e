use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};

use crate::{
    model::{
        ResourceTyped,
        entity::{Quiz, QuizProgress, QuizProgressUpsert},
    },
    progress::{Pace, QuizState, quiz_state, score_submission},
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::quizzes::{QuizListResponse, QuizResponse, QuizSubmitBody, QuizSubmitResponse},
        error::ErrorResponse,
        middlewares,
        routes::courses::assigned_course,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(quiz_list_handler))
        .route("/progress", get(quiz_progress_handler))
        .route("/{quiz_number}", get(quiz_get_handler))
        .route("/{quiz_number}/submit", post(quiz_submit_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/quizzes/",
    description = "Lists the caller's quizzes with their unlock state",
    responses(
        (status = 200, description = "Quiz overview", body = QuizListResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 404, description = "Survey not taken or no course for the pace", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "quizzes",
    security(
        ("cookie" = [])
    )
)]
pub async fn quiz_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let (survey, course) = assigned_course(state.pool(), user).await?;

    let quizzes = Quiz::all_by_course(state.pool(), user, course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?;

    let progress = QuizProgress::map_for_user(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(QuizProgress::get_resource_type(), e))?;

    let states = quizzes
        .iter()
        .map(|quiz| quiz_state(quiz.quiz_number(), &progress))
        .collect();

    Ok((
        StatusCode::OK,
        Json(QuizListResponse::build(survey.pace(), &quizzes, states)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/quizzes/{quiz_number}",
    description = "Returns one quiz; questions never include the answer key, a passed quiz adds a review block",
    responses(
        (status = 200, description = "The quiz", body = QuizResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Quiz is still locked", body = ErrorResponse),
        (status = 404, description = "No such quiz", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "quizzes",
    security(
        ("cookie" = [])
    )
)]
pub async fn quiz_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(quiz_number): Path<i32>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let (_, course) = assigned_course(state.pool(), user).await?;

    let quiz = Quiz::find_by_number(state.pool(), user, course.id(), quiz_number)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?;

    let quiz = match quiz {
        Some(quiz) => quiz,
        None => return Err(WebError::resource_not_found(Quiz::get_resource_type())),
    };

    let progress = QuizProgress::map_for_user(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(QuizProgress::get_resource_type(), e))?;

    let state_now = quiz_state(quiz_number, &progress);
    if state_now == QuizState::Locked {
        return Err(WebError::quiz_locked(quiz_number));
    }

    let entry = progress.get(&quiz_number);
    Ok((
        StatusCode::OK,
        Json(QuizResponse::build(&quiz, state_now, entry)),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/quizzes/{quiz_number}/submit",
    request_body = QuizSubmitBody,
    description = "Scores a submission, records the outcome and returns the fresh progress snapshot",
    responses(
        (status = 200, description = "Submission scored", body = QuizSubmitResponse),
        (status = 400, description = "Selection count does not match the question count", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Quiz is still locked", body = ErrorResponse),
        (status = 404, description = "No such quiz", body = ErrorResponse),
        (status = 409, description = "Quiz already passed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "quizzes",
    security(
        ("cookie" = [])
    )
)]
pub async fn quiz_submit_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(quiz_number): Path<i32>,
    Json(payload): Json<QuizSubmitBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let (survey, course) = assigned_course(state.pool(), user).await?;
    let pace = Pace::try_from(survey.pace() as i64).map_err(WebError::submission_invalid)?;

    let quiz = Quiz::find_by_number(state.pool(), user, course.id(), quiz_number)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?;

    let quiz = match quiz {
        Some(quiz) => quiz,
        None => return Err(WebError::resource_not_found(Quiz::get_resource_type())),
    };

    let progress = QuizProgress::map_for_user(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(QuizProgress::get_resource_type(), e))?;

    match quiz_state(quiz_number, &progress) {
        QuizState::Locked => return Err(WebError::quiz_locked(quiz_number)),
        QuizState::Passed => return Err(WebError::quiz_already_passed(quiz_number)),
        QuizState::Unlocked | QuizState::Failed => {}
    }

    // Validation happens before anything is written; a rejected submission
    // leaves the stored progress untouched.
    let score = score_submission(quiz.questions(), &payload.selections, pace)
        .map_err(WebError::submission_invalid)?;

    QuizProgress::upsert(
        state.pool(),
        user,
        QuizProgressUpsert {
            user_id: user.user_id(),
            quiz_number,
            passed: score.passed,
            answers: payload.selections,
            pace: survey.pace(),
        },
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(QuizProgress::get_resource_type(), e))?;

    // Re-read so the response reflects exactly what was persisted.
    let progress = QuizProgress::map_for_user(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(QuizProgress::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(QuizSubmitResponse::new(quiz_number, score, progress)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/quizzes/progress",
    description = "Returns the caller's full progress snapshot keyed by quiz number",
    responses(
        (status = 200, description = "Progress snapshot"),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "quizzes",
    security(
        ("cookie" = [])
    )
)]
pub async fn quiz_progress_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let progress = QuizProgress::map_for_user(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(QuizProgress::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(progress)))
}

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        common::ActionResponse,
        question::{AnswerResolution, OpenQuestionRequest, QuestionView, SubmitAnswerRequest},
    },
    error::AppError,
    services::question_service,
    state::SharedState,
};

/// Routes driving the live question view: open, reveal, turn control, answer
/// resolution, and close.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games/{id}/questions/open", post(open_question))
        .route("/question", get(current_question))
        .route("/question/reveal", post(reveal_answer))
        .route("/question/switch", post(switch_team))
        .route("/question/renew", post(renew_clock))
        .route("/question/answer", post(submit_answer))
        .route("/question/close", post(close_question))
}

#[utoipa::path(
    post,
    path = "/games/{id}/questions/open",
    tag = "question",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    request_body = OpenQuestionRequest,
    responses(
        (status = 200, description = "Question view opened", body = QuestionView),
        (status = 404, description = "Game or question not found")
    )
)]
/// Open a question view and start the countdown for the active team.
pub async fn open_question(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<OpenQuestionRequest>>,
) -> Result<Json<QuestionView>, AppError> {
    let view = question_service::open_question(&state, id, payload).await?;
    Ok(Json(view))
}

#[utoipa::path(
    get,
    path = "/question",
    tag = "question",
    responses(
        (status = 200, description = "Current question view", body = QuestionView),
        (status = 404, description = "No question is open")
    )
)]
/// Projection of the question currently on screen.
pub async fn current_question(
    State(state): State<SharedState>,
) -> Result<Json<QuestionView>, AppError> {
    let view = question_service::current_view(&state).await?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/question/reveal",
    tag = "question",
    responses(
        (status = 200, description = "Answer revealed", body = QuestionView),
        (status = 409, description = "No question is open")
    )
)]
/// Reveal the answer. The countdown keeps running.
pub async fn reveal_answer(
    State(state): State<SharedState>,
) -> Result<Json<QuestionView>, AppError> {
    let view = question_service::reveal_answer(&state).await?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/question/switch",
    tag = "question",
    responses(
        (status = 200, description = "Turn passed to the next team", body = QuestionView),
        (status = 409, description = "No question is open")
    )
)]
/// Pass the turn to the next team.
pub async fn switch_team(State(state): State<SharedState>) -> Result<Json<QuestionView>, AppError> {
    let view = question_service::switch_team(&state).await?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/question/renew",
    tag = "question",
    responses(
        (status = 200, description = "Countdown restarted", body = QuestionView),
        (status = 409, description = "No question is open")
    )
)]
/// Restart the countdown for the current turn without advancing it.
pub async fn renew_clock(State(state): State<SharedState>) -> Result<Json<QuestionView>, AppError> {
    let view = question_service::renew_clock(&state).await?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/question/answer",
    tag = "question",
    request_body = SubmitAnswerRequest,
    responses(
        (status = 200, description = "Answer resolved", body = AnswerResolution),
        (status = 409, description = "No answer can be submitted in the current phase")
    )
)]
/// Resolve an answer attempt exactly once.
pub async fn submit_answer(
    State(state): State<SharedState>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<Json<AnswerResolution>, AppError> {
    let resolution = question_service::submit_answer(&state, payload).await?;
    Ok(Json(resolution))
}

#[utoipa::path(
    post,
    path = "/question/close",
    tag = "question",
    responses((status = 200, description = "Question view closed", body = ActionResponse))
)]
/// Close the question view and return to the board.
pub async fn close_question(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    let ack = question_service::close_question(&state).await?;
    Ok(Json(ack))
}

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::round::{AnswerRequest, AnswerResponse, JoinRequest, JoinResponse, StatusResponse},
    error::AppError,
    services::round_service,
    state::SharedState,
};

/// Routes handling the player-facing round operations.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/status", get(status))
        .route("/join", post(join))
        .route("/answer", post(answer))
}

/// Return the public snapshot of the current round.
#[utoipa::path(
    get,
    path = "/status",
    tag = "round",
    responses(
        (status = 200, description = "Current round snapshot", body = StatusResponse)
    )
)]
pub async fn status(State(state): State<SharedState>) -> Json<StatusResponse> {
    Json(round_service::get_status(&state).await)
}

/// Enter the current round while its join window is open.
#[utoipa::path(
    post,
    path = "/join",
    tag = "round",
    request_body = JoinRequest,
    responses(
        (status = 200, description = "Player joined, or was already in", body = JoinResponse),
        (status = 400, description = "Invalid player name"),
        (status = 409, description = "Join window is closed")
    )
)]
pub async fn join(
    State(state): State<SharedState>,
    Json(payload): Json<JoinRequest>,
) -> Result<Json<JoinResponse>, AppError> {
    payload.validate()?;
    let response = round_service::join(&state, payload).await?;
    Ok(Json(response))
}

/// Submit an answer to the live question.
#[utoipa::path(
    post,
    path = "/answer",
    tag = "round",
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Answer recorded, or previous outcome echoed", body = AnswerResponse),
        (status = 400, description = "No option supplied"),
        (status = 404, description = "Player never joined this round"),
        (status = 409, description = "No question is currently live")
    )
)]
pub async fn answer(
    State(state): State<SharedState>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    let response = round_service::submit_answer(&state, payload).await?;
    Ok(Json(response))
}

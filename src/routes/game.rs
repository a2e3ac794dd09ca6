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
        game::{CreateGameRequest, GameListItem, GameResults, GameSettingsView, GameSummary},
    },
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Routes handling game bootstrap, listing, and completion.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", get(list_games).post(create_game))
        .route("/games/{id}", get(get_game))
        .route("/games/{id}/results", get(get_results))
        .route("/games/{id}/end", post(end_game))
        .route("/games/{id}/save-state", post(save_state))
        .route("/settings", get(get_settings))
}

#[utoipa::path(
    post,
    path = "/games",
    tag = "game",
    request_body = CreateGameRequest,
    responses(
        (status = 200, description = "Game created", body = GameSummary)
    )
)]
/// Create a fresh game definition and persist it.
pub async fn create_game(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateGameRequest>>,
) -> Result<Json<GameSummary>, AppError> {
    let summary = game_service::create_game(&state, payload).await?;
    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/games",
    tag = "game",
    responses((status = 200, description = "Stored games", body = [GameListItem]))
)]
/// List stored games.
pub async fn list_games(
    State(state): State<SharedState>,
) -> Result<Json<Vec<GameListItem>>, AppError> {
    let games = game_service::list_games(&state).await?;
    Ok(Json(games))
}

#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "game",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Durable board state", body = GameSummary),
        (status = 404, description = "Game not found")
    )
)]
/// Fetch a game's durable state (teams, scores, current team, ledgers).
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameSummary>, AppError> {
    let summary = game_service::get_game(&state, id).await?;
    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/games/{id}/results",
    tag = "game",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Final standings", body = GameResults),
        (status = 404, description = "Game not found")
    )
)]
/// Final standings for a game.
pub async fn get_results(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameResults>, AppError> {
    let results = game_service::get_results(&state, id).await?;
    Ok(Json(results))
}

#[utoipa::path(
    post,
    path = "/games/{id}/end",
    tag = "game",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Game completed", body = GameResults),
        (status = 404, description = "Game not found")
    )
)]
/// Complete a game and record the winner.
pub async fn end_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameResults>, AppError> {
    let results = game_service::end_game(&state, id).await?;
    Ok(Json(results))
}

#[utoipa::path(
    post,
    path = "/games/{id}/save-state",
    tag = "game",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses((status = 200, description = "State saved", body = ActionResponse))
)]
/// Persist the in-memory game mirror so progress survives navigation.
pub async fn save_state(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResponse>, AppError> {
    let ack = game_service::save_state(&state, id).await?;
    Ok(Json(ack))
}

#[utoipa::path(
    get,
    path = "/settings",
    tag = "game",
    responses((status = 200, description = "Stored game settings", body = GameSettingsView))
)]
/// Stored game settings, read-only.
pub async fn get_settings(
    State(state): State<SharedState>,
) -> Result<Json<GameSettingsView>, AppError> {
    let settings = game_service::get_settings(&state).await?;
    Ok(Json(settings))
}

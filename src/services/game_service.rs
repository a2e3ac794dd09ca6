//! Game bootstrap, completion, and settings operations surrounding the live
//! question flow.

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::models::GameSettingsEntity,
    dto::{
        common::ActionResponse,
        game::{
            CreateGameRequest, GameListItem, GameResults, GameSettingsView, GameSummary,
            TeamResult,
        },
    },
    error::ServiceError,
    services::sse_events,
    state::{
        SharedState,
        game::{GameSession, Team},
        turn::AnswerTimes,
    },
};

/// Create a new game, persist it, and prime the in-memory mirror.
pub async fn create_game(
    state: &SharedState,
    request: CreateGameRequest,
) -> Result<GameSummary, ServiceError> {
    let store = state.require_game_store().await?;
    let settings = store.load_settings().await?.unwrap_or_default();

    let game = build_game_session(state, request, &settings)?;
    store.save_game(game.clone().into()).await?;
    info!(game_id = %game.id, teams = game.teams.len(), "created game");

    {
        let mut slot = state.current_game().write().await;
        *slot = Some(game.clone());
    }
    sse_events::broadcast_game_session(state, &game);

    Ok(game.into())
}

/// Fetch a game's durable state (the board view).
pub async fn get_game(state: &SharedState, id: Uuid) -> Result<GameSummary, ServiceError> {
    let store = state.require_game_store().await?;
    let Some(entity) = store.find_game(id).await? else {
        return Err(ServiceError::NotFound(format!("game `{id}` not found")));
    };

    let session: GameSession = entity.into();
    Ok(session.into())
}

/// List stored games.
pub async fn list_games(state: &SharedState) -> Result<Vec<GameListItem>, ServiceError> {
    let store = state.require_game_store().await?;
    let games = store.list_games().await?;
    Ok(games.into_iter().map(Into::into).collect())
}

/// Complete a game: compute the winner, persist it, and shut down any
/// question view still open for it.
pub async fn end_game(state: &SharedState, id: Uuid) -> Result<GameResults, ServiceError> {
    let store = state.require_game_store().await?;
    let Some(entity) = store.find_game(id).await? else {
        return Err(ServiceError::NotFound(format!("game `{id}` not found")));
    };

    let mut game: GameSession = entity.into();
    let winner_index = game.leading_team_index();
    store.complete_game(id, winner_index).await?;
    game.is_completed = true;
    game.winner_index = Some(winner_index);

    // A question left open for this game ends with it.
    {
        let mut question = state.question().write().await;
        if question.as_ref().is_some_and(|session| session.game_id() == id) {
            question.take();
            sse_events::broadcast_question_closed(state, id);
        }
    }

    {
        let mut mirror = state.current_game().write().await;
        if mirror.as_ref().is_some_and(|current| current.id == id) {
            *mirror = Some(game.clone());
        }
    }

    let winning_team = game
        .teams
        .get(winner_index)
        .map(|team| team.name.clone())
        .unwrap_or_default();
    sse_events::broadcast_game_completed(state, id, winner_index, winning_team);
    info!(game_id = %id, winner_index, "game completed");

    Ok(build_results(game, winner_index))
}

/// Final standings for a game. Completed games keep their stored winner;
/// in-progress games report the current leader.
pub async fn get_results(state: &SharedState, id: Uuid) -> Result<GameResults, ServiceError> {
    let store = state.require_game_store().await?;
    let Some(entity) = store.find_game(id).await? else {
        return Err(ServiceError::NotFound(format!("game `{id}` not found")));
    };

    let game: GameSession = entity.into();
    let winner_index = game.winner_index.unwrap_or_else(|| game.leading_team_index());
    Ok(build_results(game, winner_index))
}

/// Persist the in-memory game mirror so progress survives navigation.
pub async fn save_state(state: &SharedState, id: Uuid) -> Result<ActionResponse, ServiceError> {
    let matches = {
        let mirror = state.current_game().read().await;
        mirror.as_ref().is_some_and(|game| game.id == id)
    };

    if matches {
        if let Err(err) = state.persist_current_game().await {
            warn!(game_id = %id, error = %err, "failed to save game state");
            return Err(err);
        }
    }

    Ok(ActionResponse::new("saved"))
}

/// Stored game settings, read-only.
pub async fn get_settings(state: &SharedState) -> Result<GameSettingsView, ServiceError> {
    let store = state.require_game_store().await?;
    let settings = store.load_settings().await?.unwrap_or_default();
    Ok(settings.into())
}

fn build_game_session(
    state: &SharedState,
    request: CreateGameRequest,
    settings: &GameSettingsEntity,
) -> Result<GameSession, ServiceError> {
    let CreateGameRequest {
        name,
        logo_url,
        teams,
        selected_categories,
        answer_time_first,
        answer_time_second,
        answer_time_third,
        answer_time_fourth,
    } = request;

    if teams.len() < settings.min_teams || teams.len() > settings.max_teams {
        return Err(ServiceError::InvalidInput(format!(
            "a game requires between {} and {} teams",
            settings.min_teams, settings.max_teams
        )));
    }

    if selected_categories.len() < settings.min_categories
        || selected_categories.len() > settings.max_categories
    {
        return Err(ServiceError::InvalidInput(format!(
            "a game requires between {} and {} categories",
            settings.min_categories, settings.max_categories
        )));
    }

    let defaults = AnswerTimes::from_settings(settings);
    let answer_times = AnswerTimes {
        first: answer_time_first.unwrap_or(defaults.first),
        second: answer_time_second.unwrap_or(defaults.second),
        third: answer_time_third.or(defaults.third),
        fourth: answer_time_fourth.or(defaults.fourth),
    };

    let teams = teams
        .into_iter()
        .enumerate()
        .map(|(index, team)| Team {
            id: Uuid::new_v4(),
            name: team.name,
            color: state.config().team_color_for(index),
            score: 0,
        })
        .collect();

    Ok(GameSession::new(
        name,
        logo_url,
        teams,
        selected_categories,
        answer_times,
    ))
}

fn build_results(game: GameSession, winner_index: usize) -> GameResults {
    let winning_team = game
        .teams
        .get(winner_index)
        .map(|team| team.name.clone())
        .unwrap_or_default();

    GameResults {
        id: game.id,
        name: game.name,
        teams: game
            .teams
            .into_iter()
            .enumerate()
            .map(|(index, team)| TeamResult {
                id: team.id,
                name: team.name,
                color: team.color,
                score: team.score,
                is_winner: index == winner_index,
            })
            .collect(),
        winning_team,
        is_completed: game.is_completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dao::game_store::{GameStore, memory::MemoryGameStore},
        dto::game::TeamInput,
        state::AppState,
    };
    use std::sync::Arc;

    fn request(teams: usize, categories: usize) -> CreateGameRequest {
        CreateGameRequest {
            name: "quiz night".into(),
            logo_url: None,
            teams: (0..teams)
                .map(|index| TeamInput {
                    name: format!("team {index}"),
                })
                .collect(),
            selected_categories: (1..=categories as u32).collect(),
            answer_time_first: None,
            answer_time_second: None,
            answer_time_third: None,
            answer_time_fourth: None,
        }
    }

    #[tokio::test]
    async fn create_game_applies_settings_defaults_and_colors() {
        let state = AppState::new(AppConfig::default());
        state
            .install_game_store(Arc::new(MemoryGameStore::new()))
            .await;

        let summary = create_game(&state, request(2, 4)).await.unwrap();
        assert_eq!(summary.teams.len(), 2);
        assert_eq!(summary.answer_times.first, 30);
        assert_eq!(summary.answer_times.second, 15);
        assert_eq!(summary.current_team_index, 0);
        assert_ne!(summary.teams[0].color, summary.teams[1].color);
        assert!(summary.teams.iter().all(|team| team.score == 0));
    }

    #[tokio::test]
    async fn create_game_rejects_rosters_outside_the_limits() {
        let state = AppState::new(AppConfig::default());
        state
            .install_game_store(Arc::new(MemoryGameStore::new()))
            .await;

        let too_few = create_game(&state, request(1, 4)).await;
        assert!(matches!(too_few, Err(ServiceError::InvalidInput(_))));

        let too_many_categories = create_game(&state, request(2, 9)).await;
        assert!(matches!(
            too_many_categories,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn end_game_stores_the_leading_team_as_winner() {
        let state = AppState::new(AppConfig::default());
        let store = Arc::new(MemoryGameStore::new());
        state.install_game_store(store.clone()).await;

        let summary = create_game(&state, request(3, 4)).await.unwrap();
        let game_id = summary.id;

        // Put team 1 in the lead through the durable store.
        let mut entity = store.find_game(game_id).await.unwrap().unwrap();
        entity.teams[1].score = 4;
        store.save_game(entity).await.unwrap();

        let results = end_game(&state, game_id).await.unwrap();
        assert!(results.is_completed);
        assert!(results.teams[1].is_winner);
        assert_eq!(results.winning_team, results.teams[1].name);

        let stored = store.find_game(game_id).await.unwrap().unwrap();
        assert!(stored.is_completed);
        assert_eq!(stored.winner_index, Some(1));
    }
}

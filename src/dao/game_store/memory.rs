use std::time::SystemTime;

use dashmap::DashMap;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::dao::{
    game_store::GameStore,
    models::{
        AnswerOutcome, AnsweredQuestionEntity, GameEntity, GameListItemEntity, GameSettingsEntity,
        QuestionEntity, QuestionSlotKey,
    },
    storage::StorageResult,
};

/// In-memory [`GameStore`] backend.
///
/// Used as the default store when no database is configured and as the
/// backend for service-level tests. Mutation semantics match the MongoDB
/// backend: whole-entity read-modify-write, no-op when the game is missing.
#[derive(Default)]
pub struct MemoryGameStore {
    games: DashMap<Uuid, GameEntity>,
    /// Question banks keyed by category, each bank keyed by question id.
    questions: DashMap<u32, IndexMap<u32, QuestionEntity>>,
    settings: RwLock<GameSettingsEntity>,
}

impl MemoryGameStore {
    /// Create an empty store with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a question into its category bank, replacing any previous
    /// question with the same id.
    pub fn insert_question(&self, question: QuestionEntity) {
        self.questions
            .entry(question.category_id)
            .or_default()
            .insert(question.question_id, question);
    }

    /// Replace the stored game settings.
    pub fn set_settings(&self, settings: GameSettingsEntity) {
        *self.settings.write().expect("settings lock poisoned") = settings;
    }

    fn with_game_mut<F>(&self, game_id: Uuid, mutate: F)
    where
        F: FnOnce(&mut GameEntity),
    {
        if let Some(mut entry) = self.games.get_mut(&game_id) {
            mutate(entry.value_mut());
            entry.updated_at = SystemTime::now();
        }
    }
}

impl GameStore for MemoryGameStore {
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.games.insert(game.id, game);
        Box::pin(async { Ok(()) })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let game = self.games.get(&id).map(|entry| entry.clone());
        Box::pin(async move { Ok(game) })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameListItemEntity>>> {
        let mut items = self
            .games
            .iter()
            .map(|entry| GameListItemEntity::from(entry.value().clone()))
            .collect::<Vec<_>>();
        items.sort_by_key(|item| item.created_at);
        Box::pin(async move { Ok(items) })
    }

    fn fetch_question(
        &self,
        slot: QuestionSlotKey,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let question = self.questions.get(&slot.category_id).and_then(|bank| {
            bank.get(&slot.question_id)
                .filter(|question| question.difficulty == slot.difficulty)
                .cloned()
        });
        Box::pin(async move { Ok(question) })
    }

    fn mark_question_viewed(
        &self,
        game_id: Uuid,
        slot: QuestionSlotKey,
    ) -> BoxFuture<'static, StorageResult<()>> {
        self.with_game_mut(game_id, |game| {
            if !game.viewed_questions.contains(&slot) {
                game.viewed_questions.push(slot);
            }
        });
        Box::pin(async { Ok(()) })
    }

    fn record_answer(
        &self,
        game_id: Uuid,
        outcome: AnswerOutcome,
    ) -> BoxFuture<'static, StorageResult<()>> {
        self.with_game_mut(game_id, |game| {
            if outcome.is_correct
                && let Some(index) = outcome.team_index
                && let Some(team) = game.teams.get_mut(index)
            {
                team.score += outcome.points;
            }
            game.answered_questions.push(AnsweredQuestionEntity {
                slot: outcome.slot,
                team_index: outcome.team_index,
                is_correct: outcome.is_correct,
                points_awarded: if outcome.is_correct { outcome.points } else { 0 },
            });
        });
        Box::pin(async { Ok(()) })
    }

    fn update_current_team(
        &self,
        game_id: Uuid,
        team_index: usize,
    ) -> BoxFuture<'static, StorageResult<()>> {
        self.with_game_mut(game_id, |game| {
            game.current_team_index = team_index;
        });
        Box::pin(async { Ok(()) })
    }

    fn complete_game(
        &self,
        game_id: Uuid,
        winner_index: usize,
    ) -> BoxFuture<'static, StorageResult<()>> {
        self.with_game_mut(game_id, |game| {
            game.is_completed = true;
            game.winner_index = Some(winner_index);
        });
        Box::pin(async { Ok(()) })
    }

    fn load_settings(&self) -> BoxFuture<'static, StorageResult<Option<GameSettingsEntity>>> {
        let settings = self.settings.read().expect("settings lock poisoned").clone();
        Box::pin(async move { Ok(Some(settings)) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

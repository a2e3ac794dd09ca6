/// Always-available in-memory backend used for development and tests.
pub mod memory;
#[cfg(feature = "mongo-store")]
/// MongoDB-backed implementation of the [`GameStore`] trait.
pub mod mongodb;

use crate::dao::models::{
    AnswerOutcome, GameEntity, GameListItemEntity, GameSettingsEntity, QuestionEntity,
    QuestionSlotKey,
};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for game sessions, the question
/// bank, and game settings.
pub trait GameStore: Send + Sync {
    /// Persist a full game entity, replacing any previous version.
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Load a game by id.
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// List stored games with team summaries.
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameListItemEntity>>>;
    /// Fetch a question by slot from the question bank.
    fn fetch_question(
        &self,
        slot: QuestionSlotKey,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>>;
    /// Record that a question slot has been shown to the players. Marking an
    /// already-viewed slot acks without error.
    fn mark_question_viewed(
        &self,
        game_id: Uuid,
        slot: QuestionSlotKey,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Apply an answer outcome: credit the score and append the ledger entry.
    fn record_answer(
        &self,
        game_id: Uuid,
        outcome: AnswerOutcome,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Persist the durable pointer to the team whose turn is active.
    fn update_current_team(
        &self,
        game_id: Uuid,
        team_index: usize,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Mark a game completed with the winning team index.
    fn complete_game(
        &self,
        game_id: Uuid,
        winner_index: usize,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Load stored game settings, when any have been configured.
    fn load_settings(&self) -> BoxFuture<'static, StorageResult<Option<GameSettingsEntity>>>;
    /// Verify the backend is reachable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Attempt to re-establish a lost backend connection.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

use std::{sync::Arc, time::SystemTime};

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database,
    bson::{DateTime, doc},
    options::IndexOptions,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoGameDocument, doc_id, question_filter},
};
use crate::dao::{
    game_store::GameStore,
    models::{
        AnswerOutcome, AnsweredQuestionEntity, GameEntity, GameListItemEntity, GameSettingsEntity,
        QuestionEntity, QuestionSlotKey,
    },
    storage::StorageResult,
};

const GAME_COLLECTION_NAME: &str = "games";
const QUESTION_COLLECTION_NAME: &str = "questions";
const SETTINGS_COLLECTION_NAME: &str = "settings";

/// MongoDB-backed game store.
#[derive(Clone)]
pub struct MongoGameStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoGameStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;

        let games = database.collection::<mongodb::bson::Document>(GAME_COLLECTION_NAME);
        let game_index = mongodb::IndexModel::builder()
            .keys(doc! {"name": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("game_name_idx".to_owned()))
                    .build(),
            )
            .build();
        games
            .create_index(game_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: GAME_COLLECTION_NAME,
                index: "name",
                source,
            })?;

        let questions = database.collection::<mongodb::bson::Document>(QUESTION_COLLECTION_NAME);
        let slot_index = mongodb::IndexModel::builder()
            .keys(doc! {"category_id": 1, "difficulty": 1, "question_id": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("question_slot_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();
        questions
            .create_index(slot_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: QUESTION_COLLECTION_NAME,
                index: "category_id,difficulty,question_id",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn game_collection(&self) -> Collection<MongoGameDocument> {
        self.database()
            .await
            .collection::<MongoGameDocument>(GAME_COLLECTION_NAME)
    }

    async fn question_collection(&self) -> Collection<QuestionEntity> {
        self.database()
            .await
            .collection::<QuestionEntity>(QUESTION_COLLECTION_NAME)
    }

    async fn settings_collection(&self) -> Collection<GameSettingsEntity> {
        self.database()
            .await
            .collection::<GameSettingsEntity>(SETTINGS_COLLECTION_NAME)
    }

    async fn save_game(&self, game: GameEntity) -> MongoResult<()> {
        let id = game.id;
        let document: MongoGameDocument = game.into();
        let collection = self.game_collection().await;
        collection
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveGame { id, source })?;

        Ok(())
    }

    async fn find_game(&self, id: Uuid) -> MongoResult<Option<GameEntity>> {
        let collection = self.game_collection().await;

        let document = collection
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadGame { id, source })?;

        Ok(document.map(Into::into))
    }

    async fn list_games(&self) -> MongoResult<Vec<GameListItemEntity>> {
        let collection = self.game_collection().await;

        let documents: Vec<MongoGameDocument> = collection
            .find(doc! {})
            .sort(doc! {"created_at": 1})
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?;

        Ok(documents
            .into_iter()
            .map(|document| {
                let entity: GameEntity = document.into();
                entity.into()
            })
            .collect())
    }

    async fn fetch_question(&self, slot: QuestionSlotKey) -> MongoResult<Option<QuestionEntity>> {
        let collection = self.question_collection().await;

        collection
            .find_one(question_filter(slot))
            .await
            .map_err(|source| MongoDaoError::LoadQuestion {
                question_id: slot.question_id,
                category_id: slot.category_id,
                difficulty: slot.difficulty,
                source,
            })
    }

    /// Read-modify-write helper for game mutations that touch nested fields.
    async fn update_game<F>(&self, id: Uuid, mutate: F) -> MongoResult<()>
    where
        F: FnOnce(&mut GameEntity),
    {
        let Some(mut game) = self.find_game(id).await? else {
            return Ok(());
        };

        mutate(&mut game);
        game.updated_at = SystemTime::now();
        self.save_game(game).await
    }

    async fn mark_question_viewed(&self, game_id: Uuid, slot: QuestionSlotKey) -> MongoResult<()> {
        self.update_game(game_id, |game| {
            if !game.viewed_questions.contains(&slot) {
                game.viewed_questions.push(slot);
            }
        })
        .await
    }

    async fn record_answer(&self, game_id: Uuid, outcome: AnswerOutcome) -> MongoResult<()> {
        self.update_game(game_id, |game| {
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
        })
        .await
    }

    async fn update_current_team(&self, game_id: Uuid, team_index: usize) -> MongoResult<()> {
        let collection = self.game_collection().await;
        collection
            .update_one(
                doc_id(game_id),
                doc! {"$set": {
                    "current_team_index": team_index as i64,
                    "updated_at": DateTime::now(),
                }},
            )
            .await
            .map_err(|source| MongoDaoError::SaveGame {
                id: game_id,
                source,
            })?;
        Ok(())
    }

    async fn complete_game(&self, game_id: Uuid, winner_index: usize) -> MongoResult<()> {
        let collection = self.game_collection().await;
        collection
            .update_one(
                doc_id(game_id),
                doc! {"$set": {
                    "is_completed": true,
                    "winner_index": winner_index as i64,
                    "updated_at": DateTime::now(),
                }},
            )
            .await
            .map_err(|source| MongoDaoError::SaveGame {
                id: game_id,
                source,
            })?;
        Ok(())
    }

    async fn load_settings(&self) -> MongoResult<Option<GameSettingsEntity>> {
        let collection = self.settings_collection().await;

        collection
            .find_one(doc! {})
            .await
            .map_err(|source| MongoDaoError::LoadSettings { source })
    }
}

impl GameStore for MongoGameStore {
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_game(game).await.map_err(Into::into) })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(id).await.map_err(Into::into) })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameListItemEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_games().await.map_err(Into::into) })
    }

    fn fetch_question(
        &self,
        slot: QuestionSlotKey,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.fetch_question(slot).await.map_err(Into::into) })
    }

    fn mark_question_viewed(
        &self,
        game_id: Uuid,
        slot: QuestionSlotKey,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .mark_question_viewed(game_id, slot)
                .await
                .map_err(Into::into)
        })
    }

    fn record_answer(
        &self,
        game_id: Uuid,
        outcome: AnswerOutcome,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .record_answer(game_id, outcome)
                .await
                .map_err(Into::into)
        })
    }

    fn update_current_team(
        &self,
        game_id: Uuid,
        team_index: usize,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_current_team(game_id, team_index)
                .await
                .map_err(Into::into)
        })
    }

    fn complete_game(
        &self,
        game_id: Uuid,
        winner_index: usize,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .complete_game(game_id, winner_index)
                .await
                .map_err(Into::into)
        })
    }

    fn load_settings(&self) -> BoxFuture<'static, StorageResult<Option<GameSettingsEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.load_settings().await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}

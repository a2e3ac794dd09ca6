/// Countdown clock for the question on screen.
pub mod clock;
/// Runtime game model shared across layers.
pub mod game;
/// Question view lifecycle state machine.
pub mod session;
mod sse;
/// Turn rotation and duration policy.
pub mod turn;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig,
    dao::game_store::GameStore,
    error::ServiceError,
    state::{game::GameSession, session::QuestionSession},
};

pub use self::sse::SseHub;

/// Shared handle to the central application state.
pub type SharedState = Arc<AppState>;

const SSE_CHANNEL_CAPACITY: usize = 32;

/// Central application state storing the storage handle, the SSE hub, the
/// loaded game mirror, and the active question session.
pub struct AppState {
    config: AppConfig,
    game_store: RwLock<Option<Arc<dyn GameStore>>>,
    sse: SseHub,
    game: RwLock<Option<GameSession>>,
    question: RwLock<Option<QuestionSession>>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            game_store: RwLock::new(None),
            sse: SseHub::new(SSE_CHANNEL_CAPACITY),
            game: RwLock::new(None),
            question: RwLock::new(None),
            degraded: degraded_tx,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current game store, if one is installed.
    pub async fn game_store(&self) -> Option<Arc<dyn GameStore>> {
        let guard = self.game_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the game store or fail with a degraded-mode error.
    pub async fn require_game_store(&self) -> Result<Arc<dyn GameStore>, ServiceError> {
        self.game_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new game store implementation and leave degraded mode.
    pub async fn install_game_store(&self, store: Arc<dyn GameStore>) {
        {
            let mut guard = self.game_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current game store and enter degraded mode.
    pub async fn clear_game_store(&self) {
        {
            let mut guard = self.game_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.game_store.read().await;
        guard.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        if *self.degraded.borrow() == value {
            return;
        }

        let _ = self.degraded.send(value);
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        &self.sse
    }

    /// Currently loaded game session mirror.
    pub fn current_game(&self) -> &RwLock<Option<GameSession>> {
        &self.game
    }

    /// Run a closure against the loaded game, failing when none is loaded.
    pub async fn with_current_game<F, T>(&self, read: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&GameSession) -> Result<T, ServiceError>,
    {
        let guard = self.game.read().await;
        let game = guard
            .as_ref()
            .ok_or_else(|| ServiceError::InvalidState("no game is loaded".into()))?;
        read(game)
    }

    /// Run a mutating closure against the loaded game, failing when none is
    /// loaded. Bumps the mirror's update timestamp on success.
    pub async fn with_current_game_mut<F, T>(&self, mutate: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut GameSession) -> Result<T, ServiceError>,
    {
        let mut guard = self.game.write().await;
        let game = guard
            .as_mut()
            .ok_or_else(|| ServiceError::InvalidState("no game is loaded".into()))?;
        let value = mutate(game)?;
        game.updated_at = std::time::SystemTime::now();
        Ok(value)
    }

    /// Active question session slot.
    pub fn question(&self) -> &RwLock<Option<QuestionSession>> {
        &self.question
    }

    /// Persist the loaded game mirror to the store, when both exist.
    pub async fn persist_current_game(&self) -> Result<(), ServiceError> {
        let snapshot = {
            let guard = self.game.read().await;
            guard.clone()
        };

        let Some(game) = snapshot else {
            return Ok(());
        };

        let store = self.require_game_store().await?;
        store.save_game(game.into()).await?;
        Ok(())
    }
}

//! Lifecycle of one question view: open, reveal, turn advancement, answer
//! resolution, and close.
//!
//! All three turn transitions (clock expiry, manual switch, resolved answer)
//! funnel into a single advance path guarded by the scheduler's in-flight
//! plan, so a timeout racing a user action can never advance the rotation
//! twice. Score and turn writes after the local state has moved are
//! best-effort: a failed write warns and toasts but is not rolled back.

use std::time::Duration;

use tokio::{sync::mpsc, time::timeout};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    dao::models::{AnswerOutcome, QuestionSlotKey},
    dto::{
        common::ActionResponse,
        game::TeamSummary,
        phase::VisibleQuestionPhase,
        question::{
            AnswerResolution, OpenQuestionRequest, QuestionView, SubmitAnswerRequest,
            TurnStateView,
        },
        sse::{AnswerResolvedEvent, ToastLevel, TurnChangedEvent},
    },
    error::ServiceError,
    services::sse_events,
    state::{
        SharedState,
        clock::ClockEvent,
        game::{GameSession, Question},
        session::{ActiveQuestion, ActiveStage, QuestionEvent, QuestionSession},
        turn::{TurnScheduler, TurnSnapshot},
    },
};

/// Grace period before a resolved question view navigates back to the board.
const CLOSE_DELAY: Duration = Duration::from_secs(2);
/// Upper bound on store writes made while a turn or answer is resolving.
const PERSIST_TIMEOUT: Duration = Duration::from_secs(5);

/// Why a turn advance was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdvanceReason {
    /// The countdown ran out.
    TimedOut,
    /// A player used the switch-team action.
    Manual,
}

/// Open a question view for a board slot: fetch the game and question, record
/// the anti-replay mark, and start the countdown for the team whose turn it
/// is.
pub async fn open_question(
    state: &SharedState,
    game_id: Uuid,
    request: OpenQuestionRequest,
) -> Result<QuestionView, ServiceError> {
    let store = state.require_game_store().await?;

    let Some(entity) = store.find_game(game_id).await? else {
        return Err(ServiceError::NotFound(format!("game `{game_id}` not found")));
    };
    let mut game: GameSession = entity.into();
    if game.is_completed {
        return Err(ServiceError::InvalidState(
            "game is already completed".into(),
        ));
    }

    let slot = QuestionSlotKey {
        category_id: request.category_id,
        difficulty: request.difficulty,
        question_id: request.question_id,
    };
    if !game.selected_categories.contains(&slot.category_id) {
        return Err(ServiceError::InvalidInput(format!(
            "category `{}` is not part of this game",
            slot.category_id
        )));
    }

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let mut session = QuestionSession::open(game_id, slot, events_tx);

    let Some(question) = store.fetch_question(slot).await?.map(Question::from) else {
        session.apply(QuestionEvent::Missing)?;
        // Keep the dead view around so clients can render the error screen;
        // no clock ever starts for it.
        install_session(state, game, session).await;
        return Err(ServiceError::NotFound(format!(
            "question `{}` not found",
            slot.question_id
        )));
    };

    // The anti-replay mark must be recorded before the countdown begins;
    // opening consumes the question even if it is abandoned afterwards.
    match timeout(PERSIST_TIMEOUT, store.mark_question_viewed(game_id, slot)).await {
        Ok(result) => result?,
        Err(_) => return Err(ServiceError::Timeout),
    }
    if !game.viewed_questions.contains(&slot) {
        game.viewed_questions.push(slot);
    }

    let scheduler = TurnScheduler::new(
        game.teams.len(),
        game.current_team_index,
        game.answer_times,
    );
    let duration = scheduler.current_duration();
    session.apply(QuestionEvent::Loaded(ActiveQuestion {
        question,
        scheduler,
        stage: ActiveStage::Ready,
    }))?;
    session.clock_mut().start(duration);

    let session_id = session.id();
    install_session(state, game, session).await;
    tokio::spawn(run_clock_events(state.clone(), session_id, events_rx));

    let view = current_view(state).await?;
    sse_events::broadcast_question_opened(state, &view);
    Ok(view)
}

/// Projection of the question currently on screen.
pub async fn current_view(state: &SharedState) -> Result<QuestionView, ServiceError> {
    let game_guard = state.current_game().read().await;
    let question_guard = state.question().read().await;
    let session = question_guard
        .as_ref()
        .ok_or_else(|| ServiceError::NotFound("no question is open".into()))?;

    let teams = game_guard
        .as_ref()
        .filter(|game| game.id == session.game_id())
        .map(|game| game.teams.iter().map(TeamSummary::from).collect())
        .unwrap_or_default();

    Ok(build_view(session, teams))
}

/// Reveal the answer. The countdown keeps running; revealing never pauses the
/// clock. Revealing twice is a no-op.
pub async fn reveal_answer(state: &SharedState) -> Result<QuestionView, ServiceError> {
    {
        let mut guard = state.question().write().await;
        let session = guard
            .as_mut()
            .ok_or_else(|| ServiceError::InvalidState("no question is open".into()))?;

        let already_revealed = session
            .active()
            .is_some_and(|active| active.stage == ActiveStage::Answering);
        if !already_revealed {
            session.apply(QuestionEvent::Reveal)?;
        }
    }

    current_view(state).await
}

/// Restart the countdown for the current turn (the "renew time" action).
/// Does not advance the turn.
pub async fn renew_clock(state: &SharedState) -> Result<QuestionView, ServiceError> {
    {
        let mut guard = state.question().write().await;
        let session = guard
            .as_mut()
            .ok_or_else(|| ServiceError::InvalidState("no question is open".into()))?;
        let duration = session
            .active()
            .map(|active| active.scheduler.current_duration())
            .ok_or_else(|| ServiceError::InvalidState("no active question".into()))?;
        session.clock_mut().reset(duration);
    }

    current_view(state).await
}

/// Pass the turn to the next team on user request.
pub async fn switch_team(state: &SharedState) -> Result<QuestionView, ServiceError> {
    let session_id = {
        let guard = state.question().read().await;
        let session = guard
            .as_ref()
            .ok_or_else(|| ServiceError::InvalidState("no question is open".into()))?;
        if session.active().is_none() {
            return Err(ServiceError::InvalidState("no active question".into()));
        }
        session.id()
    };

    advance_turn(state, session_id, AdvanceReason::Manual).await;
    current_view(state).await
}

/// Resolve an answer attempt exactly once: credit the score, record the
/// outcome, advance the turn, and schedule the navigate-back signal.
pub async fn submit_answer(
    state: &SharedState,
    request: SubmitAnswerRequest,
) -> Result<AnswerResolution, ServiceError> {
    // The transition to Closed happens before any suspension point, so a
    // duplicate submit finds the session closed and is rejected here.
    let (session_id, game_id, mut active) = {
        let mut guard = state.question().write().await;
        let session = guard
            .as_mut()
            .ok_or_else(|| ServiceError::InvalidState("no question is open".into()))?;
        let session_id = session.id();
        let game_id = session.game_id();

        // Reject a bad team index before the attempt is consumed.
        if let Some(active) = session.active()
            && let Some(index) = request.team_index
            && index >= active.scheduler.team_count()
        {
            return Err(ServiceError::InvalidInput(format!(
                "team index `{index}` is out of range"
            )));
        }

        let released = session.apply(QuestionEvent::Submit)?;
        session.clock_mut().stop();
        let active = released.ok_or_else(|| {
            ServiceError::InvalidState("submit released no question payload".into())
        })?;
        (session_id, game_id, active)
    };

    let team_index = match request.team_index {
        Some(index) => Some(index),
        None if request.is_correct => Some(active.scheduler.current_team_index()),
        None => None,
    };

    let points = active.question.points();
    let awarded = if request.is_correct { points } else { 0 };
    let teams = state
        .with_current_game_mut(|game| {
            if request.is_correct
                && let Some(index) = team_index
                && let Some(team) = game.teams.get_mut(index)
            {
                team.score += awarded;
            }
            Ok(game.teams.iter().map(TeamSummary::from).collect::<Vec<_>>())
        })
        .await?;

    sse_events::broadcast_answer_resolved(
        state,
        &AnswerResolvedEvent {
            is_correct: request.is_correct,
            team_index,
            points_awarded: awarded,
            teams: teams.clone(),
        },
    );

    let outcome = AnswerOutcome {
        slot: active.question.slot(),
        team_index,
        is_correct: request.is_correct,
        points,
    };
    persist_answer(state, game_id, outcome).await;

    // Advance exactly once. If a timeout-driven advance is already in
    // flight it owns the transition and this one is dropped.
    match active.scheduler.plan_advance() {
        Ok(plan) => {
            persist_turn_index(state, game_id, plan.team_index).await;
            let snapshot = active.scheduler.commit_advance(plan);
            let team_name = update_team_mirror(state, game_id, snapshot.team_index).await;
            sse_events::broadcast_turn_changed(
                state,
                &TurnChangedEvent {
                    turn_counter: snapshot.turn_counter,
                    team_index: snapshot.team_index,
                    team_name,
                    duration: snapshot.duration,
                    timed_out: false,
                },
            );
        }
        Err(_) => {
            debug!(%session_id, "advance already in flight; submit defers to it");
        }
    }

    // Leave the resolution visible for a moment, then navigate back to the
    // board.
    let state = state.clone();
    tokio::spawn(async move {
        tokio::time::sleep(CLOSE_DELAY).await;
        let removed = {
            let mut guard = state.question().write().await;
            if guard.as_ref().is_some_and(|session| session.id() == session_id) {
                guard.take()
            } else {
                None
            }
        };
        if removed.is_some() {
            sse_events::broadcast_question_closed(&state, game_id);
        }
    });

    Ok(AnswerResolution {
        is_correct: request.is_correct,
        team_index,
        points_awarded: awarded,
        teams,
    })
}

/// Close the question view (navigate away), saving board progress
/// best-effort.
pub async fn close_question(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    let removed = {
        let mut guard = state.question().write().await;
        guard.take()
    };

    let Some(mut session) = removed else {
        return Ok(ActionResponse::new("no question was open"));
    };

    session.clock_mut().stop();
    let game_id = session.game_id();

    if let Err(err) = state.persist_current_game().await {
        warn!(game_id = %game_id, error = %err, "failed to save game state on close");
    }
    sse_events::broadcast_question_closed(state, game_id);

    Ok(ActionResponse::new("closed"))
}

/// Consume clock events for one question view until its channel closes.
async fn run_clock_events(
    state: SharedState,
    session_id: Uuid,
    mut events: mpsc::UnboundedReceiver<ClockEvent>,
) {
    while let Some(event) = events.recv().await {
        match event {
            ClockEvent::Tick(time_left) => {
                let duration = {
                    let guard = state.question().read().await;
                    guard
                        .as_ref()
                        .filter(|session| session.id() == session_id)
                        .map(|session| session.clock().snapshot().duration)
                };
                if let Some(duration) = duration {
                    sse_events::broadcast_clock_tick(&state, time_left, duration);
                }
            }
            ClockEvent::Expired => {
                advance_turn(&state, session_id, AdvanceReason::TimedOut).await;
            }
        }
    }
}

/// Advance the turn for the given session: plan under the lock, persist the
/// durable team pointer, then commit and restart the clock if the view is
/// still live. Returns `None` when the advance was dropped (another advance
/// in flight, or the session is gone).
async fn advance_turn(
    state: &SharedState,
    session_id: Uuid,
    reason: AdvanceReason,
) -> Option<TurnSnapshot> {
    let (game_id, plan, previous_team) = {
        let mut guard = state.question().write().await;
        let session = guard
            .as_mut()
            .filter(|session| session.id() == session_id)?;
        let game_id = session.game_id();
        let active = session.active_mut()?;
        let previous_team = active.scheduler.current_team_index();
        match active.scheduler.plan_advance() {
            Ok(plan) => (game_id, plan, previous_team),
            Err(_) => {
                debug!(%session_id, "turn advance already in flight; dropping");
                return None;
            }
        }
    };

    persist_turn_index(state, game_id, plan.team_index).await;

    let snapshot = {
        let mut guard = state.question().write().await;
        guard
            .as_mut()
            .filter(|session| session.id() == session_id)
            .and_then(|session| {
                let snapshot = session.active_mut()?.scheduler.commit_advance(plan);
                session.clock_mut().start(snapshot.duration);
                Some(snapshot)
            })
    };

    let team_name = update_team_mirror(state, game_id, plan.team_index).await;
    let Some(snapshot) = snapshot else {
        // The view closed while the pointer write was in flight; the durable
        // state already moved on, nothing else to do.
        return None;
    };

    if reason == AdvanceReason::TimedOut {
        let previous_name = team_name_at(state, game_id, previous_team).await;
        let message = match previous_name {
            Some(name) => format!("time is up! team \"{name}\" did not answer"),
            None => "time is up!".to_owned(),
        };
        sse_events::broadcast_toast(state, ToastLevel::Info, message);
    }

    sse_events::broadcast_turn_changed(
        state,
        &TurnChangedEvent {
            turn_counter: snapshot.turn_counter,
            team_index: snapshot.team_index,
            team_name,
            duration: snapshot.duration,
            timed_out: reason == AdvanceReason::TimedOut,
        },
    );

    Some(snapshot)
}

/// Persist the durable team pointer, tolerating failure (warn + toast).
async fn persist_turn_index(state: &SharedState, game_id: Uuid, team_index: usize) {
    let Some(store) = state.game_store().await else {
        warn!(game_id = %game_id, "turn change not persisted: storage unavailable");
        sse_events::broadcast_toast(state, ToastLevel::Warning, "could not save the turn change");
        return;
    };

    match timeout(PERSIST_TIMEOUT, store.update_current_team(game_id, team_index)).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            warn!(game_id = %game_id, error = %err, "failed to persist turn change");
            sse_events::broadcast_toast(
                state,
                ToastLevel::Warning,
                "could not save the turn change",
            );
        }
        Err(_) => {
            warn!(game_id = %game_id, "turn change persistence timed out");
            sse_events::broadcast_toast(
                state,
                ToastLevel::Warning,
                "could not save the turn change",
            );
        }
    }
}

/// Persist a resolved answer outcome, tolerating failure (warn + toast).
async fn persist_answer(state: &SharedState, game_id: Uuid, outcome: AnswerOutcome) {
    let Some(store) = state.game_store().await else {
        warn!(game_id = %game_id, "answer not persisted: storage unavailable");
        sse_events::broadcast_toast(state, ToastLevel::Warning, "could not save the answer");
        return;
    };

    match timeout(PERSIST_TIMEOUT, store.record_answer(game_id, outcome)).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            warn!(game_id = %game_id, error = %err, "failed to persist answer outcome");
            sse_events::broadcast_toast(state, ToastLevel::Warning, "could not save the answer");
        }
        Err(_) => {
            warn!(game_id = %game_id, "answer persistence timed out");
            sse_events::broadcast_toast(state, ToastLevel::Warning, "could not save the answer");
        }
    }
}

/// Update the mirrored durable team pointer, returning the new team's name.
async fn update_team_mirror(
    state: &SharedState,
    game_id: Uuid,
    team_index: usize,
) -> Option<String> {
    let mut guard = state.current_game().write().await;
    let game = guard.as_mut().filter(|game| game.id == game_id)?;
    game.current_team_index = team_index;
    game.teams.get(team_index).map(|team| team.name.clone())
}

async fn team_name_at(state: &SharedState, game_id: Uuid, team_index: usize) -> Option<String> {
    let guard = state.current_game().read().await;
    guard
        .as_ref()
        .filter(|game| game.id == game_id)
        .and_then(|game| game.teams.get(team_index))
        .map(|team| team.name.clone())
}

async fn install_session(state: &SharedState, game: GameSession, session: QuestionSession) {
    {
        let mut mirror = state.current_game().write().await;
        *mirror = Some(game);
    }
    {
        let mut slot = state.question().write().await;
        // Replacing a previous view drops it, which aborts its clock driver.
        *slot = Some(session);
    }
}

fn build_view(session: &QuestionSession, teams: Vec<TeamSummary>) -> QuestionView {
    let phase = VisibleQuestionPhase::from(session.phase());
    let (question, turn) = match session.active() {
        Some(active) => (
            Some((&active.question).into()),
            Some(TurnStateView::from_snapshot(
                active.scheduler.snapshot(),
                &teams,
            )),
        ),
        None => (None, None),
    };
    let clock = session
        .active()
        .map(|_| session.clock().snapshot().into());

    QuestionView {
        phase,
        game_id: session.game_id(),
        question,
        teams,
        turn,
        clock,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            game_store::{GameStore, memory::MemoryGameStore},
            models::{
                AnswerTimesEntity, GameEntity, GameListItemEntity, GameSettingsEntity,
                QuestionEntity,
            },
            storage::StorageResult,
        },
        dao::models::TeamEntity,
        state::AppState,
    };
    use futures::future::BoxFuture;
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::SystemTime,
    };
    use tokio::sync::Notify;

    /// Memory store wrapper that counts viewed marks and can hold turn
    /// pointer writes behind a gate to stage persistence races.
    struct InstrumentedStore {
        inner: MemoryGameStore,
        viewed_marks: AtomicUsize,
        turn_gate: Option<Arc<Notify>>,
    }

    impl InstrumentedStore {
        fn new() -> Self {
            Self {
                inner: MemoryGameStore::new(),
                viewed_marks: AtomicUsize::new(0),
                turn_gate: None,
            }
        }

        fn gated(gate: Arc<Notify>) -> Self {
            Self {
                turn_gate: Some(gate),
                ..Self::new()
            }
        }

        fn viewed_marks(&self) -> usize {
            self.viewed_marks.load(Ordering::SeqCst)
        }
    }

    impl GameStore for InstrumentedStore {
        fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.save_game(game)
        }

        fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
            self.inner.find_game(id)
        }

        fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameListItemEntity>>> {
            self.inner.list_games()
        }

        fn fetch_question(
            &self,
            slot: QuestionSlotKey,
        ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
            self.inner.fetch_question(slot)
        }

        fn mark_question_viewed(
            &self,
            game_id: Uuid,
            slot: QuestionSlotKey,
        ) -> BoxFuture<'static, StorageResult<()>> {
            self.viewed_marks.fetch_add(1, Ordering::SeqCst);
            self.inner.mark_question_viewed(game_id, slot)
        }

        fn record_answer(
            &self,
            game_id: Uuid,
            outcome: AnswerOutcome,
        ) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.record_answer(game_id, outcome)
        }

        fn update_current_team(
            &self,
            game_id: Uuid,
            team_index: usize,
        ) -> BoxFuture<'static, StorageResult<()>> {
            let write = self.inner.update_current_team(game_id, team_index);
            match &self.turn_gate {
                Some(gate) => {
                    let gate = gate.clone();
                    Box::pin(async move {
                        gate.notified().await;
                        write.await
                    })
                }
                None => write,
            }
        }

        fn complete_game(
            &self,
            game_id: Uuid,
            winner_index: usize,
        ) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.complete_game(game_id, winner_index)
        }

        fn load_settings(&self) -> BoxFuture<'static, StorageResult<Option<GameSettingsEntity>>> {
            self.inner.load_settings()
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.health_check()
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.try_reconnect()
        }
    }

    fn team(name: &str) -> TeamEntity {
        TeamEntity {
            id: Uuid::new_v4(),
            name: name.into(),
            color: "#33A8FF".into(),
            score: 0,
        }
    }

    fn game_entity(answer_times: AnswerTimesEntity) -> GameEntity {
        let now = SystemTime::now();
        GameEntity {
            id: Uuid::new_v4(),
            name: "quiz night".into(),
            logo_url: None,
            created_at: now,
            updated_at: now,
            teams: vec![team("Falcons"), team("Eagles")],
            selected_categories: vec![2],
            current_team_index: 0,
            answer_times,
            viewed_questions: Vec::new(),
            answered_questions: Vec::new(),
            is_completed: false,
            winner_index: None,
        }
    }

    fn question_entity() -> QuestionEntity {
        QuestionEntity {
            question_id: 7,
            category_id: 2,
            category_name: "History".into(),
            difficulty: 2,
            text: "Prompt".into(),
            answer: "Answer".into(),
            media: None,
        }
    }

    fn open_request() -> OpenQuestionRequest {
        OpenQuestionRequest {
            question_id: 7,
            category_id: 2,
            difficulty: 2,
        }
    }

    fn slot() -> QuestionSlotKey {
        QuestionSlotKey {
            category_id: 2,
            difficulty: 2,
            question_id: 7,
        }
    }

    async fn setup(
        answer_times: AnswerTimesEntity,
        gate: Option<Arc<Notify>>,
    ) -> (SharedState, Arc<InstrumentedStore>, Uuid) {
        let state = AppState::new(AppConfig::default());
        let store = Arc::new(match gate {
            Some(gate) => InstrumentedStore::gated(gate),
            None => InstrumentedStore::new(),
        });
        store.inner.insert_question(question_entity());

        let entity = game_entity(answer_times);
        let game_id = entity.id;
        store.save_game(entity).await.unwrap();

        state.install_game_store(store.clone()).await;
        (state, store, game_id)
    }

    fn default_times() -> AnswerTimesEntity {
        AnswerTimesEntity {
            first: 30,
            second: 15,
            third: None,
            fourth: None,
        }
    }

    fn turn_of(view: &QuestionView) -> (u32, usize, u32) {
        let turn = view.turn.as_ref().expect("view has no turn state");
        (turn.turn_counter, turn.team_index, turn.duration)
    }

    #[tokio::test(start_paused = true)]
    async fn open_marks_viewed_and_starts_the_first_turn() {
        let (state, store, game_id) = setup(default_times(), None).await;

        let view = open_question(&state, game_id, open_request()).await.unwrap();
        assert_eq!(view.phase, VisibleQuestionPhase::Ready);
        assert_eq!(turn_of(&view), (0, 0, 30));

        let clock = view.clock.expect("view has no clock");
        assert_eq!(clock.time_left, 30);
        assert!(clock.running);

        assert_eq!(store.viewed_marks(), 1);
        let stored = store.find_game(game_id).await.unwrap().unwrap();
        assert!(stored.viewed_questions.contains(&slot()));
    }

    #[tokio::test(start_paused = true)]
    async fn opening_the_same_question_twice_marks_viewed_both_times() {
        let (state, store, game_id) = setup(default_times(), None).await;

        open_question(&state, game_id, open_request()).await.unwrap();
        open_question(&state, game_id, open_request()).await.unwrap();

        assert_eq!(store.viewed_marks(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_question_reaches_not_found_without_a_clock() {
        let (state, store, game_id) = setup(default_times(), None).await;

        let request = OpenQuestionRequest {
            question_id: 99,
            ..open_request()
        };
        let err = open_question(&state, game_id, request).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let view = current_view(&state).await.unwrap();
        assert_eq!(view.phase, VisibleQuestionPhase::NotFound);
        assert!(view.clock.is_none());
        // An unplayable question is never consumed.
        assert_eq!(store.viewed_marks(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_rotates_turns_through_the_slot_policy() {
        let times = AnswerTimesEntity {
            first: 30,
            second: 15,
            third: Some(30),
            fourth: Some(15),
        };
        let (state, store, game_id) = setup(times, None).await;

        let view = open_question(&state, game_id, open_request()).await.unwrap();
        assert_eq!(turn_of(&view), (0, 0, 30));

        tokio::time::sleep(Duration::from_secs(31)).await;
        let view = current_view(&state).await.unwrap();
        let turn = turn_of(&view);
        assert_eq!((turn.0, turn.1, turn.2), (1, 1, 15));
        let stored = store.find_game(game_id).await.unwrap().unwrap();
        assert_eq!(stored.current_team_index, 1);

        tokio::time::sleep(Duration::from_secs(16)).await;
        let view = current_view(&state).await.unwrap();
        let turn = turn_of(&view);
        assert_eq!((turn.0, turn.1, turn.2), (2, 0, 30));
        let stored = store.find_game(game_id).await.unwrap().unwrap();
        assert_eq!(stored.current_team_index, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_switch_passes_the_turn_and_restarts_the_clock() {
        let (state, store, game_id) = setup(default_times(), None).await;
        open_question(&state, game_id, open_request()).await.unwrap();

        let view = switch_team(&state).await.unwrap();
        assert_eq!(turn_of(&view), (1, 1, 15));
        let clock = view.clock.unwrap();
        assert_eq!(clock.time_left, 15);
        assert!(clock.running);

        let stored = store.find_game(game_id).await.unwrap().unwrap();
        assert_eq!(stored.current_team_index, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn renew_restarts_the_clock_without_advancing() {
        let (state, store, game_id) = setup(default_times(), None).await;
        open_question(&state, game_id, open_request()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(10_100)).await;
        let view = current_view(&state).await.unwrap();
        assert_eq!(view.clock.unwrap().time_left, 20);

        let view = renew_clock(&state).await.unwrap();
        assert_eq!(view.clock.as_ref().unwrap().time_left, 30);
        assert_eq!(turn_of(&view), (0, 0, 30));

        let stored = store.find_game(game_id).await.unwrap().unwrap();
        assert_eq!(stored.current_team_index, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reveal_keeps_the_clock_running() {
        let (state, _store, game_id) = setup(default_times(), None).await;
        open_question(&state, game_id, open_request()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(5_100)).await;
        let view = reveal_answer(&state).await.unwrap();
        assert_eq!(view.phase, VisibleQuestionPhase::Answering);

        tokio::time::sleep(Duration::from_millis(5_100)).await;
        let view = current_view(&state).await.unwrap();
        let clock = view.clock.unwrap();
        assert_eq!(clock.time_left, 20);
        assert!(clock.running);
    }

    #[tokio::test(start_paused = true)]
    async fn correct_answer_awards_the_difficulty_to_exactly_one_team() {
        let (state, store, game_id) = setup(default_times(), None).await;
        open_question(&state, game_id, open_request()).await.unwrap();
        reveal_answer(&state).await.unwrap();

        let resolution = submit_answer(
            &state,
            SubmitAnswerRequest {
                is_correct: true,
                team_index: Some(0),
            },
        )
        .await
        .unwrap();

        assert_eq!(resolution.points_awarded, 2);
        assert_eq!(resolution.team_index, Some(0));
        assert_eq!(resolution.teams[0].score, 2);
        assert_eq!(resolution.teams[1].score, 0);

        let stored = store.find_game(game_id).await.unwrap().unwrap();
        assert_eq!(stored.teams[0].score, 2);
        assert_eq!(stored.teams[1].score, 0);
        assert_eq!(stored.current_team_index, 1);
        assert_eq!(stored.answered_questions.len(), 1);
        assert!(stored.answered_questions[0].is_correct);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_defaults_to_the_active_team() {
        let (state, store, game_id) = setup(default_times(), None).await;
        open_question(&state, game_id, open_request()).await.unwrap();
        reveal_answer(&state).await.unwrap();

        let resolution = submit_answer(
            &state,
            SubmitAnswerRequest {
                is_correct: true,
                team_index: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(resolution.team_index, Some(0));
        let stored = store.find_game(game_id).await.unwrap().unwrap();
        assert_eq!(stored.teams[0].score, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn incorrect_answer_advances_without_scoring() {
        let (state, store, game_id) = setup(default_times(), None).await;
        open_question(&state, game_id, open_request()).await.unwrap();
        reveal_answer(&state).await.unwrap();

        let resolution = submit_answer(
            &state,
            SubmitAnswerRequest {
                is_correct: false,
                team_index: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(resolution.points_awarded, 0);
        assert_eq!(resolution.team_index, None);

        let stored = store.find_game(game_id).await.unwrap().unwrap();
        assert!(stored.teams.iter().all(|team| team.score == 0));
        assert_eq!(stored.current_team_index, 1);
        assert_eq!(stored.answered_questions.len(), 1);
        assert!(!stored.answered_questions[0].is_correct);
    }

    #[tokio::test(start_paused = true)]
    async fn a_second_submit_is_rejected_without_double_scoring() {
        let (state, store, game_id) = setup(default_times(), None).await;
        open_question(&state, game_id, open_request()).await.unwrap();
        reveal_answer(&state).await.unwrap();

        submit_answer(
            &state,
            SubmitAnswerRequest {
                is_correct: true,
                team_index: Some(0),
            },
        )
        .await
        .unwrap();

        let err = submit_answer(
            &state,
            SubmitAnswerRequest {
                is_correct: true,
                team_index: Some(0),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        let stored = store.find_game(game_id).await.unwrap().unwrap();
        assert_eq!(stored.teams[0].score, 2);
        assert_eq!(stored.answered_questions.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_advances_collapse_into_one() {
        let times = AnswerTimesEntity {
            first: 300,
            second: 200,
            third: None,
            fourth: None,
        };
        let gate = Arc::new(Notify::new());
        let (state, store, game_id) = setup(times, Some(gate.clone())).await;
        open_question(&state, game_id, open_request()).await.unwrap();

        // First advance parks inside the turn pointer write.
        let racing_state = state.clone();
        let racing = tokio::spawn(async move { switch_team(&racing_state).await });
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        // A second advance while the first is in flight is dropped.
        let view = switch_team(&state).await.unwrap();
        assert_eq!(turn_of(&view).0, 0);

        gate.notify_one();
        let view = racing.await.unwrap().unwrap();
        assert_eq!(turn_of(&view), (1, 1, 200));

        let stored = store.find_game(game_id).await.unwrap().unwrap();
        assert_eq!(stored.current_team_index, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_schedules_the_navigate_back_signal() {
        let (state, _store, game_id) = setup(default_times(), None).await;
        open_question(&state, game_id, open_request()).await.unwrap();
        reveal_answer(&state).await.unwrap();
        submit_answer(
            &state,
            SubmitAnswerRequest {
                is_correct: false,
                team_index: None,
            },
        )
        .await
        .unwrap();

        // The view survives for the toast, then clears.
        assert!(current_view(&state).await.is_ok());
        tokio::time::sleep(CLOSE_DELAY + Duration::from_millis(100)).await;
        let err = current_view(&state).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn close_clears_the_view_and_tolerates_repeats() {
        let (state, _store, game_id) = setup(default_times(), None).await;
        open_question(&state, game_id, open_request()).await.unwrap();

        close_question(&state).await.unwrap();
        assert!(current_view(&state).await.is_err());

        let ack = close_question(&state).await.unwrap();
        assert_eq!(ack.message, "no question was open");
    }
}

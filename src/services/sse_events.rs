use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::{
        game::GameSummary,
        question::QuestionView,
        sse::{
            AnswerResolvedEvent, ClockTickEvent, GameCompletedEvent, QuestionClosedEvent,
            QuestionOpenedEvent, ServerEvent, SystemStatus, ToastEvent, ToastLevel,
            TurnChangedEvent,
        },
    },
    state::{SharedState, game::GameSession},
};

const EVENT_QUESTION_OPENED: &str = "question.opened";
const EVENT_QUESTION_CLOSED: &str = "question.closed";
const EVENT_CLOCK_TICK: &str = "clock.tick";
const EVENT_TURN_CHANGED: &str = "turn.changed";
const EVENT_ANSWER_RESOLVED: &str = "answer.resolved";
const EVENT_GAME_SESSION: &str = "game.session";
const EVENT_GAME_COMPLETED: &str = "game.completed";
const EVENT_TOAST: &str = "toast";
const EVENT_STATUS: &str = "status";

/// Broadcast that a question view has opened.
pub fn broadcast_question_opened(state: &SharedState, view: &QuestionView) {
    let payload = QuestionOpenedEvent { view: view.clone() };
    send_public_event(state, EVENT_QUESTION_OPENED, &payload);
}

/// Broadcast that the question view closed and the board is current again.
pub fn broadcast_question_closed(state: &SharedState, game_id: Uuid) {
    let payload = QuestionClosedEvent { game_id };
    send_public_event(state, EVENT_QUESTION_CLOSED, &payload);
}

/// Broadcast one second of countdown progress.
pub fn broadcast_clock_tick(state: &SharedState, time_left: u32, duration: u32) {
    let payload = ClockTickEvent {
        time_left,
        duration,
    };
    send_public_event(state, EVENT_CLOCK_TICK, &payload);
}

/// Broadcast that control passed to another team.
pub fn broadcast_turn_changed(state: &SharedState, payload: &TurnChangedEvent) {
    send_public_event(state, EVENT_TURN_CHANGED, payload);
}

/// Broadcast a resolved answer attempt with the updated scores.
pub fn broadcast_answer_resolved(state: &SharedState, payload: &AnswerResolvedEvent) {
    send_public_event(state, EVENT_ANSWER_RESOLVED, payload);
}

/// Broadcast a snapshot of the entire game session to subscribers.
pub fn broadcast_game_session(state: &SharedState, session: &GameSession) {
    let summary: GameSummary = session.clone().into();
    send_public_event(state, EVENT_GAME_SESSION, &summary);
}

/// Broadcast that a game has been completed.
pub fn broadcast_game_completed(
    state: &SharedState,
    game_id: Uuid,
    winner_index: usize,
    winning_team: String,
) {
    let payload = GameCompletedEvent {
        game_id,
        winner_index,
        winning_team,
    };
    send_public_event(state, EVENT_GAME_COMPLETED, &payload);
}

/// Broadcast a transient human-readable notification.
pub fn broadcast_toast(state: &SharedState, level: ToastLevel, message: impl Into<String>) {
    let payload = ToastEvent {
        level,
        message: message.into(),
    };
    send_public_event(state, EVENT_TOAST, &payload);
}

/// Broadcast the degraded-mode flag.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    let payload = SystemStatus { degraded };
    send_public_event(state, EVENT_STATUS, &payload);
}

fn send_public_event<T: Serialize>(state: &SharedState, name: &str, payload: &T) {
    match ServerEvent::json(Some(name.to_owned()), payload) {
        Ok(event) => state.public_sse().broadcast(event),
        Err(err) => warn!(event = name, error = %err, "failed to serialize SSE event"),
    }
}

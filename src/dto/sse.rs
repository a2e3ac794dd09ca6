use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::{game::TeamSummary, question::QuestionView};

/// Dispatched payload carried across SSE channels.
#[derive(Clone, Debug)]
pub struct ServerEvent {
    /// Optional SSE event name.
    pub event: Option<String>,
    /// Serialized data field.
    pub data: String,
}

impl ServerEvent {
    /// Build a plain-text event.
    pub fn new<E>(event: E, data: String) -> Self
    where
        E: Into<Option<String>>,
    {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

/// Broadcast when the backend enters or leaves degraded mode.
#[derive(Debug, Serialize, ToSchema)]
pub struct SystemStatus {
    /// True while no storage backend is connected.
    pub degraded: bool,
}

/// Broadcast when a question view opens.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionOpenedEvent {
    /// Full projection of the opened view.
    pub view: QuestionView,
}

/// Broadcast every second while the countdown runs.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClockTickEvent {
    /// Seconds remaining.
    pub time_left: u32,
    /// Duration the countdown started from.
    pub duration: u32,
}

/// Broadcast whenever control passes to another team.
#[derive(Debug, Serialize, ToSchema)]
pub struct TurnChangedEvent {
    /// Zero-based count of turns taken on the current question.
    pub turn_counter: u32,
    /// Index of the newly active team.
    pub team_index: usize,
    /// Display name of the newly active team, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    /// Seconds granted for the new turn.
    pub duration: u32,
    /// True when the previous turn ended because its time ran out.
    pub timed_out: bool,
}

/// Broadcast when an answer attempt resolves.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerResolvedEvent {
    /// Whether the answer was judged correct.
    pub is_correct: bool,
    /// Team credited with the answer, when one answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_index: Option<usize>,
    /// Points credited for the attempt.
    pub points_awarded: i32,
    /// Updated team scores.
    pub teams: Vec<TeamSummary>,
}

/// Broadcast when a question view closes and the board becomes current again.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionClosedEvent {
    /// Game the closed question belonged to.
    pub game_id: Uuid,
}

/// Broadcast when a game is completed.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameCompletedEvent {
    /// Completed game.
    pub game_id: Uuid,
    /// Index of the winning team.
    pub winner_index: usize,
    /// Display name of the winning team.
    pub winning_team: String,
}

/// Severity of a toast notification.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ToastLevel {
    /// Informational notice.
    Info,
    /// Something went wrong but gameplay continues.
    Warning,
}

/// Broadcast for transient, human-readable notifications.
#[derive(Debug, Serialize, ToSchema)]
pub struct ToastEvent {
    /// Severity of the notification.
    pub level: ToastLevel,
    /// Human readable message.
    pub message: String,
}

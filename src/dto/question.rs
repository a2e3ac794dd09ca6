use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::MediaKind,
    dto::{game::TeamSummary, phase::VisibleQuestionPhase},
    state::{
        clock::ClockState,
        game::{MediaRef, Question},
        turn::TurnSnapshot,
    },
};

/// Request to open a question view for a board slot.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct OpenQuestionRequest {
    /// Identifier of the question occupying the slot.
    pub question_id: u32,
    /// Category the slot belongs to.
    pub category_id: u32,
    /// Difficulty level of the slot (1-3).
    #[validate(range(min = 1, max = 3))]
    pub difficulty: u8,
}

/// Answer submission for the question on screen.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitAnswerRequest {
    /// Whether a team answered correctly.
    pub is_correct: bool,
    /// Team credited with the answer; defaults to the active team.
    #[serde(default)]
    pub team_index: Option<usize>,
}

/// Media attachment kinds exposed to clients.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MediaKindView {
    /// Still image.
    Image,
    /// Video clip.
    Video,
}

impl From<MediaKind> for MediaKindView {
    fn from(value: MediaKind) -> Self {
        match value {
            MediaKind::Image => MediaKindView::Image,
            MediaKind::Video => MediaKindView::Video,
        }
    }
}

/// Media attachment reference exposed to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MediaRefView {
    /// Kind of media the URL points to.
    pub kind: MediaKindView,
    /// URL of the media resource.
    pub url: String,
}

impl From<&MediaRef> for MediaRefView {
    fn from(value: &MediaRef) -> Self {
        Self {
            kind: value.kind.into(),
            url: value.url.clone(),
        }
    }
}

/// Snapshot of the question being played.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuestionSnapshot {
    /// Identifier of the question within its category.
    pub id: u32,
    /// Category the question belongs to.
    pub category_id: u32,
    /// Display name of the category.
    pub category_name: String,
    /// Difficulty level (1-3, doubles as the point value).
    pub difficulty: u8,
    /// Prompt text shown to the players.
    pub text: String,
    /// Correct answer text.
    pub answer: String,
    /// Optional media attachment.
    pub media: Option<MediaRefView>,
}

impl From<&Question> for QuestionSnapshot {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id,
            category_id: question.category_id,
            category_name: question.category_name.clone(),
            difficulty: question.difficulty,
            text: question.text.clone(),
            answer: question.answer.clone(),
            media: question.media.as_ref().map(Into::into),
        }
    }
}

/// Turn state snapshot for the question on screen.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TurnStateView {
    /// Zero-based count of turns taken on this question.
    pub turn_counter: u32,
    /// Index of the active team.
    pub team_index: usize,
    /// Display name of the active team, when known.
    pub team_name: Option<String>,
    /// Seconds the active team has for this turn.
    pub duration: u32,
}

impl TurnStateView {
    /// Build a turn view from a scheduler snapshot and the team roster.
    pub fn from_snapshot(snapshot: TurnSnapshot, teams: &[TeamSummary]) -> Self {
        Self {
            turn_counter: snapshot.turn_counter,
            team_index: snapshot.team_index,
            team_name: teams.get(snapshot.team_index).map(|team| team.name.clone()),
            duration: snapshot.duration,
        }
    }
}

/// Countdown snapshot for the question on screen.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClockView {
    /// Seconds remaining.
    pub time_left: u32,
    /// Duration the countdown started from.
    pub duration: u32,
    /// True while the countdown is ticking.
    pub running: bool,
}

impl From<ClockState> for ClockView {
    fn from(value: ClockState) -> Self {
        Self {
            time_left: value.time_left,
            duration: value.duration,
            running: value.running,
        }
    }
}

/// Full projection of the question view returned by the question endpoints.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuestionView {
    /// Lifecycle phase of the view.
    pub phase: VisibleQuestionPhase,
    /// Game the question belongs to.
    pub game_id: Uuid,
    /// Question payload, present while the view is active.
    pub question: Option<QuestionSnapshot>,
    /// Teams with their current scores, in rotation order.
    pub teams: Vec<TeamSummary>,
    /// Turn state, present while the view is active.
    pub turn: Option<TurnStateView>,
    /// Countdown state, present while the view is active.
    pub clock: Option<ClockView>,
}

/// Outcome of an answer submission.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerResolution {
    /// Whether the answer was judged correct.
    pub is_correct: bool,
    /// Team credited with the answer, when one answered.
    pub team_index: Option<usize>,
    /// Points credited for the attempt.
    pub points_awarded: i32,
    /// Updated team scores.
    pub teams: Vec<TeamSummary>,
}

use serde::Serialize;
use utoipa::ToSchema;

use crate::state::session::{ActiveStage, QuestionPhase};

/// Publicly visible question lifecycle phase exposed to clients (REST/SSE).
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleQuestionPhase {
    /// Question and game metadata are being fetched.
    Loading,
    /// Question on screen, answer hidden, clock running.
    Ready,
    /// Answer revealed, team selection live, clock still running.
    Answering,
    /// Question resolved or abandoned.
    Closed,
    /// The question or game does not exist.
    NotFound,
}

impl From<&QuestionPhase> for VisibleQuestionPhase {
    fn from(value: &QuestionPhase) -> Self {
        match value {
            QuestionPhase::Loading => VisibleQuestionPhase::Loading,
            QuestionPhase::Active(active) => match active.stage {
                ActiveStage::Ready => VisibleQuestionPhase::Ready,
                ActiveStage::Answering => VisibleQuestionPhase::Answering,
            },
            QuestionPhase::Closed => VisibleQuestionPhase::Closed,
            QuestionPhase::NotFound => VisibleQuestionPhase::NotFound,
        }
    }
}

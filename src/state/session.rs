//! Lifecycle state machine for one question view.
//!
//! Phases follow `Loading -> Active(Ready) -> Active(Answering) -> Closed`,
//! with `NotFound` as the terminal phase when the question or game is
//! missing. The `Active` variant carries the fetched question and the turn
//! scheduler, so operations that need a live question are unrepresentable in
//! any other phase; in particular a second submit finds the session already
//! `Closed` and is rejected by construction.

use std::mem;

use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    dao::models::QuestionSlotKey,
    state::{
        clock::{ClockEvent, TurnClock},
        game::Question,
        turn::TurnScheduler,
    },
};

/// Stage of an active (loaded) question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveStage {
    /// Clock running, answer still hidden.
    Ready,
    /// Answer revealed, team-selection actions live. The clock keeps running.
    Answering,
}

/// Payload carried while a question is live on screen.
#[derive(Debug)]
pub struct ActiveQuestion {
    /// The question being played. Immutable once fetched.
    pub question: Question,
    /// Turn rotation state for this question.
    pub scheduler: TurnScheduler,
    /// Reveal stage.
    pub stage: ActiveStage,
}

/// Phases of one question view's lifecycle.
#[derive(Debug)]
pub enum QuestionPhase {
    /// Fetching question and game metadata.
    Loading,
    /// Question on screen, countdown cycling through teams.
    Active(ActiveQuestion),
    /// Question resolved or abandoned; clock stopped.
    Closed,
    /// The question or game does not exist.
    NotFound,
}

impl QuestionPhase {
    fn name(&self) -> &'static str {
        match self {
            QuestionPhase::Loading => "loading",
            QuestionPhase::Active(active) => match active.stage {
                ActiveStage::Ready => "ready",
                ActiveStage::Answering => "answering",
            },
            QuestionPhase::Closed => "closed",
            QuestionPhase::NotFound => "not_found",
        }
    }
}

/// Events applied to the lifecycle machine.
#[derive(Debug)]
pub enum QuestionEvent {
    /// Question and game metadata arrived; the view becomes playable.
    Loaded(ActiveQuestion),
    /// The question or game could not be found.
    Missing,
    /// The answer is revealed to the players.
    Reveal,
    /// An answer outcome is being submitted.
    Submit,
    /// The view is closed or navigated away from.
    Close,
}

impl QuestionEvent {
    fn name(&self) -> &'static str {
        match self {
            QuestionEvent::Loaded(_) => "loaded",
            QuestionEvent::Missing => "missing",
            QuestionEvent::Reveal => "reveal",
            QuestionEvent::Submit => "submit",
            QuestionEvent::Close => "close",
        }
    }
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid transition: `{event}` cannot be applied while in `{from}`")]
pub struct InvalidTransition {
    /// Phase the machine was in when the invalid event was received.
    pub from: &'static str,
    /// The event that cannot be applied from this phase.
    pub event: &'static str,
}

/// One question view's lifecycle: phase machine plus the owned clock.
pub struct QuestionSession {
    id: Uuid,
    game_id: Uuid,
    slot: QuestionSlotKey,
    phase: QuestionPhase,
    clock: TurnClock,
}

impl QuestionSession {
    /// Create a session in the `Loading` phase. Clock events for this view
    /// are reported on `events`.
    pub fn open(
        game_id: Uuid,
        slot: QuestionSlotKey,
        events: mpsc::UnboundedSender<ClockEvent>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            game_id,
            slot,
            phase: QuestionPhase::Loading,
            clock: TurnClock::new(events),
        }
    }

    /// Unique identifier of this session instance.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Game this question belongs to.
    pub fn game_id(&self) -> Uuid {
        self.game_id
    }

    /// Board slot being played.
    pub fn slot(&self) -> QuestionSlotKey {
        self.slot
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> &QuestionPhase {
        &self.phase
    }

    /// The countdown clock owned by this session.
    pub fn clock(&self) -> &TurnClock {
        &self.clock
    }

    /// Mutable access to the countdown clock.
    pub fn clock_mut(&mut self) -> &mut TurnClock {
        &mut self.clock
    }

    /// Live question payload, when the session is active.
    pub fn active(&self) -> Option<&ActiveQuestion> {
        match &self.phase {
            QuestionPhase::Active(active) => Some(active),
            _ => None,
        }
    }

    /// Mutable live question payload, when the session is active.
    pub fn active_mut(&mut self) -> Option<&mut ActiveQuestion> {
        match &mut self.phase {
            QuestionPhase::Active(active) => Some(active),
            _ => None,
        }
    }

    /// Apply a lifecycle event.
    ///
    /// Returns the released [`ActiveQuestion`] payload when the event moves
    /// the session out of the active phase (`Submit`/`Close`), so the caller
    /// can resolve the answer against it.
    pub fn apply(
        &mut self,
        event: QuestionEvent,
    ) -> Result<Option<ActiveQuestion>, InvalidTransition> {
        let current = mem::replace(&mut self.phase, QuestionPhase::Closed);
        match (current, event) {
            (QuestionPhase::Loading, QuestionEvent::Loaded(active)) => {
                self.phase = QuestionPhase::Active(active);
                Ok(None)
            }
            (QuestionPhase::Loading, QuestionEvent::Missing) => {
                self.phase = QuestionPhase::NotFound;
                Ok(None)
            }
            (QuestionPhase::Active(mut active), QuestionEvent::Reveal)
                if active.stage == ActiveStage::Ready =>
            {
                active.stage = ActiveStage::Answering;
                self.phase = QuestionPhase::Active(active);
                Ok(None)
            }
            (QuestionPhase::Active(active), QuestionEvent::Submit)
                if active.stage == ActiveStage::Answering =>
            {
                self.phase = QuestionPhase::Closed;
                Ok(Some(active))
            }
            (QuestionPhase::Active(active), QuestionEvent::Close) => {
                self.phase = QuestionPhase::Closed;
                Ok(Some(active))
            }
            (other, event) => {
                let err = InvalidTransition {
                    from: other.name(),
                    event: event.name(),
                };
                self.phase = other;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::turn::AnswerTimes;
    use tokio::sync::mpsc::unbounded_channel;

    fn question() -> Question {
        Question {
            id: 1,
            category_id: 2,
            category_name: "History".into(),
            difficulty: 2,
            text: "Prompt".into(),
            answer: "Answer".into(),
            media: None,
        }
    }

    fn active() -> ActiveQuestion {
        ActiveQuestion {
            question: question(),
            scheduler: TurnScheduler::new(2, 0, AnswerTimes::fallback()),
            stage: ActiveStage::Ready,
        }
    }

    fn session() -> QuestionSession {
        let (tx, _rx) = unbounded_channel();
        QuestionSession::open(
            Uuid::new_v4(),
            QuestionSlotKey {
                category_id: 2,
                difficulty: 2,
                question_id: 1,
            },
            tx,
        )
    }

    #[tokio::test]
    async fn happy_path_through_a_question() {
        let mut session = session();
        assert!(matches!(session.phase(), QuestionPhase::Loading));

        session.apply(QuestionEvent::Loaded(active())).unwrap();
        assert!(session.active().is_some());

        session.apply(QuestionEvent::Reveal).unwrap();
        let released = session.apply(QuestionEvent::Submit).unwrap();
        assert_eq!(released.unwrap().question.id, 1);
        assert!(matches!(session.phase(), QuestionPhase::Closed));
    }

    #[tokio::test]
    async fn missing_question_reaches_the_not_found_phase() {
        let mut session = session();
        session.apply(QuestionEvent::Missing).unwrap();
        assert!(matches!(session.phase(), QuestionPhase::NotFound));

        // Nothing is playable from there.
        let err = session.apply(QuestionEvent::Reveal).unwrap_err();
        assert_eq!(err.from, "not_found");
        assert_eq!(err.event, "reveal");
    }

    #[tokio::test]
    async fn submit_before_reveal_is_rejected() {
        let mut session = session();
        session.apply(QuestionEvent::Loaded(active())).unwrap();

        let err = session.apply(QuestionEvent::Submit).unwrap_err();
        assert_eq!(err.from, "ready");
        assert!(session.active().is_some());
    }

    #[tokio::test]
    async fn second_submit_is_rejected() {
        let mut session = session();
        session.apply(QuestionEvent::Loaded(active())).unwrap();
        session.apply(QuestionEvent::Reveal).unwrap();
        session.apply(QuestionEvent::Submit).unwrap();

        let err = session.apply(QuestionEvent::Submit).unwrap_err();
        assert_eq!(err.from, "closed");
    }

    #[tokio::test]
    async fn close_releases_the_payload_from_either_active_stage() {
        let mut session = session();
        session.apply(QuestionEvent::Loaded(active())).unwrap();
        let released = session.apply(QuestionEvent::Close).unwrap();
        assert!(released.is_some());
        assert!(matches!(session.phase(), QuestionPhase::Closed));
    }

    #[tokio::test]
    async fn double_reveal_is_rejected() {
        let mut session = session();
        session.apply(QuestionEvent::Loaded(active())).unwrap();
        session.apply(QuestionEvent::Reveal).unwrap();

        let err = session.apply(QuestionEvent::Reveal).unwrap_err();
        assert_eq!(err.from, "answering");
    }
}

use std::time::SystemTime;

use uuid::Uuid;

use crate::{
    dao::models::{
        AnsweredQuestionEntity, GameEntity, MediaKind, MediaRefEntity, QuestionEntity,
        QuestionSlotKey, TeamEntity,
    },
    state::turn::AnswerTimes,
};

/// Team info tracked during a game session.
#[derive(Debug, Clone)]
pub struct Team {
    /// Stable identifier for the team.
    pub id: Uuid,
    /// Display name chosen for the team.
    pub name: String,
    /// Display color assigned to the team (hex string).
    pub color: String,
    /// Current score for the team.
    pub score: i32,
}

/// Runtime representation of a question fetched for one turn. Immutable once
/// fetched.
#[derive(Debug, Clone)]
pub struct Question {
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
    /// Optional media attachment displayed with the prompt.
    pub media: Option<MediaRef>,
}

impl Question {
    /// Points awarded for answering this question correctly.
    pub fn points(&self) -> i32 {
        i32::from(self.difficulty)
    }

    /// The board slot this question occupies.
    pub fn slot(&self) -> QuestionSlotKey {
        QuestionSlotKey {
            category_id: self.category_id,
            difficulty: self.difficulty,
            question_id: self.id,
        }
    }
}

/// Reference to a media resource attached to a question.
#[derive(Debug, Clone)]
pub struct MediaRef {
    /// Kind of media the URL points to.
    pub kind: MediaKind,
    /// URL of the media resource.
    pub url: String,
}

/// Aggregated state for an in-progress or persisted game session.
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Primary key of the game.
    pub id: Uuid,
    /// Display name of the game.
    pub name: String,
    /// Optional logo shown on the board header.
    pub logo_url: Option<String>,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Last time the game was updated.
    pub updated_at: SystemTime,
    /// Participating teams and their current scores, in rotation order.
    pub teams: Vec<Team>,
    /// Categories selected for this game's board.
    pub selected_categories: Vec<u32>,
    /// Index of the team whose turn is active, durable across questions.
    pub current_team_index: usize,
    /// Answer time allowances for this game.
    pub answer_times: AnswerTimes,
    /// Slots that have been shown to the players (anti-replay record).
    pub viewed_questions: Vec<QuestionSlotKey>,
    /// Slots that have been resolved with an answer outcome.
    pub answered_questions: Vec<AnsweredQuestionEntity>,
    /// Whether the game has been completed.
    pub is_completed: bool,
    /// Index of the winning team once the game is completed.
    pub winner_index: Option<usize>,
}

impl GameSession {
    /// Build a new in-memory session with the provided metadata.
    pub fn new(
        name: String,
        logo_url: Option<String>,
        teams: Vec<Team>,
        selected_categories: Vec<u32>,
        answer_times: AnswerTimes,
    ) -> Self {
        let timestamp = SystemTime::now();

        Self {
            id: Uuid::new_v4(),
            name,
            logo_url,
            created_at: timestamp,
            updated_at: timestamp,
            teams,
            selected_categories,
            current_team_index: 0,
            answer_times,
            viewed_questions: Vec::new(),
            answered_questions: Vec::new(),
            is_completed: false,
            winner_index: None,
        }
    }

    /// Index of the team with the strictly highest score. Ties keep the
    /// earlier team; an all-zero board yields index 0.
    pub fn leading_team_index(&self) -> usize {
        let mut winner_index = 0;
        let mut highest_score = 0;
        for (index, team) in self.teams.iter().enumerate() {
            if team.score > highest_score {
                highest_score = team.score;
                winner_index = index;
            }
        }
        winner_index
    }
}

impl From<TeamEntity> for Team {
    fn from(value: TeamEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            color: value.color,
            score: value.score,
        }
    }
}

impl From<Team> for TeamEntity {
    fn from(value: Team) -> Self {
        Self {
            id: value.id,
            name: value.name,
            color: value.color,
            score: value.score,
        }
    }
}

impl From<MediaRefEntity> for MediaRef {
    fn from(value: MediaRefEntity) -> Self {
        Self {
            kind: value.kind,
            url: value.url,
        }
    }
}

impl From<QuestionEntity> for Question {
    fn from(value: QuestionEntity) -> Self {
        Self {
            id: value.question_id,
            category_id: value.category_id,
            category_name: value.category_name,
            difficulty: value.difficulty,
            text: value.text,
            answer: value.answer,
            media: value.media.map(Into::into),
        }
    }
}

impl From<GameEntity> for GameSession {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            logo_url: value.logo_url,
            created_at: value.created_at,
            updated_at: value.updated_at,
            teams: value.teams.into_iter().map(Into::into).collect(),
            selected_categories: value.selected_categories,
            current_team_index: value.current_team_index,
            answer_times: value.answer_times.into(),
            viewed_questions: value.viewed_questions,
            answered_questions: value.answered_questions,
            is_completed: value.is_completed,
            winner_index: value.winner_index,
        }
    }
}

impl From<GameSession> for GameEntity {
    fn from(value: GameSession) -> Self {
        Self {
            id: value.id,
            name: value.name,
            logo_url: value.logo_url,
            created_at: value.created_at,
            updated_at: value.updated_at,
            teams: value.teams.into_iter().map(Into::into).collect(),
            selected_categories: value.selected_categories,
            current_team_index: value.current_team_index,
            answer_times: value.answer_times.into(),
            viewed_questions: value.viewed_questions,
            answered_questions: value.answered_questions,
            is_completed: value.is_completed,
            winner_index: value.winner_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(name: &str, score: i32) -> Team {
        Team {
            id: Uuid::new_v4(),
            name: name.into(),
            color: "#FF5733".into(),
            score,
        }
    }

    #[test]
    fn leading_team_prefers_the_strictly_highest_score() {
        let mut game = GameSession::new(
            "quiz night".into(),
            None,
            vec![team("A", 3), team("B", 5), team("C", 5)],
            vec![1, 2, 3, 4],
            AnswerTimes::fallback(),
        );
        assert_eq!(game.leading_team_index(), 1);

        // All-zero scores keep the first team as leader.
        for team in &mut game.teams {
            team.score = 0;
        }
        assert_eq!(game.leading_team_index(), 0);
    }
}

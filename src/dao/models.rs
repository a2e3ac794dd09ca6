use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Representation of a team stored in persistence and shared across layers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamEntity {
    /// Stable identifier for the team.
    pub id: Uuid,
    /// Display name chosen for the team.
    pub name: String,
    /// Display color assigned to the team (hex string).
    pub color: String,
    /// Current score for the team.
    pub score: i32,
}

/// Per-game answer time allowances, one slot per turn in the rotation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerTimesEntity {
    /// Seconds granted to the first team on a question.
    pub first: u32,
    /// Seconds granted on the second turn (and any unconfigured later slot).
    pub second: u32,
    /// Optional override for the third turn slot.
    pub third: Option<u32>,
    /// Optional override for the fourth turn slot.
    pub fourth: Option<u32>,
}

/// Identifies one question slot on the board: a question within a category at
/// a given difficulty.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct QuestionSlotKey {
    /// Category the slot belongs to.
    pub category_id: u32,
    /// Difficulty level of the slot (1-3, doubles as the point value).
    pub difficulty: u8,
    /// Identifier of the question occupying the slot.
    pub question_id: u32,
}

/// Ledger entry recording a resolved answer attempt for a question slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnsweredQuestionEntity {
    /// The slot that was answered.
    pub slot: QuestionSlotKey,
    /// Team that answered, when one did.
    pub team_index: Option<usize>,
    /// Whether the answer was judged correct.
    pub is_correct: bool,
    /// Points credited for the attempt (0 for incorrect or unanswered).
    pub points_awarded: i32,
}

/// Aggregate game entity persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Primary key of the game.
    pub id: Uuid,
    /// Display name of the game.
    pub name: String,
    /// Optional logo shown on the board header.
    pub logo_url: Option<String>,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Last time the game entity was updated.
    pub updated_at: SystemTime,
    /// Participating teams and their current scores, in rotation order.
    pub teams: Vec<TeamEntity>,
    /// Categories selected for this game's board.
    pub selected_categories: Vec<u32>,
    /// Index of the team whose turn is active, durable across questions.
    pub current_team_index: usize,
    /// Answer time allowances for this game.
    pub answer_times: AnswerTimesEntity,
    /// Slots that have been shown to the players (anti-replay record).
    pub viewed_questions: Vec<QuestionSlotKey>,
    /// Slots that have been resolved with an answer outcome.
    pub answered_questions: Vec<AnsweredQuestionEntity>,
    /// Whether the game has been completed.
    pub is_completed: bool,
    /// Index of the winning team once the game is completed.
    pub winner_index: Option<usize>,
}

/// Question definition persisted in the question bank.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionEntity {
    /// Identifier of the question within its category.
    pub question_id: u32,
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
    pub media: Option<MediaRefEntity>,
}

/// Reference to a media resource attached to a question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaRefEntity {
    /// Kind of media the URL points to.
    pub kind: MediaKind,
    /// URL of the media resource.
    pub url: String,
}

/// Supported media attachment kinds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Still image.
    Image,
    /// Video clip.
    Video,
}

/// Stored game settings driving game creation defaults and limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSettingsEntity {
    /// Minimum number of categories per game.
    pub min_categories: usize,
    /// Maximum number of categories per game.
    pub max_categories: usize,
    /// Minimum number of teams per game.
    pub min_teams: usize,
    /// Maximum number of teams per game.
    pub max_teams: usize,
    /// Default seconds for the first answer turn.
    pub default_first_answer_time: u32,
    /// Default seconds for the second answer turn.
    pub default_second_answer_time: u32,
    /// Default seconds for the third answer turn, when configured.
    pub default_third_answer_time: Option<u32>,
    /// Default seconds for the fourth answer turn, when configured.
    pub default_fourth_answer_time: Option<u32>,
}

impl Default for GameSettingsEntity {
    fn default() -> Self {
        Self {
            min_categories: 4,
            max_categories: 8,
            min_teams: 2,
            max_teams: 4,
            default_first_answer_time: 30,
            default_second_answer_time: 15,
            default_third_answer_time: None,
            default_fourth_answer_time: None,
        }
    }
}

/// Summary representation of a team used in game listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamSummaryEntity {
    /// Stable identifier for the team.
    pub id: Uuid,
    /// Display name chosen for the team.
    pub name: String,
    /// Current score for the team.
    pub score: i32,
}

/// Aggregate game list item entity (subset of [`GameEntity`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameListItemEntity {
    /// Primary key of the game.
    pub id: Uuid,
    /// Display name of the game.
    pub name: String,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Last time the game entity was updated.
    pub updated_at: SystemTime,
    /// Participating teams.
    pub teams: Vec<TeamSummaryEntity>,
    /// Whether the game has been completed.
    pub is_completed: bool,
}

impl From<TeamEntity> for TeamSummaryEntity {
    fn from(value: TeamEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            score: value.score,
        }
    }
}

impl From<GameEntity> for GameListItemEntity {
    fn from(entity: GameEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            teams: entity.teams.into_iter().map(Into::into).collect(),
            is_completed: entity.is_completed,
        }
    }
}

/// Outcome payload handed to the store when an answer attempt resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    /// The slot that was answered.
    pub slot: QuestionSlotKey,
    /// Team credited with the answer, when one answered.
    pub team_index: Option<usize>,
    /// Whether the answer was judged correct.
    pub is_correct: bool,
    /// Points to credit when correct (the question's difficulty).
    pub points: i32,
}

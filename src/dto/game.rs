use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{
        AnsweredQuestionEntity, GameListItemEntity, GameSettingsEntity, QuestionSlotKey,
    },
    dto::format_system_time,
    state::{
        game::{GameSession, Team},
        turn::AnswerTimes,
    },
};

/// Payload used to bootstrap a brand-new game.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateGameRequest {
    /// Display name of the game.
    #[validate(length(min = 1, max = 30))]
    pub name: String,
    /// Optional logo shown on the board header.
    #[serde(default)]
    #[validate(url)]
    pub logo_url: Option<String>,
    /// Teams in rotation order.
    #[validate(nested)]
    pub teams: Vec<TeamInput>,
    /// Categories selected for the board.
    pub selected_categories: Vec<u32>,
    /// Override for the first answer time; defaults from stored settings.
    #[serde(default)]
    #[validate(range(min = 1))]
    pub answer_time_first: Option<u32>,
    /// Override for the second answer time; defaults from stored settings.
    #[serde(default)]
    #[validate(range(min = 1))]
    pub answer_time_second: Option<u32>,
    /// Optional third answer time slot.
    #[serde(default)]
    #[validate(range(min = 1))]
    pub answer_time_third: Option<u32>,
    /// Optional fourth answer time slot.
    #[serde(default)]
    #[validate(range(min = 1))]
    pub answer_time_fourth: Option<u32>,
}

/// Incoming team definition for the game bootstrap.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct TeamInput {
    /// Display name chosen for the team.
    #[validate(length(min = 1, max = 20))]
    pub name: String,
}

/// Public projection of a team exposed to REST/SSE clients.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct TeamSummary {
    /// Stable identifier for the team.
    pub id: Uuid,
    /// Display name chosen for the team.
    pub name: String,
    /// Display color assigned to the team (hex string).
    pub color: String,
    /// Current score for the team.
    pub score: i32,
}

impl From<&Team> for TeamSummary {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id,
            name: team.name.clone(),
            color: team.color.clone(),
            score: team.score,
        }
    }
}

/// Answer time allowances exposed to clients.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerTimesView {
    /// Seconds for the first turn.
    pub first: u32,
    /// Seconds for the second turn and unconfigured later slots.
    pub second: u32,
    /// Optional third turn slot.
    pub third: Option<u32>,
    /// Optional fourth turn slot.
    pub fourth: Option<u32>,
}

impl From<AnswerTimes> for AnswerTimesView {
    fn from(value: AnswerTimes) -> Self {
        Self {
            first: value.first,
            second: value.second,
            third: value.third,
            fourth: value.fourth,
        }
    }
}

/// Board slot reference exposed to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionSlotView {
    /// Category the slot belongs to.
    pub category_id: u32,
    /// Difficulty level of the slot.
    pub difficulty: u8,
    /// Identifier of the question occupying the slot.
    pub question_id: u32,
}

impl From<QuestionSlotKey> for QuestionSlotView {
    fn from(value: QuestionSlotKey) -> Self {
        Self {
            category_id: value.category_id,
            difficulty: value.difficulty,
            question_id: value.question_id,
        }
    }
}

/// Resolved answer ledger entry exposed to clients.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct AnsweredSlotView {
    /// The slot that was answered.
    pub slot: QuestionSlotView,
    /// Team credited with the answer, when one answered.
    pub team_index: Option<usize>,
    /// Whether the answer was judged correct.
    pub is_correct: bool,
    /// Points credited for the attempt.
    pub points_awarded: i32,
}

impl From<AnsweredQuestionEntity> for AnsweredSlotView {
    fn from(value: AnsweredQuestionEntity) -> Self {
        Self {
            slot: value.slot.into(),
            team_index: value.team_index,
            is_correct: value.is_correct,
            points_awarded: value.points_awarded,
        }
    }
}

/// Summary returned once a game has been created or loaded; also the durable
/// board view.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct GameSummary {
    /// Primary key of the game.
    pub id: Uuid,
    /// Display name of the game.
    pub name: String,
    /// Optional logo shown on the board header.
    pub logo_url: Option<String>,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Last update timestamp (RFC 3339).
    pub updated_at: String,
    /// Participating teams and their current scores, in rotation order.
    pub teams: Vec<TeamSummary>,
    /// Categories selected for the board.
    pub selected_categories: Vec<u32>,
    /// Index of the team whose turn is active.
    pub current_team_index: usize,
    /// Answer time allowances for this game.
    pub answer_times: AnswerTimesView,
    /// Slots already shown to the players.
    pub viewed_questions: Vec<QuestionSlotView>,
    /// Slots already resolved with an answer outcome.
    pub answered_questions: Vec<AnsweredSlotView>,
    /// Whether the game has been completed.
    pub is_completed: bool,
    /// Index of the winning team once the game is completed.
    pub winner_index: Option<usize>,
}

impl From<GameSession> for GameSummary {
    fn from(session: GameSession) -> Self {
        Self {
            id: session.id,
            name: session.name,
            logo_url: session.logo_url,
            created_at: format_system_time(session.created_at),
            updated_at: format_system_time(session.updated_at),
            teams: session.teams.iter().map(Into::into).collect(),
            selected_categories: session.selected_categories,
            current_team_index: session.current_team_index,
            answer_times: session.answer_times.into(),
            viewed_questions: session.viewed_questions.into_iter().map(Into::into).collect(),
            answered_questions: session
                .answered_questions
                .into_iter()
                .map(Into::into)
                .collect(),
            is_completed: session.is_completed,
            winner_index: session.winner_index,
        }
    }
}

/// Entry in the stored games listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameListItem {
    /// Primary key of the game.
    pub id: Uuid,
    /// Display name of the game.
    pub name: String,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Last update timestamp (RFC 3339).
    pub updated_at: String,
    /// Participating teams with their scores.
    pub teams: Vec<TeamBrief>,
    /// Whether the game has been completed.
    pub is_completed: bool,
}

/// Minimal team projection used in listings.
#[derive(Debug, Serialize, ToSchema)]
pub struct TeamBrief {
    /// Stable identifier for the team.
    pub id: Uuid,
    /// Display name chosen for the team.
    pub name: String,
    /// Current score for the team.
    pub score: i32,
}

impl From<GameListItemEntity> for GameListItem {
    fn from(value: GameListItemEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            created_at: format_system_time(value.created_at),
            updated_at: format_system_time(value.updated_at),
            teams: value
                .teams
                .into_iter()
                .map(|team| TeamBrief {
                    id: team.id,
                    name: team.name,
                    score: team.score,
                })
                .collect(),
            is_completed: value.is_completed,
        }
    }
}

/// Final standings for a completed (or ending) game.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameResults {
    /// Primary key of the game.
    pub id: Uuid,
    /// Display name of the game.
    pub name: String,
    /// Standings in rotation order with the winner flagged.
    pub teams: Vec<TeamResult>,
    /// Display name of the winning team.
    pub winning_team: String,
    /// Whether the game has been formally completed.
    pub is_completed: bool,
}

/// One team's final standing.
#[derive(Debug, Serialize, ToSchema)]
pub struct TeamResult {
    /// Stable identifier for the team.
    pub id: Uuid,
    /// Display name chosen for the team.
    pub name: String,
    /// Display color assigned to the team.
    pub color: String,
    /// Final score.
    pub score: i32,
    /// True for the winning team.
    pub is_winner: bool,
}

/// Stored game settings exposed read-only to clients.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct GameSettingsView {
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

impl From<GameSettingsEntity> for GameSettingsView {
    fn from(value: GameSettingsEntity) -> Self {
        Self {
            min_categories: value.min_categories,
            max_categories: value.max_categories,
            min_teams: value.min_teams,
            max_teams: value.max_teams,
            default_first_answer_time: value.default_first_answer_time,
            default_second_answer_time: value.default_second_answer_time,
            default_third_answer_time: value.default_third_answer_time,
            default_fourth_answer_time: value.default_fourth_answer_time,
        }
    }
}

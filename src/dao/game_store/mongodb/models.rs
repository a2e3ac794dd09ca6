use mongodb::bson::{Binary, DateTime, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{
    AnswerTimesEntity, AnsweredQuestionEntity, GameEntity, QuestionSlotKey, TeamEntity,
};

/// Game document as stored in the `games` collection. Timestamps are kept as
/// BSON datetimes; everything else round-trips through the shared entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    name: String,
    logo_url: Option<String>,
    created_at: DateTime,
    updated_at: DateTime,
    teams: Vec<TeamEntity>,
    selected_categories: Vec<u32>,
    current_team_index: usize,
    answer_times: AnswerTimesEntity,
    #[serde(default)]
    viewed_questions: Vec<QuestionSlotKey>,
    #[serde(default)]
    answered_questions: Vec<AnsweredQuestionEntity>,
    #[serde(default)]
    is_completed: bool,
    winner_index: Option<usize>,
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            logo_url: value.logo_url,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
            teams: value.teams,
            selected_categories: value.selected_categories,
            current_team_index: value.current_team_index,
            answer_times: value.answer_times,
            viewed_questions: value.viewed_questions,
            answered_questions: value.answered_questions,
            is_completed: value.is_completed,
            winner_index: value.winner_index,
        }
    }
}

impl From<MongoGameDocument> for GameEntity {
    fn from(value: MongoGameDocument) -> Self {
        Self {
            id: value.id,
            name: value.name,
            logo_url: value.logo_url,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
            teams: value.teams,
            selected_categories: value.selected_categories,
            current_team_index: value.current_team_index,
            answer_times: value.answer_times,
            viewed_questions: value.viewed_questions,
            answered_questions: value.answered_questions,
            is_completed: value.is_completed,
            winner_index: value.winner_index,
        }
    }
}

fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

/// Filter selecting a document by uuid primary key.
pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}

/// Filter selecting a question by its board slot.
pub fn question_filter(slot: QuestionSlotKey) -> Document {
    doc! {
        "question_id": slot.question_id as i64,
        "category_id": slot.category_id as i64,
        "difficulty": slot.difficulty as i32,
    }
}

use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Jaweb Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::game::create_game,
        crate::routes::game::list_games,
        crate::routes::game::get_game,
        crate::routes::game::get_results,
        crate::routes::game::end_game,
        crate::routes::game::save_state,
        crate::routes::game::get_settings,
        crate::routes::question::open_question,
        crate::routes::question::current_question,
        crate::routes::question::reveal_answer,
        crate::routes::question::switch_team,
        crate::routes::question::renew_clock,
        crate::routes::question::submit_answer,
        crate::routes::question::close_question,
    ),
    components(
        schemas(
            crate::dto::common::ActionResponse,
            crate::dto::health::HealthResponse,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::TeamInput,
            crate::dto::game::TeamSummary,
            crate::dto::game::TeamBrief,
            crate::dto::game::TeamResult,
            crate::dto::game::AnswerTimesView,
            crate::dto::game::QuestionSlotView,
            crate::dto::game::AnsweredSlotView,
            crate::dto::game::GameSummary,
            crate::dto::game::GameListItem,
            crate::dto::game::GameResults,
            crate::dto::game::GameSettingsView,
            crate::dto::phase::VisibleQuestionPhase,
            crate::dto::question::OpenQuestionRequest,
            crate::dto::question::SubmitAnswerRequest,
            crate::dto::question::QuestionView,
            crate::dto::question::QuestionSnapshot,
            crate::dto::question::MediaRefView,
            crate::dto::question::MediaKindView,
            crate::dto::question::TurnStateView,
            crate::dto::question::ClockView,
            crate::dto::question::AnswerResolution,
            crate::dto::sse::QuestionOpenedEvent,
            crate::dto::sse::ClockTickEvent,
            crate::dto::sse::TurnChangedEvent,
            crate::dto::sse::AnswerResolvedEvent,
            crate::dto::sse::QuestionClosedEvent,
            crate::dto::sse::GameCompletedEvent,
            crate::dto::sse::ToastEvent,
            crate::dto::sse::SystemStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "game", description = "Game bootstrap, listing, and completion"),
        (name = "question", description = "Live question view and turn control"),
    )
)]
pub struct ApiDoc;

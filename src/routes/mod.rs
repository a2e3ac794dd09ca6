use axum::Router;

use crate::state::SharedState;

/// Swagger UI and OpenAPI document.
pub mod docs;
/// Game bootstrap, completion, and settings endpoints.
pub mod game;
/// Health check endpoint.
pub mod health;
/// Question view endpoints.
pub mod question;
/// Server-sent events stream.
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(game::router())
        .merge(question::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}

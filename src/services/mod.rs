/// OpenAPI documentation generation.
pub mod documentation;
/// Game bootstrap, completion, and settings operations.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Question view lifecycle: open, reveal, turn advancement, answer
/// resolution, close.
pub mod question_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Storage connection supervisor with reconnect/backoff.
pub mod storage_supervisor;

use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Shared response primitives.
pub mod common;
/// Game bootstrap and board projections.
pub mod game;
/// Health check payloads.
pub mod health;
/// Public projection of the question lifecycle phase.
pub mod phase;
/// Question view requests and snapshots.
pub mod question;
/// Server-sent event payloads.
pub mod sse;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

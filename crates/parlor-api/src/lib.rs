//! HTTP handlers: a thin translation layer between the wire and the room
//! engine. Handlers never hold logic of their own — they extract input, call
//! one engine operation on a blocking thread, and map the typed outcome to a
//! status code.

pub mod messages;
pub mod participants;
pub mod status;

use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use parlor_room::{MessageStore, ParticipantRegistry, RoomError};
use tracing::error;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub registry: ParticipantRegistry,
    pub store: MessageStore,
}

/// The caller's claimed identity, carried in the `User` header. Unverified
/// by design — see the trust assumption in DESIGN.md.
pub(crate) fn claimed_user(headers: &HeaderMap) -> Result<String, StatusCode> {
    headers
        .get("User")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .filter(|name| !name.is_empty())
        .ok_or(StatusCode::UNPROCESSABLE_ENTITY)
}

/// Maps engine outcomes to transport codes. Expected outcomes map silently;
/// only storage faults are logged.
pub(crate) fn respond_err(err: RoomError) -> StatusCode {
    match err {
        RoomError::Validation(_) | RoomError::UnknownSender(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RoomError::Conflict => StatusCode::CONFLICT,
        RoomError::NotFound => StatusCode::NOT_FOUND,
        RoomError::Forbidden => StatusCode::UNAUTHORIZED,
        RoomError::Storage(e) => {
            error!("storage failure: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Runs a blocking engine call off the async runtime.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, StatusCode>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, RoomError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(respond_err)
}

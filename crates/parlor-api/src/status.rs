use axum::{extract::State, http::{HeaderMap, StatusCode}};

use crate::{AppState, claimed_user, run_blocking};

/// `POST /status` — heartbeat for the calling participant.
pub async fn heartbeat(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, StatusCode> {
    let name = claimed_user(&headers)?;

    let registry = state.registry.clone();
    run_blocking(move || registry.heartbeat(&name)).await?;

    Ok(StatusCode::OK)
}

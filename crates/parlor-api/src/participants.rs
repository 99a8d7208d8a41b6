use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use parlor_types::Participant;
use parlor_types::api::RegisterRequest;

use crate::{AppState, run_blocking};

/// `POST /participants`
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let registry = state.registry.clone();
    let participant = run_blocking(move || registry.register(&req.name)).await?;

    Ok((StatusCode::CREATED, Json(participant)))
}

/// `GET /participants`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Participant>>, StatusCode> {
    let registry = state.registry.clone();
    let participants = run_blocking(move || registry.list()).await?;

    Ok(Json(participants))
}

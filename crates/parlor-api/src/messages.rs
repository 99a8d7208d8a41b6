use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;

use parlor_types::ChatMessage;
use parlor_types::api::MessagePayload;

use crate::{AppState, claimed_user, run_blocking};

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    /// Most-recent-first cap on the returned log. Kept signed so that a
    /// non-positive value reaches the engine's validation instead of being
    /// a deserialization error.
    pub limit: Option<i64>,
}

/// `POST /messages`
pub async fn post_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<MessagePayload>,
) -> Result<impl IntoResponse, StatusCode> {
    let from = claimed_user(&headers)?;

    let store = state.store.clone();
    let message =
        run_blocking(move || store.post(&from, &req.to, &req.text, &req.kind)).await?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// `GET /messages?limit=N`
pub async fn get_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MessageQuery>,
) -> Result<Json<Vec<ChatMessage>>, StatusCode> {
    let user = claimed_user(&headers)?;

    let store = state.store.clone();
    let messages = run_blocking(move || store.list_visible_to(&user, query.limit)).await?;

    Ok(Json(messages))
}

/// `PUT /messages/{id}`
pub async fn edit_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<MessagePayload>,
) -> Result<StatusCode, StatusCode> {
    let requester = claimed_user(&headers)?;

    let store = state.store.clone();
    run_blocking(move || store.edit(&id, &requester, &req.to, &req.text, &req.kind)).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /messages/{id}`
pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, StatusCode> {
    let requester = claimed_user(&headers)?;

    let store = state.store.clone();
    run_blocking(move || store.delete(&id, &requester)).await?;

    Ok(StatusCode::NO_CONTENT)
}

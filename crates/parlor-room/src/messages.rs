use std::sync::Arc;

use chrono::Local;
use parlor_db::Database;
use parlor_db::models::MessageRow;
use parlor_types::{ChatMessage, MessageKind};
use tracing::warn;
use uuid::Uuid;

use crate::error::{RoomError, RoomResult};
use crate::sanitize::sanitize;

/// Owns the ordered message log and enforces visibility and authorization.
#[derive(Clone)]
pub struct MessageStore {
    db: Arc<Database>,
}

impl MessageStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Appends a message from a present participant. `status` is reserved
    /// for system notices and is not postable.
    pub fn post(&self, from: &str, to: &str, text: &str, kind: &str) -> RoomResult<ChatMessage> {
        let (to, text, kind) = validate_payload(to, text, kind)?;

        if self.db.find_participant(from)?.is_none() {
            return Err(RoomError::UnknownSender(from.to_string()));
        }

        let now = Local::now();
        let row = MessageRow {
            id: Uuid::new_v4().to_string(),
            sender: from.to_string(),
            recipient: to,
            body: text,
            kind: kind.as_str().to_string(),
            time: now.format("%H:%M:%S").to_string(),
            posted_at: now.timestamp_millis(),
        };
        self.db.insert_message(&row)?;

        Ok(row_to_message(row))
    }

    /// Messages visible to `user`, most recent first. A message is visible
    /// iff its kind is `message` or `status`, or `user` is its sender or
    /// recipient. `limit` must be positive when given.
    pub fn list_visible_to(&self, user: &str, limit: Option<i64>) -> RoomResult<Vec<ChatMessage>> {
        if let Some(n) = limit {
            if n <= 0 {
                return Err(RoomError::Validation(format!(
                    "limit must be a positive integer, got {n}"
                )));
            }
        }

        let rows = self.db.visible_messages(user, limit)?;
        Ok(rows.into_iter().map(row_to_message).collect())
    }

    /// Removes a message. Only its author may do so.
    pub fn delete(&self, id: &str, requester: &str) -> RoomResult<()> {
        let message = self.db.find_message(id)?.ok_or(RoomError::NotFound)?;
        if message.sender != requester {
            return Err(RoomError::Forbidden);
        }

        // A concurrent delete of the same id may win the race; removing an
        // already-removed row is still success for this caller.
        self.db.delete_message(id)?;
        Ok(())
    }

    /// Rewrites `to`/`text`/`kind` and reassigns `time`. Author-only, same
    /// validation as `post`; `from`, `id`, and log position never change.
    pub fn edit(
        &self,
        id: &str,
        requester: &str,
        to: &str,
        text: &str,
        kind: &str,
    ) -> RoomResult<()> {
        let (to, text, kind) = validate_payload(to, text, kind)?;

        let message = self.db.find_message(id)?.ok_or(RoomError::NotFound)?;
        if message.sender != requester {
            return Err(RoomError::Forbidden);
        }

        let time = Local::now().format("%H:%M:%S").to_string();
        self.db
            .update_message(id, &to, &text, kind.as_str(), &time)?;
        Ok(())
    }
}

/// Sanitizes the caller-supplied fields and validates them against the
/// schema: non-empty `to`/`text`, kind one of `message`/`private_message`.
fn validate_payload(to: &str, text: &str, kind: &str) -> RoomResult<(String, String, MessageKind)> {
    let to = sanitize(to);
    let text = sanitize(text);
    let kind_text = sanitize(kind);

    if to.is_empty() {
        return Err(RoomError::Validation("to must not be empty".into()));
    }
    if text.is_empty() {
        return Err(RoomError::Validation("text must not be empty".into()));
    }

    match MessageKind::parse(&kind_text) {
        Some(kind @ (MessageKind::Message | MessageKind::PrivateMessage)) => Ok((to, text, kind)),
        _ => Err(RoomError::Validation(format!(
            "type must be message or private_message, got {kind_text:?}"
        ))),
    }
}

fn row_to_message(row: MessageRow) -> ChatMessage {
    ChatMessage {
        id: row.id.parse().unwrap_or_else(|e| {
            warn!("Corrupt message id '{}': {}", row.id, e);
            Uuid::default()
        }),
        kind: MessageKind::parse(&row.kind).unwrap_or_else(|| {
            warn!("Corrupt kind '{}' on message '{}'", row.kind, row.id);
            MessageKind::Status
        }),
        from: row.sender,
        to: row.recipient,
        text: row.body,
        time: row.time,
        posted_at: row.posted_at,
    }
}

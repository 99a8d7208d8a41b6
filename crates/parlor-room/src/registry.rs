use std::sync::Arc;

use chrono::Local;
use parlor_db::models::{MessageRow, ParticipantRow};
use parlor_db::{Database, InsertOutcome};
use parlor_types::{BROADCAST_TARGET, MessageKind, Participant};
use uuid::Uuid;

use crate::error::{RoomError, RoomResult};
use crate::sanitize::sanitize;

pub const JOIN_NOTICE: &str = "entra na sala...";

/// Owns the set of currently-present participants and their liveness
/// timestamps.
#[derive(Clone)]
pub struct ParticipantRegistry {
    db: Arc<Database>,
}

impl ParticipantRegistry {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Registers a display name and broadcasts its join notice. The insert
    /// and the notice are one transaction: a failed notice write rolls the
    /// participant back, and a duplicate name is `Conflict`.
    pub fn register(&self, name: &str) -> RoomResult<Participant> {
        let name = sanitize(name);
        if name.is_empty() {
            return Err(RoomError::Validation("name must not be empty".into()));
        }

        let now = Local::now();
        let now_ms = now.timestamp_millis();
        let participant = ParticipantRow {
            name: name.clone(),
            last_status: now_ms,
        };
        let join_notice = MessageRow {
            id: Uuid::new_v4().to_string(),
            sender: name.clone(),
            recipient: BROADCAST_TARGET.to_string(),
            body: JOIN_NOTICE.to_string(),
            kind: MessageKind::Status.as_str().to_string(),
            time: now.format("%H:%M:%S").to_string(),
            posted_at: now_ms,
        };

        match self.db.register_participant(&participant, &join_notice)? {
            InsertOutcome::Inserted => Ok(Participant {
                name,
                last_status: now_ms,
            }),
            InsertOutcome::NameTaken => Err(RoomError::Conflict),
        }
    }

    /// All currently-present participants, in insertion order.
    pub fn list(&self) -> RoomResult<Vec<Participant>> {
        let rows = self.db.list_participants()?;
        Ok(rows
            .into_iter()
            .map(|row| Participant {
                name: row.name,
                last_status: row.last_status,
            })
            .collect())
    }

    /// Records a liveness signal. `NotFound` when the name is not present;
    /// the caller's name is matched exactly as stored.
    pub fn heartbeat(&self, name: &str) -> RoomResult<()> {
        let now_ms = Local::now().timestamp_millis();
        if self.db.touch_participant(name, now_ms)? {
            Ok(())
        } else {
            Err(RoomError::NotFound)
        }
    }
}

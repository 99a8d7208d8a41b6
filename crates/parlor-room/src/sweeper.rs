use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use parlor_db::Database;
use parlor_db::models::MessageRow;
use parlor_types::{BROADCAST_TARGET, MessageKind};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::RoomResult;

pub const DEPARTURE_NOTICE: &str = "sai da sala...";

/// Expires participants whose heartbeat has gone stale and broadcasts their
/// departure notices.
#[derive(Clone)]
pub struct PresenceSweeper {
    db: Arc<Database>,
    absence_timeout: Duration,
}

impl PresenceSweeper {
    pub fn new(db: Arc<Database>, absence_timeout: Duration) -> Self {
        Self {
            db,
            absence_timeout,
        }
    }

    /// One sweep cycle. Returns how many participants were evicted.
    ///
    /// Two bulk operations: the departure notices are written first, then
    /// the eviction runs with the staleness criterion re-evaluated per row
    /// at delete time, so a heartbeat that lands mid-cycle keeps its
    /// participant in the room.
    pub fn sweep_once(&self) -> RoomResult<usize> {
        let now = Local::now();
        let cutoff = now.timestamp_millis() - self.absence_timeout.as_millis() as i64;

        let stale = self.db.stale_participant_names(cutoff)?;
        if stale.is_empty() {
            return Ok(0);
        }

        let notices: Vec<MessageRow> = stale
            .iter()
            .map(|name| MessageRow {
                id: Uuid::new_v4().to_string(),
                sender: name.clone(),
                recipient: BROADCAST_TARGET.to_string(),
                body: DEPARTURE_NOTICE.to_string(),
                kind: MessageKind::Status.as_str().to_string(),
                time: now.format("%H:%M:%S").to_string(),
                posted_at: now.timestamp_millis(),
            })
            .collect();

        self.db.insert_messages(&notices)?;
        let evicted = self.db.evict_stale(&stale, cutoff)?;
        Ok(evicted)
    }
}

/// Background task that expires stale participants.
///
/// Runs one cycle per tick and awaits it before the next; a failed cycle is
/// logged and skipped, it never ends the loop.
pub async fn run_sweep_loop(sweeper: PresenceSweeper, interval: Duration) {
    let mut interval = tokio::time::interval(interval);

    loop {
        interval.tick().await;

        let cycle = sweeper.clone();
        let result = tokio::task::spawn_blocking(move || cycle.sweep_once()).await;

        match result {
            Ok(Ok(0)) => {}
            Ok(Ok(evicted)) => {
                info!("Presence sweep: evicted {} stale participant(s)", evicted);
            }
            Ok(Err(e)) => {
                warn!("Presence sweep failed: {}", e);
            }
            Err(e) => {
                warn!("Presence sweep panicked: {}", e);
            }
        }
    }
}

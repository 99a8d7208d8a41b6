use crate::Database;
use crate::models::{MessageRow, ParticipantRow};
use anyhow::Result;
use rusqlite::Connection;

/// Result of a unique-constrained participant insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    NameTaken,
}

impl Database {
    // -- Participants --

    /// Inserts a participant together with its join notice in one
    /// transaction. Uniqueness is decided by the PRIMARY KEY on `name` at
    /// insert time — never by a prior read — so two interleaved
    /// registrations of the same name cannot both succeed.
    pub fn register_participant(
        &self,
        participant: &ParticipantRow,
        join_notice: &MessageRow,
    ) -> Result<InsertOutcome> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let inserted = tx.execute(
                "INSERT INTO participants (name, last_status) VALUES (?1, ?2)",
                (&participant.name, participant.last_status),
            );
            match inserted {
                Ok(_) => {}
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    // Dropping the open transaction rolls it back.
                    return Ok(InsertOutcome::NameTaken);
                }
                Err(e) => return Err(e.into()),
            }

            insert_message_row(&tx, join_notice)?;
            tx.commit()?;
            Ok(InsertOutcome::Inserted)
        })
    }

    pub fn find_participant(&self, name: &str) -> Result<Option<ParticipantRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT name, last_status FROM participants WHERE name = ?1",
                    [name],
                    |row| {
                        Ok(ParticipantRow {
                            name: row.get(0)?,
                            last_status: row.get(1)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn list_participants(&self) -> Result<Vec<ParticipantRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT name, last_status FROM participants ORDER BY rowid")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(ParticipantRow {
                        name: row.get(0)?,
                        last_status: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Sets `last_status` for a present participant. Returns false when no
    /// participant with that name exists.
    pub fn touch_participant(&self, name: &str, now_ms: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE participants SET last_status = ?2 WHERE name = ?1",
                (name, now_ms),
            )?;
            Ok(changed > 0)
        })
    }

    /// Snapshot of the names whose last heartbeat is older than the cutoff.
    pub fn stale_participant_names(&self, cutoff_ms: i64) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT name FROM participants WHERE last_status < ?1")?;
            let names = stmt
                .query_map([cutoff_ms], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(names)
        })
    }

    /// Deletes the named participants, re-checking staleness row-by-row at
    /// delete time. A participant whose heartbeat moved `last_status` past
    /// the cutoff after the snapshot was taken is left alone. Returns how
    /// many rows were actually removed.
    pub fn evict_stale(&self, names: &[String], cutoff_ms: i64) -> Result<usize> {
        if names.is_empty() {
            return Ok(0);
        }

        self.with_conn_mut(|conn| {
            let placeholders: Vec<String> =
                (2..=names.len() + 1).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "DELETE FROM participants WHERE last_status < ?1 AND name IN ({})",
                placeholders.join(", ")
            );

            let mut params: Vec<&dyn rusqlite::types::ToSql> = vec![&cutoff_ms];
            params.extend(names.iter().map(|n| n as &dyn rusqlite::types::ToSql));

            let removed = conn.execute(&sql, params.as_slice())?;
            Ok(removed)
        })
    }

    // -- Messages --

    pub fn insert_message(&self, message: &MessageRow) -> Result<()> {
        self.with_conn_mut(|conn| {
            insert_message_row(conn, message)?;
            Ok(())
        })
    }

    /// Bulk insert in a single transaction (used by the sweep's departure
    /// notices).
    pub fn insert_messages(&self, batch: &[MessageRow]) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            for message in batch {
                insert_message_row(&tx, message)?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    pub fn find_message(&self, id: &str) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, sender, recipient, body, kind, time, posted_at
                     FROM messages WHERE id = ?1",
                    [id],
                    map_message_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Rewrites the mutable fields of a message. `id`, `sender`, and
    /// `posted_at` never change. Returns false when the id is unknown.
    pub fn update_message(
        &self,
        id: &str,
        recipient: &str,
        body: &str,
        kind: &str,
        time: &str,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE messages SET recipient = ?2, body = ?3, kind = ?4, time = ?5
                 WHERE id = ?1",
                (id, recipient, body, kind, time),
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_message(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM messages WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    /// Messages `user` may see, most recent first. `limit` of `None` returns
    /// the whole visible log.
    ///
    /// Visibility is decided by kind: public and status messages are visible
    /// to everyone, private messages only to their sender and recipient.
    pub fn visible_messages(&self, user: &str, limit: Option<i64>) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, sender, recipient, body, kind, time, posted_at
                 FROM messages
                 WHERE kind IN ('message', 'status') OR sender = ?1 OR recipient = ?1
                 ORDER BY posted_at DESC, rowid DESC
                 LIMIT ?2",
            )?;

            // SQLite treats a negative LIMIT as "no limit".
            let rows = stmt
                .query_map(rusqlite::params![user, limit.unwrap_or(-1)], map_message_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn insert_message_row(conn: &Connection, message: &MessageRow) -> Result<()> {
    conn.execute(
        "INSERT INTO messages (id, sender, recipient, body, kind, time, posted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            message.id,
            message.sender,
            message.recipient,
            message.body,
            message.kind,
            message.time,
            message.posted_at,
        ],
    )?;
    Ok(())
}

fn map_message_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        sender: row.get(1)?,
        recipient: row.get(2)?,
        body: row.get(3)?,
        kind: row.get(4)?,
        time: row.get(5)?,
        posted_at: row.get(6)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS participants (
            name        TEXT PRIMARY KEY,
            last_status INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS messages (
            id          TEXT PRIMARY KEY,
            sender      TEXT NOT NULL,
            recipient   TEXT NOT NULL,
            body        TEXT NOT NULL,
            kind        TEXT NOT NULL,
            time        TEXT NOT NULL,
            posted_at   INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_messages_posted
            ON messages(posted_at);

        CREATE INDEX IF NOT EXISTS idx_participants_last_status
            ON participants(last_status);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}

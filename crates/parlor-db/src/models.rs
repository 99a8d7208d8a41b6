/// Database row types — these map directly to SQLite rows.
/// Distinct from the parlor-types domain models to keep the DB layer
/// independent.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRow {
    pub name: String,
    pub last_status: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    pub id: String,
    pub sender: String,
    pub recipient: String,
    pub body: String,
    pub kind: String,
    pub time: String,
    pub posted_at: i64,
}

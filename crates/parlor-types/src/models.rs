use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reserved recipient meaning "everyone in the room".
pub const BROADCAST_TARGET: &str = "Todos";

/// A display name currently present in the room, with the epoch-millisecond
/// timestamp of its last heartbeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub name: String,
    pub last_status: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Public chat message, visible to everyone.
    Message,
    /// Visible only to the sender and the named recipient.
    PrivateMessage,
    /// System-generated join/leave notice, always broadcast.
    Status,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Message => "message",
            MessageKind::PrivateMessage => "private_message",
            MessageKind::Status => "status",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "message" => Some(MessageKind::Message),
            "private_message" => Some(MessageKind::PrivateMessage),
            "status" => Some(MessageKind::Status),
            _ => None,
        }
    }
}

/// A message in the room log. `time` is the server-assigned display
/// timestamp; `posted_at` is the epoch-millisecond insertion ordinal and is
/// not exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub time: String,
    #[serde(skip_serializing)]
    pub posted_at: i64,
}

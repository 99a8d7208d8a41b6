pub mod api;
pub mod models;

pub use models::{BROADCAST_TARGET, ChatMessage, MessageKind, Participant};

//! The room engine: who is present, which messages a participant may see,
//! and who may mutate a message after the fact. Everything here talks to
//! persistence through an explicitly injected [`parlor_db::Database`]; the
//! HTTP shell lives elsewhere.

pub mod error;
pub mod messages;
pub mod registry;
pub mod sanitize;
pub mod sweeper;

pub use error::{RoomError, RoomResult};
pub use messages::MessageStore;
pub use registry::ParticipantRegistry;
pub use sanitize::sanitize;
pub use sweeper::{PresenceSweeper, run_sweep_loop};

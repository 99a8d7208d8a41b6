use thiserror::Error;

/// Engine outcomes that are not plain success. The first five are expected
/// conditions returned to the caller as data; only `Storage` is a genuine
/// fault.
#[derive(Debug, Error)]
pub enum RoomError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("name already in use")]
    Conflict,

    #[error("not found")]
    NotFound,

    #[error("requester does not own the message")]
    Forbidden,

    #[error("sender {0:?} is not in the room")]
    UnknownSender(String),

    #[error("storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type RoomResult<T> = Result<T, RoomError>;

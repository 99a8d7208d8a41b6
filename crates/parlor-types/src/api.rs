use serde::Deserialize;

// -- Participants --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: String,
}

// -- Messages --

/// Body of both `POST /messages` and `PUT /messages/{id}`. The `type` field
/// stays a raw string here: it is sanitized and validated against
/// `MessageKind` by the engine, so an unknown kind is a 422, not a
/// deserialization error.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessagePayload {
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
}

//! Request intake
//!
//! Turns raw HTTP bodies and socket text frames into validated
//! [`ChatRequest`]s. Both paths share one validation policy.

use serde_json::Value;
use thiserror::Error;

use crate::chat::ChatRequest;

/// Field carrying the prompt in an HTTP body
pub const HTTP_PROMPT_FIELD: &str = "message";

/// Field carrying the prompt in a socket frame
pub const SOCKET_PROMPT_FIELD: &str = "text";

/// Intake failure
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeError {
    #[error("Invalid JSON body")]
    InvalidBody,

    #[error("Message is empty")]
    EmptyPrompt,
}

/// Field selecting the streaming reply in an HTTP body
pub const HTTP_STREAM_FIELD: &str = "stream";

/// A validated `POST /chat/` body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpChat {
    pub request: ChatRequest,
    /// `Some` only when the body carries a boolean `stream` field
    pub stream: Option<bool>,
}

/// Parse a `POST /chat/` body: `{ "message": string, "stream"?: bool }`
///
/// An empty body is read as `{}`.
pub fn parse_http_chat(body: &[u8]) -> Result<HttpChat, IntakeError> {
    let body = if body.is_empty() {
        b"{}".as_slice()
    } else {
        body
    };
    let value: Value = serde_json::from_slice(body).map_err(|_| IntakeError::InvalidBody)?;
    let request = extract_prompt(&value, HTTP_PROMPT_FIELD)?;
    let stream = value.get(HTTP_STREAM_FIELD).and_then(Value::as_bool);
    Ok(HttpChat { request, stream })
}

/// Parse a `POST /chat/` body, keeping only the prompt
pub fn parse_http_body(body: &[u8]) -> Result<ChatRequest, IntakeError> {
    parse_http_chat(body).map(|chat| chat.request)
}

/// Parse a socket text frame: `{ "text": string }`
pub fn parse_socket_frame(frame: &str) -> Result<ChatRequest, IntakeError> {
    let value: Value = serde_json::from_str(frame).map_err(|_| IntakeError::InvalidBody)?;
    extract_prompt(&value, SOCKET_PROMPT_FIELD)
}

fn extract_prompt(value: &Value, field: &str) -> Result<ChatRequest, IntakeError> {
    let object = value.as_object().ok_or(IntakeError::InvalidBody)?;
    let prompt = match object.get(field) {
        None | Some(Value::Null) => "",
        Some(Value::String(text)) => text.as_str(),
        Some(_) => return Err(IntakeError::InvalidBody),
    };
    ChatRequest::new(prompt).ok_or(IntakeError::EmptyPrompt)
}

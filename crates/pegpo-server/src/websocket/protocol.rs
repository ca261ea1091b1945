//! WebSocket protocol definitions
//!
//! Outbound messages are discriminated by `type`.

use pegpo_core::RelayEvent;
use serde::{Deserialize, Serialize};

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SocketMessage {
    /// One fragment of the reply
    Partial {
        /// Fragment text
        delta: String,
    },
    /// Reply finished
    Done {
        /// Always empty; kept for client compatibility
        #[serde(default)]
        text: String,
    },
    /// Reply failed
    Error {
        /// Error message
        message: String,
    },
}

impl From<RelayEvent> for SocketMessage {
    fn from(event: RelayEvent) -> Self {
        match event {
            RelayEvent::Partial { delta } => Self::Partial { delta },
            RelayEvent::Done => Self::Done { text: String::new() },
            RelayEvent::Error { message } => Self::Error { message },
        }
    }
}

impl SocketMessage {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

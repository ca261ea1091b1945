/// Client-facing relay event
///
/// A relay emits zero or more `Partial` events followed by exactly one
/// terminal event (`Done` or `Error`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// One non-empty text fragment
    Partial { delta: String },
    /// Stream finished successfully
    Done,
    /// Stream failed
    Error { message: String },
}

impl RelayEvent {
    /// Create a partial event
    pub fn partial(delta: impl Into<String>) -> Self {
        Self::Partial { delta: delta.into() }
    }

    /// Create an error event
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { message: message.into() }
    }

    /// Check if this is an error event
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Check if this is a done event
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Check if this event ends the stream
    pub fn is_terminal(&self) -> bool {
        self.is_done() || self.is_error()
    }
}

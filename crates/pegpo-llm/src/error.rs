use thiserror::Error;

/// Unified error type for provider operations
#[derive(Error, Debug)]
pub enum LLMError {
    /// The provider backend is unknown or not compiled in
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("api error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("transform error: {0}")]
    Transform(#[from] ConversionError),

    #[error("stream error: {0}")]
    Stream(String),
}

impl LLMError {
    /// Check if the error was raised before any outbound call
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::ProviderUnavailable(_) | Self::Config(_))
    }
}

/// Error during schema transformation
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// The provider returned an error object in place of a response
    #[error("provider error: {0}")]
    ErrorPayload(String),
}

pub type Result<T> = std::result::Result<T, LLMError>;

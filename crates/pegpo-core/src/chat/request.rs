/// A validated chat request
///
/// Only constructed through [`ChatRequest::new`], which refuses prompts that
/// are empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    prompt: String,
}

impl ChatRequest {
    /// Create a request from raw user text
    ///
    /// Returns `None` when the trimmed text is empty.
    pub fn new(prompt: impl AsRef<str>) -> Option<Self> {
        let trimmed = prompt.as_ref().trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            prompt: trimmed.to_string(),
        })
    }

    /// The trimmed prompt text
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

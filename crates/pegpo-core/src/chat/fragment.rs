/// One unit of provider-generated text, possibly empty
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseFragment {
    pub text: String,
}

impl ResponseFragment {
    /// Create a fragment
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// A fragment carrying no text
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if the fragment carries no text
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl From<String> for ResponseFragment {
    fn from(text: String) -> Self {
        Self { text }
    }
}

impl From<&str> for ResponseFragment {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

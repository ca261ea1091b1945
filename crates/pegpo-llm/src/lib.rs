pub mod transformer;
pub mod provider;
pub mod providers;
pub mod error;
pub mod gateway;

// Re-export core types
pub use error::{LLMError, ConversionError, Result};
pub use transformer::{SchemaTransformer, FragmentStream};
pub use provider::{LLMProvider, BaseProvider, ProviderConfig, AuthConfig, ProviderMetadata, ProviderCapabilities};
pub use gateway::{ProviderGateway, GenerationMode};
#[cfg(feature = "gemini")]
pub use providers::GeminiProvider;
#[cfg(feature = "openai")]
pub use providers::OpenAiProvider;

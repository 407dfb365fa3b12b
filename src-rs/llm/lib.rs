pub mod analysis;
pub mod anthropic_adapter;
pub mod gemini_adapter;
mod http;
pub mod openai_adapter;
pub mod rotation;
pub mod selector;
pub mod types;
pub mod vendors;

pub use anthropic_adapter::AnthropicAdapter;
pub use gemini_adapter::GeminiAdapter;
pub use openai_adapter::OpenAiAdapter;
pub use rotation::KeyRing;
pub use selector::{ProviderPicker, ProviderSelector, RandomPicker};
pub use types::{
    AdapterConfig, AnalyzeOptions, ChatOptions, Message, ProviderAdapter, ProviderError, Role,
};
pub use vendors::{VendorSpec, KNOWN_VENDORS};

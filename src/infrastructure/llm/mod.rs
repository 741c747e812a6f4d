//! Provider adapter implementations

mod echo;
mod gemini;
mod http_client;
mod openai;
mod registry;
mod retry;

pub use echo::{ECHO_PROVIDER, EchoAdapter};
pub use gemini::{GEMINI_PROVIDER, GeminiAdapter};
pub use http_client::{HttpClient, HttpClientTrait, error_for_status};
pub use openai::{OPENAI_PROVIDER, OpenAiAdapter};
pub use registry::{EndpointConfig, ProviderRegistry, ProvidersConfig};
pub use retry::RetryPolicy;

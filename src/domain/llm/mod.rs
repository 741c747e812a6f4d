//! Provider adapter abstraction and generation request types

mod provider;
mod provider_config;
mod request;

pub use provider::ProviderAdapter;
pub use provider_config::{ConfigValue, ProviderConfig};
pub use request::GenerationRequest;

#[cfg(test)]
pub use provider::mock::MockProviderAdapter;

use async_trait::async_trait;

use crate::domain::{GenerationRequest, ProviderAdapter, ProviderError};

pub const ECHO_PROVIDER: &str = "echo";

/// Offline adapter that returns the rendered prompt, for dry runs
#[derive(Debug, Default, Clone)]
pub struct EchoAdapter;

impl EchoAdapter {
    pub fn new() -> Self {
        Self
    }
}

/// Keep at most `max_words` whitespace-delimited words
fn bound_words(text: &str, max_words: usize) -> String {
    let mut words = text.split_whitespace();
    let kept: Vec<&str> = words.by_ref().take(max_words).collect();

    if words.next().is_none() {
        text.to_string()
    } else {
        kept.join(" ")
    }
}

#[async_trait]
impl ProviderAdapter for EchoAdapter {
    async fn execute(&self, request: &GenerationRequest<'_>) -> Result<String, ProviderError> {
        Ok(bound_words(&request.prompt, request.max_tokens as usize))
    }

    fn provider_name(&self) -> &str {
        ECHO_PROVIDER
    }
}

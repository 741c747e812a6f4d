use async_trait::async_trait;
use std::fmt::Debug;

use super::{GenerationRequest, ProviderConfig};
use crate::domain::ProviderError;

/// Trait for model backends (OpenAI-style chat, Gemini-style generate, ...)
///
/// Implementations must be safe to share between concurrent calls and keep
/// no per-call mutable state.
#[async_trait]
pub trait ProviderAdapter: Send + Sync + Debug {
    /// Generate the complete text for a rendered prompt
    async fn execute(&self, request: &GenerationRequest<'_>) -> Result<String, ProviderError>;

    /// Registration key of this adapter
    fn provider_name(&self) -> &str;

    /// Verify that required credentials resolve, without calling the backend
    fn check_credentials(&self, _config: &ProviderConfig) -> Result<(), ProviderError> {
        Ok(())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Deterministic adapter that echoes prompts and records every call
    #[derive(Debug)]
    pub struct MockProviderAdapter {
        name: String,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
        failures: Vec<(String, ProviderError)>,
        delays: Vec<(String, Duration)>,
        missing_credential: Option<String>,
    }

    impl MockProviderAdapter {
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
                failures: Vec::new(),
                delays: Vec::new(),
                missing_credential: None,
            }
        }

        /// Fail any call whose prompt contains `marker`
        pub fn with_failure(mut self, marker: impl Into<String>, error: ProviderError) -> Self {
            self.failures.push((marker.into(), error));
            self
        }

        /// Sleep before answering any call whose prompt contains `marker`
        pub fn with_delay(mut self, marker: impl Into<String>, delay: Duration) -> Self {
            self.delays.push((marker.into(), delay));
            self
        }

        /// Make the credential preflight fail for `variable`
        pub fn with_missing_credential(mut self, variable: impl Into<String>) -> Self {
            self.missing_credential = Some(variable.into());
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Prompts in the order calls were started
        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProviderAdapter for MockProviderAdapter {
        async fn execute(&self, request: &GenerationRequest<'_>) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(request.prompt.clone());

            if let Some((_, delay)) = self
                .delays
                .iter()
                .find(|(marker, _)| request.prompt.contains(marker.as_str()))
            {
                tokio::time::sleep(*delay).await;
            }

            if let Some((_, error)) = self
                .failures
                .iter()
                .find(|(marker, _)| request.prompt.contains(marker.as_str()))
            {
                return Err(error.clone());
            }

            Ok(format!("out:{}", request.prompt))
        }

        fn provider_name(&self) -> &str {
            &self.name
        }

        fn check_credentials(&self, _config: &ProviderConfig) -> Result<(), ProviderError> {
            match self.missing_credential {
                Some(ref variable) => Err(ProviderError::missing_credential(&self.name, variable)),
                None => Ok(()),
            }
        }
    }
}

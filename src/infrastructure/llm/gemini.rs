use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::http_client::HttpClientTrait;
use super::retry::RetryPolicy;
use crate::domain::{GenerationRequest, ProviderAdapter, ProviderConfig, ProviderError};

pub const GEMINI_PROVIDER: &str = "gemini";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";

/// Gemini-style generateContent adapter
#[derive(Debug)]
pub struct GeminiAdapter<C: HttpClientTrait> {
    client: C,
    base_url: String,
    api_key_env: String,
    retry: RetryPolicy,
}

impl<C: HttpClientTrait> GeminiAdapter<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            api_key_env: DEFAULT_GEMINI_KEY_ENV.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key_env(mut self, variable: impl Into<String>) -> Self {
        self.api_key_env = variable.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn generate_url(&self, config: &ProviderConfig, model: &str) -> String {
        let base_url = config
            .resolve("base_url")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| self.base_url.clone());

        format!("{}/v1beta/models/{}:generateContent", base_url, model)
    }

    fn api_key(&self, config: &ProviderConfig) -> Result<String, ProviderError> {
        config.resolve_credential("api_key", GEMINI_PROVIDER, &self.api_key_env)
    }

    fn build_request(&self, request: &GenerationRequest<'_>) -> serde_json::Value {
        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }]
            }],
            "generationConfig": {
                "temperature": request.temperature,
                "maxOutputTokens": request.max_tokens,
            }
        })
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<String, ProviderError> {
        let response: GeminiResponse = serde_json::from_value(json).map_err(|e| {
            ProviderError::invalid_response(GEMINI_PROVIDER, format!("Failed to parse response: {}", e))
        })?;

        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            ProviderError::invalid_response(GEMINI_PROVIDER, "No candidates in response")
        })?;

        let text: String = candidate
            .content
            .into_iter()
            .flat_map(|content| content.parts)
            .filter_map(|part| part.text)
            .collect();

        if text.is_empty() {
            let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
            return Err(ProviderError::invalid_response(
                GEMINI_PROVIDER,
                format!("Candidate has no text (finish reason: {})", reason),
            ));
        }

        Ok(text)
    }
}

#[async_trait]
impl<C: HttpClientTrait> ProviderAdapter for GeminiAdapter<C> {
    async fn execute(&self, request: &GenerationRequest<'_>) -> Result<String, ProviderError> {
        let api_key = self.api_key(request.provider_config)?;
        let url = self.generate_url(request.provider_config, request.model);
        let body = self.build_request(request);

        debug!(model = %request.model, "Sending generateContent request");

        let response = self
            .retry
            .run(GEMINI_PROVIDER, || {
                self.client.post_json(
                    GEMINI_PROVIDER,
                    &url,
                    vec![
                        ("x-goog-api-key", api_key.as_str()),
                        ("Content-Type", "application/json"),
                    ],
                    &body,
                    request.timeout,
                )
            })
            .await?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &str {
        GEMINI_PROVIDER
    }

    fn check_credentials(&self, config: &ProviderConfig) -> Result<(), ProviderError> {
        self.api_key(config).map(|_| ())
    }
}

// Gemini API types

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::http_client::HttpClient;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_URL: &str =
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

    fn generated(parts: &[&str]) -> serde_json::Value {
        let parts: Vec<_> = parts.iter().map(|t| serde_json::json!({ "text": t })).collect();
        serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": parts },
                "finishReason": "STOP"
            }]
        })
    }

    fn request<'a>(config: &'a ProviderConfig) -> GenerationRequest<'a> {
        GenerationRequest {
            prompt: "Extract: Beta".to_string(),
            model: "gemini-1.5-flash",
            temperature: 0.2,
            max_tokens: 64,
            provider_config: config,
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_execute_joins_parts() {
        let client = MockHttpClient::new().with_response(TEST_URL, generated(&["Hello ", "world"]));
        let adapter = GeminiAdapter::new(client);
        let config = ProviderConfig::new().with("api_key", "g-key");

        assert_eq!(adapter.execute(&request(&config)).await.unwrap(), "Hello world");

        let sent = &adapter.client.requests()[0];
        assert_eq!(sent.header("x-goog-api-key"), Some("g-key"));
        assert_eq!(sent.body["contents"][0]["parts"][0]["text"], "Extract: Beta");
        assert_eq!(sent.body["generationConfig"]["maxOutputTokens"], 64);
    }

    #[tokio::test]
    async fn test_empty_candidates() {
        let client =
            MockHttpClient::new().with_response(TEST_URL, serde_json::json!({ "candidates": [] }));
        let adapter = GeminiAdapter::new(client);
        let config = ProviderConfig::new().with("api_key", "g-key");

        let error = adapter.execute(&request(&config)).await.unwrap_err();
        assert!(matches!(error, ProviderError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_blocked_candidate_is_invalid_response() {
        let client = MockHttpClient::new().with_response(
            TEST_URL,
            serde_json::json!({ "candidates": [{ "finishReason": "SAFETY" }] }),
        );
        let adapter = GeminiAdapter::new(client);
        let config = ProviderConfig::new().with("api_key", "g-key");

        let error = adapter.execute(&request(&config)).await.unwrap_err();
        assert!(matches!(error, ProviderError::InvalidResponse { .. }));
        assert!(error.to_string().contains("SAFETY"));

        let empty = MockHttpClient::new().with_response(TEST_URL, generated(&[""]));
        let error = GeminiAdapter::new(empty).execute(&request(&config)).await.unwrap_err();
        assert!(matches!(error, ProviderError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_env_reference_credential() {
        unsafe {
            std::env::set_var("KX_TEST_GEMINI_KEY", "from-env");
        }
        let client = MockHttpClient::new().with_response(TEST_URL, generated(&["ok"]));
        let adapter = GeminiAdapter::new(client);
        let config = ProviderConfig::new().with("api_key", "${?KX_TEST_GEMINI_KEY}");

        assert!(adapter.check_credentials(&config).is_ok());
        adapter.execute(&request(&config)).await.unwrap();
        assert_eq!(
            adapter.client.requests()[0].header("x-goog-api-key"),
            Some("from-env")
        );
        unsafe {
            std::env::remove_var("KX_TEST_GEMINI_KEY");
        }
    }

    #[tokio::test]
    async fn test_unresolved_env_reference() {
        let adapter = GeminiAdapter::new(MockHttpClient::new());
        let config = ProviderConfig::new().with("api_key", "${?KX_TEST_GEMINI_MISSING}");

        assert_eq!(
            adapter.check_credentials(&config),
            Err(ProviderError::missing_credential(
                GEMINI_PROVIDER,
                "KX_TEST_GEMINI_MISSING"
            ))
        );
    }

    #[tokio::test]
    async fn test_against_http_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "g-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(generated(&["served"])))
            .mount(&server)
            .await;

        let adapter = GeminiAdapter::new(HttpClient::new())
            .with_base_url(server.uri())
            .with_retry(RetryPolicy::none());
        let config = ProviderConfig::new().with("api_key", "g-key");

        assert_eq!(adapter.execute(&request(&config)).await.unwrap(), "served");
    }
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http_client::HttpClientTrait;
use super::retry::RetryPolicy;
use crate::domain::{GenerationRequest, ProviderAdapter, ProviderConfig, ProviderError};

pub const OPENAI_PROVIDER: &str = "openai";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// OpenAI-style chat completion adapter
#[derive(Debug)]
pub struct OpenAiAdapter<C: HttpClientTrait> {
    client: C,
    base_url: String,
    api_key_env: String,
    retry: RetryPolicy,
}

impl<C: HttpClientTrait> OpenAiAdapter<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            api_key_env: DEFAULT_OPENAI_KEY_ENV.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Environment variable consulted when the agent sets no `api_key`
    pub fn with_api_key_env(mut self, variable: impl Into<String>) -> Self {
        self.api_key_env = variable.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn chat_completions_url(&self, config: &ProviderConfig) -> String {
        let base_url = config
            .resolve("base_url")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| self.base_url.clone());

        format!("{}/v1/chat/completions", base_url)
    }

    fn api_key(&self, config: &ProviderConfig) -> Result<String, ProviderError> {
        config.resolve_credential("api_key", OPENAI_PROVIDER, &self.api_key_env)
    }

    fn build_request(&self, request: &GenerationRequest<'_>) -> serde_json::Value {
        let messages = [
            OpenAiMessage {
                role: "system",
                content: SYSTEM_PROMPT,
            },
            OpenAiMessage {
                role: "user",
                content: &request.prompt,
            },
        ];

        serde_json::json!({
            "model": request.model,
            "messages": messages,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        })
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<String, ProviderError> {
        let response: OpenAiResponse = serde_json::from_value(json).map_err(|e| {
            ProviderError::invalid_response(OPENAI_PROVIDER, format!("Failed to parse response: {}", e))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::invalid_response(OPENAI_PROVIDER, "No choices in response"))?;

        match choice.message.content.filter(|content| !content.is_empty()) {
            Some(content) => Ok(content),
            None => Err(ProviderError::invalid_response(
                OPENAI_PROVIDER,
                match choice.message.refusal {
                    Some(refusal) => format!("Model refused: {}", refusal),
                    None => "Choice has no content".to_string(),
                },
            )),
        }
    }
}

#[async_trait]
impl<C: HttpClientTrait> ProviderAdapter for OpenAiAdapter<C> {
    async fn execute(&self, request: &GenerationRequest<'_>) -> Result<String, ProviderError> {
        let api_key = self.api_key(request.provider_config)?;
        let auth_header = format!("Bearer {}", api_key);
        let url = self.chat_completions_url(request.provider_config);
        let body = self.build_request(request);

        debug!(model = %request.model, url = %url, "Sending chat completion request");

        let response = self
            .retry
            .run(OPENAI_PROVIDER, || {
                self.client.post_json(
                    OPENAI_PROVIDER,
                    &url,
                    vec![
                        ("Authorization", auth_header.as_str()),
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
        OPENAI_PROVIDER
    }

    fn check_credentials(&self, config: &ProviderConfig) -> Result<(), ProviderError> {
        self.api_key(config).map(|_| ())
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::http_client::HttpClient;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_URL: &str = "https://api.openai.com/v1/chat/completions";

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-123",
            "model": "gpt-4o-mini",
            "choices": [{
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        })
    }

    fn config() -> ProviderConfig {
        ProviderConfig::new().with("api_key", "test-api-key")
    }

    fn request<'a>(config: &'a ProviderConfig) -> GenerationRequest<'a> {
        GenerationRequest {
            prompt: "Summarize: Alpha".to_string(),
            model: "gpt-4o-mini",
            temperature: 0.3,
            max_tokens: 200,
            provider_config: config,
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_execute_builds_chat_request() {
        let client = MockHttpClient::new().with_response(TEST_URL, completion("A summary"));
        let adapter = OpenAiAdapter::new(client);
        let config = config();

        let output = adapter.execute(&request(&config)).await.unwrap();
        assert_eq!(output, "A summary");

        let sent = &adapter.client.requests()[0];
        assert_eq!(sent.header("Authorization"), Some("Bearer test-api-key"));
        assert_eq!(sent.body["model"], "gpt-4o-mini");
        assert_eq!(sent.body["max_tokens"], 200);
        assert_eq!(sent.body["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(sent.body["messages"][1]["content"], "Summarize: Alpha");
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let adapter = OpenAiAdapter::new(MockHttpClient::new())
            .with_api_key_env("KX_TEST_OPENAI_KEY_UNSET");
        let config = ProviderConfig::new();

        let error = adapter.execute(&request(&config)).await.unwrap_err();
        assert_eq!(
            error,
            ProviderError::missing_credential(OPENAI_PROVIDER, "KX_TEST_OPENAI_KEY_UNSET")
        );
        assert!(adapter.check_credentials(&config).is_err());
        assert_eq!(adapter.client.request_count(), 0);
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let client = MockHttpClient::new()
            .with_error(TEST_URL, ProviderError::unavailable(OPENAI_PROVIDER, "HTTP 503"))
            .with_response(TEST_URL, completion("recovered"));
        let adapter =
            OpenAiAdapter::new(client).with_retry(RetryPolicy::new(2).with_initial_delay(1));
        let config = config();

        assert_eq!(adapter.execute(&request(&config)).await.unwrap(), "recovered");
        assert_eq!(adapter.client.request_count(), 2);
    }

    #[tokio::test]
    async fn test_quota_failure_not_retried() {
        let client = MockHttpClient::new()
            .with_error(TEST_URL, ProviderError::quota_or_auth(OPENAI_PROVIDER, "HTTP 429"));
        let adapter =
            OpenAiAdapter::new(client).with_retry(RetryPolicy::new(2).with_initial_delay(1));
        let config = config();

        let error = adapter.execute(&request(&config)).await.unwrap_err();
        assert!(matches!(error, ProviderError::QuotaOrAuthFailure { .. }));
        assert_eq!(adapter.client.request_count(), 1);
    }

    #[tokio::test]
    async fn test_no_choices_is_invalid_response() {
        let client =
            MockHttpClient::new().with_response(TEST_URL, serde_json::json!({ "choices": [] }));
        let adapter = OpenAiAdapter::new(client);
        let config = config();

        let error = adapter.execute(&request(&config)).await.unwrap_err();
        assert!(matches!(error, ProviderError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_refusal_is_invalid_response() {
        let client = MockHttpClient::new().with_response(
            TEST_URL,
            serde_json::json!({
                "choices": [{ "message": { "content": null, "refusal": "I can't help" } }]
            }),
        );
        let adapter = OpenAiAdapter::new(client);
        let config = config();

        let error = adapter.execute(&request(&config)).await.unwrap_err();
        assert!(matches!(error, ProviderError::InvalidResponse { .. }));
        assert!(error.to_string().contains("I can't help"));

        let empty = MockHttpClient::new().with_response(TEST_URL, completion(""));
        let error = OpenAiAdapter::new(empty).execute(&request(&config)).await.unwrap_err();
        assert!(matches!(error, ProviderError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_agent_base_url_override() {
        let custom_url = "http://localhost:8080/v1/chat/completions";
        let client = MockHttpClient::new().with_response(custom_url, completion("local"));
        let adapter = OpenAiAdapter::new(client);
        let config = config().with("base_url", "http://localhost:8080/");

        assert_eq!(adapter.execute(&request(&config)).await.unwrap(), "local");
    }

    #[tokio::test]
    async fn test_against_http_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-api-key"))
            .and(body_partial_json(serde_json::json!({ "model": "gpt-4o-mini" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("from server")))
            .mount(&server)
            .await;

        let adapter = OpenAiAdapter::new(HttpClient::new()).with_base_url(server.uri());
        let config = config();

        assert_eq!(adapter.execute(&request(&config)).await.unwrap(), "from server");
    }
}

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

use crate::domain::ProviderError;

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    /// POST a JSON body and return the parsed JSON response.
    ///
    /// `provider` only labels errors; `timeout` bounds this single attempt.
    async fn post_json(
        &self,
        provider: &str,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<serde_json::Value, ProviderError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a non-success HTTP status onto the provider error taxonomy
pub fn error_for_status(provider: &str, status: StatusCode, body: &str) -> ProviderError {
    let message = format!("HTTP {}: {}", status, truncate(body, 500));

    match status.as_u16() {
        401 | 403 | 429 => ProviderError::quota_or_auth(provider, message),
        408 => ProviderError::unavailable(provider, message),
        code if code >= 500 => ProviderError::unavailable(provider, message),
        _ => ProviderError::invalid_response(provider, message),
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        provider: &str,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<serde_json::Value, ProviderError> {
        let mut request = self.client.post(url).timeout(timeout);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request.json(body).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::timeout(provider, timeout.as_millis() as u64)
            } else {
                ProviderError::unavailable(provider, format!("Request failed: {}", e))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(error_for_status(provider, status, &error_body));
        }

        response.json().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::timeout(provider, timeout.as_millis() as u64)
            } else {
                ProviderError::invalid_response(provider, format!("Failed to parse response: {}", e))
            }
        })
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    /// A request captured by [`MockHttpClient`]
    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub url: String,
        pub headers: Vec<(String, String)>,
        pub body: serde_json::Value,
    }

    impl RecordedRequest {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }
    }

    /// Scripted client keyed by URL. Queued results are consumed in order;
    /// the last one repeats.
    #[derive(Debug, Default)]
    pub struct MockHttpClient {
        responses: Mutex<HashMap<String, VecDeque<Result<serde_json::Value, ProviderError>>>>,
        requests: Mutex<Vec<RecordedRequest>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(self, url: impl Into<String>, response: serde_json::Value) -> Self {
            self.push(url.into(), Ok(response));
            self
        }

        pub fn with_error(self, url: impl Into<String>, error: ProviderError) -> Self {
            self.push(url.into(), Err(error));
            self
        }

        fn push(&self, url: String, result: Result<serde_json::Value, ProviderError>) {
            self.responses
                .lock()
                .unwrap()
                .entry(url)
                .or_default()
                .push_back(result);
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl HttpClientTrait for MockHttpClient {
        async fn post_json(
            &self,
            provider: &str,
            url: &str,
            headers: Vec<(&str, &str)>,
            body: &serde_json::Value,
            _timeout: Duration,
        ) -> Result<serde_json::Value, ProviderError> {
            self.requests.lock().unwrap().push(RecordedRequest {
                url: url.to_string(),
                headers: headers
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                body: body.clone(),
            });

            let mut responses = self.responses.lock().unwrap();
            let queue = responses.get_mut(url).ok_or_else(|| {
                ProviderError::invalid_response(provider, format!("No mock response for {}", url))
            })?;

            if queue.len() > 1 {
                queue.pop_front().unwrap()
            } else {
                queue.front().cloned().unwrap()
            }
        }
    }
}

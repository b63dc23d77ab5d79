use crate::config::AiConfig;
use crate::error::{Error, Result};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Model tried first for every completion
pub const PRIMARY_MODEL: &str = "meta-llama/llama-3.2-3b-instruct";
/// Free-tier model used when the primary call fails
pub const FALLBACK_MODEL: &str = "deepseek/deepseek-chat-v3-0324:free";

#[derive(Debug, Clone, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Options controlling a completion request
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub temperature: f64,
    pub max_tokens: u32,
    /// Ask the provider to return a JSON object (used by the command planner)
    pub json_response: bool,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 1024,
            json_response: false,
        }
    }
}

/// OpenRouter chat-completions client with primary/fallback model failover
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    base_url: String,
}

impl OpenRouterClient {
    /// Create a client, or None when no API key is configured
    pub fn from_config(config: &AiConfig, referer: &str) -> Result<Option<Self>> {
        if !config.is_enabled() {
            return Ok(None);
        }

        let mut headers = header::HeaderMap::new();

        let auth_value = format!("Bearer {}", config.openrouter_api_key);
        let mut auth_header = header::HeaderValue::from_str(&auth_value)
            .map_err(|e| Error::Internal(format!("Invalid OpenRouter API key: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth_header);

        // OpenRouter asks callers to identify themselves
        if let Ok(referer) = header::HeaderValue::from_str(referer) {
            headers.insert(header::REFERER, referer);
        }
        headers.insert(
            header::HeaderName::from_static("x-title"),
            header::HeaderValue::from_static("Budget Pay Financial Assistant"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Some(Self {
            client,
            base_url: OPENROUTER_BASE_URL.to_string(),
        }))
    }

    #[cfg(test)]
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.to_string(),
        }
    }

    /// Run a completion, trying the primary model and then the fallback
    pub async fn chat(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &ChatOptions,
    ) -> Result<String> {
        match self
            .chat_with_model(PRIMARY_MODEL, system_prompt, user_prompt, options)
            .await
        {
            Ok(content) => Ok(content),
            Err(e) => {
                warn!(
                    "Primary model {} failed: {}. Trying fallback model",
                    PRIMARY_MODEL,
                    e.log_safe()
                );
                self.chat_with_model(FALLBACK_MODEL, system_prompt, user_prompt, options)
                    .await
            }
        }
    }

    async fn chat_with_model(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
        options: &ChatOptions,
    ) -> Result<String> {
        debug!("OpenRouter completion request: model={}", model);

        let mut payload = json!({
            "model": model,
            "messages": [
                ChatMessage { role: "system", content: system_prompt },
                ChatMessage { role: "user", content: user_prompt },
            ],
            "temperature": options.temperature,
            "max_tokens": options.max_tokens,
        });

        if options.json_response {
            payload["response_format"] = json!({"type": "json_object"});
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unreadable error body".to_string());
            return Err(Error::AiProvider(format!("{model}: HTTP {status}: {body}")));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::AiProvider(format!("Malformed completion response: {e}")))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::AiProvider("Completion contained no choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completion_body(content: &str) -> String {
        json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_chat_uses_primary_model() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(mockito::Matcher::PartialJson(json!({"model": PRIMARY_MODEL})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("Spend less on coffee."))
            .create_async()
            .await;

        let client = OpenRouterClient::with_base_url(&server.url());
        let reply = client
            .chat("system", "user", &ChatOptions::default())
            .await
            .unwrap();

        assert_eq!(reply, "Spend less on coffee.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_chat_falls_back_on_primary_failure() {
        let mut server = mockito::Server::new_async().await;

        let primary = server
            .mock("POST", "/chat/completions")
            .match_body(mockito::Matcher::PartialJson(json!({"model": PRIMARY_MODEL})))
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let fallback = server
            .mock("POST", "/chat/completions")
            .match_body(mockito::Matcher::PartialJson(json!({"model": FALLBACK_MODEL})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("fallback answer"))
            .create_async()
            .await;

        let client = OpenRouterClient::with_base_url(&server.url());
        let reply = client
            .chat("system", "user", &ChatOptions::default())
            .await
            .unwrap();

        assert_eq!(reply, "fallback answer");
        primary.assert_async().await;
        fallback.assert_async().await;
    }

    #[tokio::test]
    async fn test_chat_errors_when_both_models_fail() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("boom")
            .expect(2)
            .create_async()
            .await;

        let client = OpenRouterClient::with_base_url(&server.url());
        let err = client.chat("system", "user", &ChatOptions::default()).await;

        assert!(matches!(err, Err(Error::AiProvider(_))));
        mock.assert_async().await;
    }
}

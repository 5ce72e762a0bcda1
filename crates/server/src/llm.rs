use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use frontdesk_agent::LlmClient;
use frontdesk_core::config::LlmConfig;

const TEMPERATURE: f64 = 0.3;

/// Chat-completions client for any OpenAI-compatible endpoint.
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    model: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiClient {
    /// `Ok(None)` when no API key is configured.
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>, reqwest::Error> {
        let Some(api_key) = config.api_key.clone().filter(|_| config.is_configured()) else {
            return Ok(None);
        };
        let http = reqwest::Client::builder().build()?;
        Ok(Some(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key,
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }))
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .timeout(self.timeout)
            .json(&json!({
                "model": self.model,
                "messages": [{"role": "user", "content": prompt}],
                "temperature": TEMPERATURE,
            }))
            .send()
            .await
            .context("llm request failed")?
            .error_for_status()
            .context("llm returned an error status")?;

        let body: CompletionResponse =
            response.json().await.context("llm response was not a completion")?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("llm response had no content"))
    }
}

#[cfg(test)]
mod tests {
    use frontdesk_agent::LlmClient;
    use frontdesk_core::config::{AppConfig, LlmConfig};
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::OpenAiClient;

    fn config(base_url: &str, api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            api_key: api_key.map(|key| SecretString::from(key.to_owned())),
            base_url: base_url.to_owned(),
            ..AppConfig::default().llm
        }
    }

    #[test]
    fn missing_key_means_no_client() {
        let client = OpenAiClient::from_config(&config("http://localhost", None)).expect("build");
        assert!(client.is_none());
    }

    #[tokio::test]
    async fn completion_returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {"role": "assistant", "content": "{\"intent\": \"amenities\"}"}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiClient::from_config(&config(&server.uri(), Some("sk-test")))
            .expect("build")
            .expect("configured");
        let answer = client.complete("Is there a pool?").await.expect("completion");
        assert_eq!(answer, "{\"intent\": \"amenities\"}");
    }

    #[tokio::test]
    async fn upstream_error_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = OpenAiClient::from_config(&config(&server.uri(), Some("sk-test")))
            .expect("build")
            .expect("configured");
        assert!(client.complete("hello").await.is_err());
    }
}

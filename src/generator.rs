use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::config::GeneratorConfig;
use crate::error::GenerationError;

/// Turns a description and target size into the URL of a generated image.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        width: u32,
        height: u32,
    ) -> Result<String, GenerationError>;
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Option<Vec<ChatChoice>>,
    error: Option<RemoteError>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemoteError {
    message: Option<String>,
}

pub fn build_generation_prompt(description: &str, width: u32, height: u32) -> String {
    format!(
        "Generate a high-quality image with these specifications:\n\
Description: {description}\n\
Style: Professional, detailed, visually appealing\n\
Quality: High resolution, crisp details\n\
Composition: Well-balanced, aesthetically pleasing\n\
Aspect Ratio: {width}:{height}\n\
\n\
Create an image that matches the description while being visually striking and professional."
    )
}

/// Accepts only absolute http(s) URLs.
pub fn validate_image_url(raw: &str) -> Result<Url, GenerationError> {
    let trimmed = raw.trim();
    let parsed =
        Url::parse(trimmed).map_err(|_| GenerationError::InvalidUrl(trimmed.to_string()))?;
    match parsed.scheme() {
        "http" | "https" if parsed.has_host() => Ok(parsed),
        _ => Err(GenerationError::InvalidUrl(trimmed.to_string())),
    }
}

/// Client for an OpenAI-style `chat/completions` endpoint whose reply content is
/// the URL of the generated image.
#[derive(Clone, Debug)]
pub struct ChatCompletionsGenerator {
    client: Client,
    config: GeneratorConfig,
}

impl ChatCompletionsGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

async fn assert_ok_response(
    response: reqwest::Response,
) -> Result<reqwest::Response, GenerationError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(GenerationError::Status { status, body })
}

#[async_trait]
impl ImageGenerator for ChatCompletionsGenerator {
    async fn generate(
        &self,
        prompt: &str,
        width: u32,
        height: u32,
    ) -> Result<String, GenerationError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingApiKey)?;

        let mut request = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&json!({
                "model": self.config.model,
                "messages": [
                    {
                        "role": "user",
                        "content": build_generation_prompt(prompt, width, height),
                    }
                ]
            }));
        if let Some(customer_id) = self.config.customer_id.as_deref() {
            request = request.header("customerId", customer_id);
        }

        tracing::debug!(model = %self.config.model, width, height, "sending generation request");
        let response = assert_ok_response(request.send().await?).await?;
        let body = response.text().await?;
        let payload: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|err| GenerationError::InvalidPayload(err.to_string()))?;
        if let Some(message) = payload.error.and_then(|err| err.message) {
            return Err(GenerationError::Remote(message));
        }
        let content = payload
            .choices
            .and_then(|choices| choices.into_iter().next())
            .and_then(|choice| choice.message)
            .and_then(|msg| msg.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GenerationError::MissingContent)?;

        let url = validate_image_url(&content)?;
        Ok(url.to_string())
    }
}

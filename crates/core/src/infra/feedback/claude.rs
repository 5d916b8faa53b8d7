use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::prompts;
use super::{FeedbackContext, FeedbackError, FeedbackGenerator};
use crate::domain::settings::DEFAULT_MODEL;
const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";

/// Claude API を使用したフィードバック生成器
pub struct ClaudeFeedback {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

impl ClaudeFeedback {
    pub fn new(api_key: String) -> Result<Self, FeedbackError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FeedbackError::NotAvailable(format!("HTTP client init failed: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model: DEFAULT_MODEL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

fn join_text(response: MessageResponse) -> Result<String, FeedbackError> {
    let text = response
        .content
        .into_iter()
        .filter_map(|block| block.text)
        .collect::<Vec<_>>()
        .join("");

    let text = text.trim();
    if text.is_empty() {
        return Err(FeedbackError::Failed(
            "Empty response from Claude API".to_string(),
        ));
    }
    Ok(text.to_string())
}

#[async_trait]
impl FeedbackGenerator for ClaudeFeedback {
    async fn generate(&self, ctx: &FeedbackContext) -> Result<String, FeedbackError> {
        if self.api_key.is_empty() {
            return Err(FeedbackError::NotAvailable("API key is not set".to_string()));
        }

        let user_msg = prompts::build_prompt(
            &ctx.reference_text,
            &ctx.transcription,
            ctx.overall_accuracy,
            &ctx.weak_phonemes,
        );

        let request = MessageRequest {
            model: &self.model,
            max_tokens: 512,
            system: prompts::SYSTEM_SPEECH_COACH,
            messages: vec![Message {
                role: "user",
                content: user_msg,
            }],
        };

        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FeedbackError::Timeout
                } else {
                    FeedbackError::Failed(format!("HTTP request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedbackError::Failed(format!(
                "Claude API error: {status} - {body}"
            )));
        }

        let msg_response: MessageResponse = response
            .json()
            .await
            .map_err(|e| FeedbackError::Failed(format!("Response parse error: {e}")))?;

        join_text(msg_response)
    }

    fn name(&self) -> &str {
        "claude"
    }
}

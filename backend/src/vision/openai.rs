use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use super::{VisionError, VisionModel, VisionRequest};
use crate::config::AppConfig;

/// OpenAI-compatible chat completions endpoint with image input.
#[derive(Clone)]
pub struct OpenAiVisionModel {
    http_client: HttpClient,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
enum ChatMessage<'a> {
    System { content: &'a str },
    User { content: Vec<ContentPart<'a>> },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
    detail: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiVisionModel {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            temperature: config.openai_temperature,
            max_tokens: config.openai_max_tokens,
        }
    }

    fn build_body<'a>(&'a self, request: &'a VisionRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            messages: vec![
                ChatMessage::System {
                    content: &request.system_prompt,
                },
                ChatMessage::User {
                    content: vec![
                        ContentPart::Text {
                            text: &request.instruction,
                        },
                        ContentPart::ImageUrl {
                            image_url: ImageUrl {
                                url: request.data_url(),
                                detail: "high",
                            },
                        },
                    ],
                },
            ],
        }
    }
}

#[async_trait]
impl VisionModel for OpenAiVisionModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &VisionRequest) -> Result<String, VisionError> {
        let api_key = self.api_key.as_deref().ok_or(VisionError::MissingApiKey)?;
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.build_body(request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(VisionError::Provider(format!("{}: {}", status, error_text)));
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(VisionError::EmptyResponse)
    }
}

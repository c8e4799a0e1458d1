use async_trait::async_trait;
use reqwest::Client as HttpClient;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use super::{SpeechRecognizer, TranscriptionError};
use crate::config::AppConfig;

/// Hosted transcription through an OpenAI-compatible `/audio/transcriptions` endpoint.
pub struct WhisperRecognizer {
    http_client: HttpClient,
    base_url: String,
    api_key: Option<String>,
    model: String,
    language: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptionBody {
    text: String,
}

impl WhisperRecognizer {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            api_key: config.openai_api_key.clone(),
            model: config.transcription_model.clone(),
            language: config.transcription_language.clone(),
        }
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperRecognizer {
    fn name(&self) -> &str {
        "whisper"
    }

    async fn recognize(&self, audio: &[u8]) -> Result<String, TranscriptionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| TranscriptionError::Provider("OPENAI_API_KEY is not configured".into()))?;

        let file = Part::bytes(audio.to_vec())
            .file_name("audio.wav")
            .mime_str("audio/wav")?;
        let form = Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("language", self.language.clone());

        let response = self
            .http_client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(TranscriptionError::Provider(format!("{}: {}", status, error_text)));
        }

        let body: TranscriptionBody = response.json().await?;
        Ok(body.text.trim().to_string())
    }
}

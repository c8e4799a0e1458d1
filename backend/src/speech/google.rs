use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{SpeechRecognizer, TranscriptionError};

const RECOGNIZE_URL: &str = "https://speech.googleapis.com/v1/speech:recognize";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Fallback recognizer on Google's speech REST API. WAV headers carry the
/// encoding and sample rate, so only the language is configured.
pub struct GoogleSpeechRecognizer {
    http_client: HttpClient,
    endpoint: String,
    api_key: String,
    language: String,
}

#[derive(Debug, Serialize)]
struct RecognizeRequest<'a> {
    config: RecognitionConfig<'a>,
    audio: RecognitionAudio,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig<'a> {
    language_code: &'a str,
}

#[derive(Debug, Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Debug, Deserialize, Default)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
}

impl GoogleSpeechRecognizer {
    pub fn new(api_key: String, language: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            endpoint: RECOGNIZE_URL.to_string(),
            api_key,
            language,
        }
    }

    #[cfg(test)]
    fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn request_url(&self) -> Result<Url, TranscriptionError> {
        Ok(Url::parse(&self.endpoint)?)
    }
}

/// Joins the top alternative of each result segment.
fn best_transcript(response: RecognizeResponse) -> Result<String, TranscriptionError> {
    let text = response
        .results
        .into_iter()
        .filter_map(|result| result.alternatives.into_iter().next())
        .map(|alternative| alternative.transcript.trim().to_string())
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        Err(TranscriptionError::NoSpeech)
    } else {
        Ok(text)
    }
}

#[async_trait]
impl SpeechRecognizer for GoogleSpeechRecognizer {
    fn name(&self) -> &str {
        "google-speech"
    }

    async fn recognize(&self, audio: &[u8]) -> Result<String, TranscriptionError> {
        let body = RecognizeRequest {
            config: RecognitionConfig {
                language_code: &self.language,
            },
            audio: RecognitionAudio {
                content: STANDARD.encode(audio),
            },
        };

        let response = self
            .http_client
            .post(self.request_url()?)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(TranscriptionError::Provider(format!("{}: {}", status, error_text)));
        }

        best_transcript(response.json().await?)
    }
}

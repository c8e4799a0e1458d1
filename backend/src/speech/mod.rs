pub mod google;
pub mod whisper;

use std::path::Path;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),
    #[error("Failed to read audio: {0}")]
    Io(#[from] std::io::Error),
    #[error("URL parsing failed: {0}")]
    Url(#[from] url::ParseError),
    #[error("Provider error: {0}")]
    Provider(String),
    #[error("No speech recognized")]
    NoSpeech,
    #[error("Transcription failed: {0}")]
    Exhausted(String),
}

// Request URLs can carry provider credentials; keep them out of messages.
impl From<reqwest::Error> for TranscriptionError {
    fn from(err: reqwest::Error) -> Self {
        TranscriptionError::Http(err.without_url())
    }
}

#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    fn name(&self) -> &str;

    async fn recognize(&self, audio: &[u8]) -> Result<String, TranscriptionError>;
}

/// Text plus the name of the strategy that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    pub text: String,
    pub recognizer: String,
}

/// Ordered speech-to-text strategies. Each is tried once, in order, until one
/// succeeds; if all fail the last error is reported.
pub struct Transcriber {
    strategies: Vec<Box<dyn SpeechRecognizer>>,
}

impl Transcriber {
    pub fn new(strategies: Vec<Box<dyn SpeechRecognizer>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub async fn transcribe(&self, audio: &[u8]) -> Result<Transcription, TranscriptionError> {
        let mut last_error = None;

        for strategy in &self.strategies {
            match strategy.recognize(audio).await {
                Ok(text) => {
                    log::info!("Transcribed {} bytes of audio with {}", audio.len(), strategy.name());
                    return Ok(Transcription {
                        text,
                        recognizer: strategy.name().to_string(),
                    });
                }
                Err(e) => {
                    log::warn!("{} transcription error: {}", strategy.name(), e);
                    last_error = Some(e);
                }
            }
        }

        Err(TranscriptionError::Exhausted(match last_error {
            Some(e) => e.to_string(),
            None => "no speech recognizers configured".to_string(),
        }))
    }

    pub async fn transcribe_file(&self, path: &Path) -> Result<Transcription, TranscriptionError> {
        let audio = tokio::fs::read(path).await?;
        self.transcribe(&audio).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub struct StubRecognizer {
        name: &'static str,
        reply: Result<String, String>,
        calls: Arc<AtomicUsize>,
    }

    impl StubRecognizer {
        pub fn answering(name: &'static str, text: &str) -> Self {
            Self {
                name,
                reply: Ok(text.to_string()),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn failing(name: &'static str, reason: &str) -> Self {
            Self {
                name,
                reply: Err(reason.to_string()),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn call_counter(&self) -> Arc<AtomicUsize> {
            self.calls.clone()
        }
    }

    #[async_trait]
    impl SpeechRecognizer for StubRecognizer {
        fn name(&self) -> &str {
            self.name
        }

        async fn recognize(&self, _audio: &[u8]) -> Result<String, TranscriptionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().map_err(TranscriptionError::Provider)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::StubRecognizer;
    use super::*;
    use std::sync::atomic::Ordering;

    #[actix_web::test]
    async fn primary_success_skips_fallback() {
        let fallback = StubRecognizer::answering("fallback", "unused");
        let fallback_calls = fallback.call_counter();
        let transcriber = Transcriber::new(vec![
            Box::new(StubRecognizer::answering("primary", "how many rooms")),
            Box::new(fallback),
        ]);

        let result = transcriber.transcribe(b"RIFF").await.unwrap();

        assert_eq!(result.text, "how many rooms");
        assert_eq!(result.recognizer, "primary");
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn primary_failure_falls_back_once() {
        let transcriber = Transcriber::new(vec![
            Box::new(StubRecognizer::failing("primary", "401")),
            Box::new(StubRecognizer::answering("fallback", "kitchen size")),
        ]);

        let result = transcriber.transcribe(b"RIFF").await.unwrap();

        assert_eq!(result.recognizer, "fallback");
        assert_eq!(result.text, "kitchen size");
    }

    #[actix_web::test]
    async fn all_failures_surface_last_error() {
        let transcriber = Transcriber::new(vec![
            Box::new(StubRecognizer::failing("primary", "401")),
            Box::new(StubRecognizer::failing("fallback", "unintelligible")),
        ]);

        let err = transcriber.transcribe(b"RIFF").await.unwrap_err();

        assert!(matches!(err, TranscriptionError::Exhausted(_)));
        assert!(err.to_string().starts_with("Transcription failed:"));
        assert!(err.to_string().contains("unintelligible"));
    }

    #[actix_web::test]
    async fn no_strategies_is_an_error() {
        let err = Transcriber::new(Vec::new()).transcribe(b"RIFF").await.unwrap_err();
        assert!(err.to_string().contains("no speech recognizers configured"));
    }
}

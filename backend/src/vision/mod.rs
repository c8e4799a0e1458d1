pub mod openai;
pub mod prompts;

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use shared::{Confidence, QuickAnalysisKind};

use prompts::{COMPREHENSIVE_QUESTION, SYSTEM_PROMPT, analysis_instruction, quick_question};

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Provider error: {0}")]
    Provider(String),
    #[error("Provider returned no answer")]
    EmptyResponse,
    #[error("OPENAI_API_KEY is not configured")]
    MissingApiKey,
}

/// One call's worth of input for a vision-capable chat model.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    pub system_prompt: String,
    pub instruction: String,
    pub image_base64: String,
    pub mime_type: String,
}

impl VisionRequest {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.image_base64)
    }
}

#[async_trait]
pub trait VisionModel: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, request: &VisionRequest) -> Result<String, VisionError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub answer: String,
    pub confidence: Confidence,
    pub model: String,
}

/// `jpg` is the only extension normalised; everything else maps to `image/<ext>`
/// as given, including non-image extensions such as `pdf`.
pub fn mime_type_for_extension(extension: &str) -> String {
    let extension = extension.to_lowercase();
    if extension == "jpg" {
        "image/jpeg".to_string()
    } else {
        format!("image/{}", extension)
    }
}

#[derive(Clone)]
pub struct BlueprintAnalyzer {
    model: Arc<dyn VisionModel>,
}

impl BlueprintAnalyzer {
    pub fn new(model: Arc<dyn VisionModel>) -> Self {
        Self { model }
    }

    /// Answers `question` about the image. Never fails: provider errors come
    /// back as an answer with `Confidence::Error` so callers can show them inline.
    pub async fn analyze(&self, image: &[u8], extension: &str, question: &str) -> AnalysisResult {
        let request = VisionRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            instruction: analysis_instruction(question),
            image_base64: STANDARD.encode(image),
            mime_type: mime_type_for_extension(extension),
        };

        log::info!(
            "Requesting analysis from {} ({} bytes, {})",
            self.model.name(),
            image.len(),
            request.mime_type
        );

        match self.model.complete(&request).await {
            Ok(answer) => AnalysisResult {
                answer,
                confidence: Confidence::High,
                model: self.model.name().to_string(),
            },
            Err(e) => {
                log::warn!("Blueprint analysis failed: {}", e);
                AnalysisResult {
                    answer: format!("Error analyzing blueprint: {}", e),
                    confidence: Confidence::Error,
                    model: self.model.name().to_string(),
                }
            }
        }
    }

    pub async fn comprehensive_analysis(&self, image: &[u8], extension: &str) -> AnalysisResult {
        self.analyze(image, extension, COMPREHENSIVE_QUESTION).await
    }

    pub async fn quick_analysis(
        &self,
        image: &[u8],
        extension: &str,
        kind: QuickAnalysisKind,
    ) -> AnalysisResult {
        self.analyze(image, extension, quick_question(kind)).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records every request and replies with a fixed answer or error.
    pub struct StubVisionModel {
        reply: Result<String, String>,
        calls: AtomicUsize,
        last_request: Mutex<Option<VisionRequest>>,
    }

    impl StubVisionModel {
        pub fn answering(answer: &str) -> Self {
            Self {
                reply: Ok(answer.to_string()),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }

        pub fn failing(reason: &str) -> Self {
            Self {
                reply: Err(reason.to_string()),
                ..Self::answering("")
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn last_request(&self) -> Option<VisionRequest> {
            self.last_request.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VisionModel for StubVisionModel {
        fn name(&self) -> &str {
            "stub-vision"
        }

        async fn complete(&self, request: &VisionRequest) -> Result<String, VisionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            self.reply.clone().map_err(VisionError::Provider)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::StubVisionModel;
    use super::*;

    #[test]
    fn mime_types_follow_extension_verbatim_except_jpg() {
        assert_eq!(mime_type_for_extension("jpg"), "image/jpeg");
        assert_eq!(mime_type_for_extension("JPG"), "image/jpeg");
        assert_eq!(mime_type_for_extension("png"), "image/png");
        assert_eq!(mime_type_for_extension("jpeg"), "image/jpeg");
        assert_eq!(mime_type_for_extension("pdf"), "image/pdf");
    }

    #[actix_web::test]
    async fn successful_analysis_is_high_confidence() {
        let stub = Arc::new(StubVisionModel::answering("Three bedrooms."));
        let analyzer = BlueprintAnalyzer::new(stub.clone());

        let result = analyzer.analyze(&[0, 1, 2], "jpg", "How many bedrooms?").await;

        assert_eq!(result.answer, "Three bedrooms.");
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(result.model, "stub-vision");

        let request = stub.last_request().unwrap();
        assert_eq!(request.mime_type, "image/jpeg");
        assert_eq!(request.image_base64, "AAEC");
        assert_eq!(request.system_prompt, SYSTEM_PROMPT);
        assert!(request.instruction.contains("How many bedrooms?"));
    }

    #[actix_web::test]
    async fn provider_failure_becomes_error_answer() {
        let analyzer = BlueprintAnalyzer::new(Arc::new(StubVisionModel::failing("quota exceeded")));

        let result = analyzer.analyze(b"img", "png", "Rooms?").await;

        assert_eq!(result.confidence, Confidence::Error);
        assert!(result.answer.starts_with("Error analyzing blueprint:"));
        assert!(result.answer.contains("quota exceeded"));
    }

    #[actix_web::test]
    async fn comprehensive_analysis_uses_checklist_question() {
        let stub = Arc::new(StubVisionModel::answering("ok"));
        let analyzer = BlueprintAnalyzer::new(stub.clone());

        analyzer.comprehensive_analysis(b"img", "png").await;

        let request = stub.last_request().unwrap();
        assert!(request.instruction.contains("PROPERTY OVERVIEW"));
        assert_eq!(stub.calls(), 1);
    }

    #[actix_web::test]
    async fn quick_analysis_asks_fixed_question() {
        let stub = Arc::new(StubVisionModel::answering("ok"));
        let analyzer = BlueprintAnalyzer::new(stub.clone());

        analyzer
            .quick_analysis(b"img", "png", QuickAnalysisKind::Dimensions)
            .await;

        let request = stub.last_request().unwrap();
        assert!(request.instruction.contains("total square footage"));
    }
}

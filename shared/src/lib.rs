pub mod conversation;
pub mod measurements;
pub mod presenter;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub use measurements::Measurements;

/// Confidence label attached to every analysis. No graded scale is computed:
/// an answer either came back from the model or it did not.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Confidence {
    High,
    Error,
}

impl Default for Confidence {
    fn default() -> Self {
        Confidence::High
    }
}

/// Fixed-question analyses offered next to free-form questions.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QuickAnalysisKind {
    Rooms,
    Dimensions,
    Features,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub question: String,
    pub analysis: String,
    #[serde(default)]
    pub confidence: Confidence,
    pub timestamp: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FollowupResponse {
    pub success: bool,
    pub question: String,
    pub analysis: String,
    #[serde(default)]
    pub confidence: Confidence,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct QuickAnalysisResponse {
    pub success: bool,
    pub question: String,
    pub analysis: String,
    #[serde(default)]
    pub confidence: Confidence,
    pub measurements: Measurements,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TranscriptionResponse {
    pub success: bool,
    pub transcription: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CleanupResponse {
    pub success: bool,
    pub files_deleted: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn confidence_uses_lowercase_labels() {
        assert_eq!(serde_json::to_string(&Confidence::High).unwrap(), "\"high\"");
        assert_eq!(serde_json::to_string(&Confidence::Error).unwrap(), "\"error\"");
        assert_eq!(Confidence::Error.to_string(), "error");
    }

    #[test]
    fn analyze_response_defaults_missing_confidence_to_high() {
        let body = r#"{"success":true,"question":"q","analysis":"a","timestamp":"20240101_120000"}"#;
        let parsed: AnalyzeResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.confidence, Confidence::High);
    }

    #[test]
    fn quick_analysis_kind_parses_path_segments() {
        assert_eq!(QuickAnalysisKind::from_str("rooms").unwrap(), QuickAnalysisKind::Rooms);
        assert_eq!(QuickAnalysisKind::from_str("features").unwrap(), QuickAnalysisKind::Features);
        assert!(QuickAnalysisKind::from_str("plumbing").is_err());
    }
}

use gloo_file::{Blob, File as GlooFile};
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use shared::conversation::{AnalysisMode, AnalysisOutcome, AnalysisRequest};
use shared::{AnalyzeResponse, ErrorResponse, TranscriptionResponse};
use wasm_bindgen::JsValue;
use web_sys::FormData;

/// Base URL of the analysis service, baked in at build time. Empty means the
/// client is served by the service itself.
fn api_url(path: &str) -> String {
    format!("{}{}", option_env!("API_URL").unwrap_or(""), path)
}

fn js_error(value: JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, String> {
    if !response.ok() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = error_detail(&body).unwrap_or(body);
        return Err(format!("Server error: {} - {}", status, detail));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}

/// The service reports failures as `{"detail": ...}`.
fn error_detail(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|err| err.detail)
}

async fn send(url: &str, form_data: FormData) -> Result<Response, String> {
    Request::post(url)
        .body(form_data)
        .map_err(|e| format!("Failed to build request: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))
}

async fn post_analysis(request: &AnalysisRequest) -> Result<AnalyzeResponse, String> {
    let form_data = FormData::new().map_err(js_error)?;
    let image = Blob::new(&request.image[..]);
    form_data
        .append_with_blob_and_filename("file", image.as_ref(), &request.file_name)
        .map_err(js_error)?;

    if let Some(question) = &request.question {
        form_data
            .append_with_str("question", question)
            .map_err(js_error)?;
    }
    if request.mode == AnalysisMode::Comprehensive {
        form_data
            .append_with_str("auto_analyze", "true")
            .map_err(js_error)?;
    }

    let response = send(&api_url("/api/analyze-blueprint"), form_data).await?;
    read_json(response).await
}

/// Sends the blueprint (and the question, if any) for analysis. Transport and
/// server failures become `AnalysisOutcome::Failed`.
pub async fn analyze_blueprint(request: &AnalysisRequest) -> AnalysisOutcome {
    match post_analysis(request).await {
        Ok(response) => AnalysisOutcome::Answered {
            analysis: response.analysis,
            confidence: response.confidence,
        },
        Err(reason) => {
            log::error!("Analysis of {} failed: {}", request.blueprint_id, reason);
            AnalysisOutcome::Failed(reason)
        }
    }
}

pub async fn transcribe_audio(file: GlooFile) -> Result<String, String> {
    let form_data = FormData::new().map_err(js_error)?;
    let audio: &Blob = &file;
    form_data
        .append_with_blob_and_filename("audio", audio.as_ref(), &file.name())
        .map_err(js_error)?;

    let response = send(&api_url("/api/transcribe-audio"), form_data).await?;
    let transcription: TranscriptionResponse = read_json(response).await?;
    Ok(transcription.transcription)
}

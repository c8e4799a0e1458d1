use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use chrono::Local;
use log::info;
use shared::measurements::extract_measurements;
use shared::{
    AnalyzeResponse, CleanupResponse, FollowupResponse, HealthResponse, QuickAnalysisKind,
    QuickAnalysisResponse, TranscriptionResponse,
};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ApiError;
use crate::form::{UploadForm, UploadedFile};
use crate::speech::Transcriber;
use crate::storage::upload_store::{StoredBlueprint, UploadStore};
use crate::vision::BlueprintAnalyzer;
use crate::vision::prompts::{COMPREHENSIVE_QUESTION, DEFAULT_QUESTION, quick_question};

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: Option<PathBuf>) {
    cfg.service(web::resource("/").route(web::get().to(health)))
        .service(web::resource("/api/analyze-blueprint").route(web::post().to(analyze_blueprint)))
        .service(web::resource("/api/ask-followup").route(web::post().to(ask_followup)))
        .service(
            web::resource("/api/quick-analysis/{kind}").route(web::post().to(quick_analysis)),
        )
        .service(web::resource("/api/transcribe-audio").route(web::post().to(transcribe_audio)))
        .service(web::resource("/api/cleanup").route(web::delete().to(cleanup_uploads)));

    if let Some(dir) = frontend_dir.filter(|dir| dir.is_dir()) {
        info!("Serving client from {}", dir.display());
        cfg.service(Files::new("/app", dir).index_file("index.html"));
    }
}

fn upload_timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "online".to_string(),
        service: "Blueprint Analyzer".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Persists the audio just long enough to transcribe it.
async fn transcribe_upload(
    store: &UploadStore,
    transcriber: &Transcriber,
    audio: &UploadedFile,
    context: &'static str,
) -> Result<String, ApiError> {
    let path = store
        .save_audio(&upload_timestamp(), &audio.data)
        .await
        .map_err(ApiError::storage(context))?;

    let result = transcriber.transcribe_file(&path).await;
    if let Err(e) = store.remove(&path).await {
        log::warn!("Failed to remove audio file {}: {}", path.display(), e);
    }

    let transcription = result?;
    info!("Question transcribed by {}", transcription.recognizer);
    Ok(transcription.text)
}

/// Spoken question takes priority over typed text.
async fn resolve_question(
    form: &UploadForm,
    store: &UploadStore,
    transcriber: &Transcriber,
    context: &'static str,
) -> Result<Option<String>, ApiError> {
    match form.file("audio") {
        Some(audio) => {
            let text = transcribe_upload(store, transcriber, audio, context).await?;
            Ok(Some(text).filter(|text| !text.trim().is_empty()))
        }
        None => Ok(form.text("question")),
    }
}

async fn find_blueprint(
    store: &UploadStore,
    form: &UploadForm,
    context: &'static str,
) -> Result<StoredBlueprint, ApiError> {
    let blueprint_id = form
        .text("blueprint_id")
        .ok_or_else(|| ApiError::BadRequest("blueprint_id is required".to_string()))?;

    store
        .find_blueprint(&blueprint_id)
        .await
        .map_err(ApiError::storage(context))?
        .ok_or_else(|| ApiError::NotFound("Blueprint not found".to_string()))
}

async fn analyze_blueprint(
    analyzer: web::Data<BlueprintAnalyzer>,
    transcriber: web::Data<Transcriber>,
    store: web::Data<UploadStore>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    const CONTEXT: &str = "Analysis failed";

    let form = UploadForm::read(payload).await?;
    let file = form
        .file("file")
        .ok_or_else(|| ApiError::BadRequest("file is required".to_string()))?;

    let timestamp = upload_timestamp();
    let extension = UploadStore::extension_of(file.file_name.as_deref().unwrap_or_default());
    let stored = store
        .save_blueprint(&timestamp, &extension, &file.data)
        .await
        .map_err(ApiError::storage(CONTEXT))?;

    let question = resolve_question(&form, &store, &transcriber, CONTEXT).await?;
    let (question, analysis) = match question {
        Some(question) => {
            let analysis = analyzer.analyze(&file.data, &stored.extension, &question).await;
            (question, analysis)
        }
        None if form.flag("auto_analyze") => (
            COMPREHENSIVE_QUESTION.to_string(),
            analyzer
                .comprehensive_analysis(&file.data, &stored.extension)
                .await,
        ),
        None => (
            DEFAULT_QUESTION.to_string(),
            analyzer
                .analyze(&file.data, &stored.extension, DEFAULT_QUESTION)
                .await,
        ),
    };
    info!(
        "Blueprint {} analysed by {} ({})",
        timestamp, analysis.model, analysis.confidence
    );

    Ok(HttpResponse::Ok().json(AnalyzeResponse {
        success: true,
        question,
        analysis: analysis.answer,
        confidence: analysis.confidence,
        timestamp,
    }))
}

async fn ask_followup(
    analyzer: web::Data<BlueprintAnalyzer>,
    transcriber: web::Data<Transcriber>,
    store: web::Data<UploadStore>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    const CONTEXT: &str = "Follow-up analysis failed";

    let form = UploadForm::read(payload).await?;
    let blueprint = find_blueprint(&store, &form, CONTEXT).await?;

    let question = resolve_question(&form, &store, &transcriber, CONTEXT)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Question is required".to_string()))?;

    let image = blueprint.read().await.map_err(ApiError::storage(CONTEXT))?;
    let analysis = analyzer
        .analyze(&image, &blueprint.extension, &question)
        .await;

    Ok(HttpResponse::Ok().json(FollowupResponse {
        success: true,
        question,
        analysis: analysis.answer,
        confidence: analysis.confidence,
    }))
}

async fn quick_analysis(
    analyzer: web::Data<BlueprintAnalyzer>,
    store: web::Data<UploadStore>,
    path: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    const CONTEXT: &str = "Quick analysis failed";

    let kind_str = path.into_inner();
    let kind = QuickAnalysisKind::from_str(&kind_str)
        .map_err(|_| ApiError::BadRequest(format!("Unknown analysis kind: {}", kind_str)))?;

    let form = UploadForm::read(payload).await?;
    let blueprint = find_blueprint(&store, &form, CONTEXT).await?;
    let image = blueprint.read().await.map_err(ApiError::storage(CONTEXT))?;

    let analysis = analyzer
        .quick_analysis(&image, &blueprint.extension, kind)
        .await;
    let measurements = extract_measurements(&analysis.answer);

    Ok(HttpResponse::Ok().json(QuickAnalysisResponse {
        success: true,
        question: quick_question(kind).to_string(),
        analysis: analysis.answer,
        confidence: analysis.confidence,
        measurements,
    }))
}

async fn transcribe_audio(
    transcriber: web::Data<Transcriber>,
    store: web::Data<UploadStore>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let form = UploadForm::read(payload).await?;
    let audio = form
        .file("audio")
        .ok_or_else(|| ApiError::BadRequest("audio is required".to_string()))?;

    let transcription = transcribe_upload(&store, &transcriber, audio, "Transcription failed").await?;

    Ok(HttpResponse::Ok().json(TranscriptionResponse {
        success: true,
        transcription,
    }))
}

async fn cleanup_uploads(store: web::Data<UploadStore>) -> Result<HttpResponse, ApiError> {
    let files_deleted = store
        .cleanup()
        .await
        .map_err(ApiError::storage("Cleanup failed"))?;

    Ok(HttpResponse::Ok().json(CleanupResponse {
        success: true,
        files_deleted,
    }))
}
